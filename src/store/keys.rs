use crate::store::StoreError;

/// Composite keys join components with `:`; reject ids that would corrupt
/// prefix scans.
fn check_component(label: &str, value: &str) -> Result<(), StoreError> {
    if value.is_empty() {
        return Err(StoreError::Validation(format!("{label} must not be empty")));
    }
    if value.contains(':') {
        return Err(StoreError::Validation(format!(
            "{label} must not contain ':'"
        )));
    }
    Ok(())
}

pub fn collection_key(collection_id: &str) -> Result<String, StoreError> {
    check_component("collection id", collection_id)?;
    Ok(collection_id.to_string())
}

pub fn card_key(collection_id: &str, card_id: &str) -> Result<String, StoreError> {
    check_component("collection id", collection_id)?;
    check_component("card id", card_id)?;
    Ok(format!("{}:{}", collection_id, card_id))
}

pub fn card_prefix(collection_id: &str) -> Result<String, StoreError> {
    check_component("collection id", collection_id)?;
    Ok(format!("{}:", collection_id))
}

pub fn card_due_index_key(
    collection_id: &str,
    due_ts_ms: i64,
    card_id: &str,
) -> Result<String, StoreError> {
    check_component("collection id", collection_id)?;
    check_component("card id", card_id)?;
    let ts = due_ts_ms.max(0) as u64;
    Ok(format!("{}:{:020}:{}", collection_id, ts, card_id))
}

pub fn card_due_index_prefix(collection_id: &str) -> Result<String, StoreError> {
    check_component("collection id", collection_id)?;
    Ok(format!("{}:", collection_id))
}

/// Parse `{collection_id}:{due_ts:020}:{card_id}` back into the due
/// timestamp and card id.
pub fn parse_due_index_key(key: &[u8]) -> Option<(i64, String)> {
    let text = std::str::from_utf8(key).ok()?;
    let mut parts = text.splitn(3, ':');
    let _collection = parts.next()?;
    let ts = parts.next()?.parse::<u64>().ok()?;
    let card_id = parts.next()?;
    if card_id.is_empty() {
        return None;
    }
    Some((i64::try_from(ts).ok()?, card_id.to_string()))
}

pub fn due_digest_key(date: &str) -> Result<String, StoreError> {
    check_component("digest date", date)?;
    Ok(date.to_string())
}
