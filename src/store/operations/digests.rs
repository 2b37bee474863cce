use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::keys;
use crate::store::{Store, StoreError};

/// Daily snapshot of how many cards are waiting for review, per collection.
/// Written by the due-digest worker; the latest one backs the reminder view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DueDigest {
    /// Calendar date (UTC) the digest was computed for, `YYYY-MM-DD`.
    pub date: String,
    pub generated_at: DateTime<Utc>,
    pub collections: Vec<CollectionDueCount>,
    pub total_due: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionDueCount {
    pub collection_id: String,
    pub name: String,
    pub due_count: u64,
    pub card_count: u64,
}

impl Store {
    pub fn put_due_digest(&self, digest: &DueDigest) -> Result<(), StoreError> {
        let key = keys::due_digest_key(&digest.date)?;
        self.due_digests
            .insert(key.as_bytes(), Self::serialize(digest)?)?;
        Ok(())
    }

    /// Most recent digest; date keys sort lexicographically.
    pub fn latest_due_digest(&self) -> Result<Option<DueDigest>, StoreError> {
        match self.due_digests.last()? {
            Some((_, raw)) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    fn digest(date: &str, total_due: u64) -> DueDigest {
        DueDigest {
            date: date.to_string(),
            generated_at: Utc::now(),
            collections: vec![CollectionDueCount {
                collection_id: "c1".to_string(),
                name: "basics".to_string(),
                due_count: total_due,
                card_count: 10,
            }],
            total_due,
        }
    }

    #[test]
    fn latest_digest_wins_by_date() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();

        store.put_due_digest(&digest("2026-08-05", 3)).unwrap();
        store.put_due_digest(&digest("2026-08-07", 7)).unwrap();
        store.put_due_digest(&digest("2026-08-06", 5)).unwrap();

        let latest = store.latest_due_digest().unwrap().unwrap();
        assert_eq!(latest.date, "2026-08-07");
        assert_eq!(latest.total_due, 7);
    }

    #[test]
    fn empty_store_has_no_digest() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db-empty").to_str().unwrap()).unwrap();
        assert!(store.latest_due_digest().unwrap().is_none());
    }
}
