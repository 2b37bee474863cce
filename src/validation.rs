//! Input validation shared by the card and collection routes.

use crate::srs::types::ConfidenceLevel;

const MAX_TEXT_LEN: usize = 2000;
const MAX_NAME_LEN: usize = 100;

/// Card prompt/answer text: non-blank, at most 2000 characters.
pub fn validate_card_text(label: &'static str, text: &str) -> Result<(), String> {
    if text.trim().is_empty() {
        return Err(format!("{label} must not be empty"));
    }
    if text.chars().count() > MAX_TEXT_LEN {
        return Err(format!("{label} must be at most {MAX_TEXT_LEN} characters"));
    }
    Ok(())
}

/// Collection name: non-blank, at most 100 characters.
pub fn validate_collection_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("name must not be empty".to_string());
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(format!("name must be at most {MAX_NAME_LEN} characters"));
    }
    Ok(())
}

/// Confidence arrives as the 1-5 integer the review UI submits; everything
/// else is rejected here, before the pure engine ever sees it.
pub fn parse_confidence(value: u8) -> Result<ConfidenceLevel, String> {
    ConfidenceLevel::from_u8(value)
        .ok_or_else(|| format!("confidence must be between 1 and 5, got {value}"))
}
