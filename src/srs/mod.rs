pub mod config;
pub mod queue;
pub mod registry;
pub mod scheduler;
pub mod session;
pub mod stats;
pub mod types;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SrsError {
    #[error("invalid transition for card {card_id}: expected {expected}, found {found}")]
    InvalidTransition {
        card_id: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("a response for card {card_id} is already awaiting persistence")]
    InFlightConflict { card_id: String },
    #[error("no pending response for card {card_id}")]
    NoPending { card_id: String },
    #[error("card {card_id} is not part of this session")]
    UnknownCard { card_id: String },
    #[error("cursor index {index} out of bounds for queue of {len}")]
    CursorOutOfBounds { index: usize, len: usize },
    #[error("session has been abandoned")]
    SessionAbandoned,
    #[error("invalid scheduler configuration: {0}")]
    Configuration(String),
}
