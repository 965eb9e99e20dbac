//! Crate-wide error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// No bets recorded for the gambler; nothing is written.
    #[error("no bets recorded for gambler {gambler_id}")]
    InsufficientData { gambler_id: i64 },

    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("malformed model output: {0}")]
    ModelOutput(String),

    /// (gambler, trigger type) already has a trigger at the storage layer.
    #[error("trigger {trigger_type} already exists for gambler {gambler_id}")]
    PersistenceConflict {
        gambler_id: i64,
        trigger_type: String,
    },

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
