// Storage layer errors. Engine-specific errors never cross this boundary.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A supplied timestamp cannot be represented as nanoseconds since the epoch.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Wire record is missing a required field, or a stored row cannot be decoded.
    #[error("conversion error: {0}")]
    Conversion(String),

    #[error("storage operation failed: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        StoreError::Storage(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
