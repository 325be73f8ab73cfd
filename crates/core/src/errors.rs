//! Core error types for the analytics engine.
//!
//! The computation pipeline degrades gracefully wherever the data allows
//! it (malformed amounts contribute zero, unsolvable XIRR returns `None`),
//! so errors only arise at the ingestion and export boundary.

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the analytics engine.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),
}

/// Validation errors for data crossing the library boundary.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to read or write JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// === From implementations for common error types ===

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::Json(err))
    }
}

impl From<Error> for String {
    fn from(err: Error) -> Self {
        err.to_string()
    }
}
