//! Error types for DevGenius core types.

use crate::ids::IdError;

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors raised while constructing or validating domain values.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Invalid identifier.
    #[error("invalid identifier: {0}")]
    InvalidId(#[from] IdError),

    /// Rating outside the 1..=5 range.
    #[error("rating must be between 1 and 5, got {0}")]
    InvalidRating(i64),

    /// Unknown quota period name.
    #[error("unknown quota period: {0}")]
    InvalidQuotaPeriod(String),

    /// A required field was empty.
    #[error("missing field: {0}")]
    MissingField(&'static str),
}
