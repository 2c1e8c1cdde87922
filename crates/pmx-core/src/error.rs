//! Error types for pmx-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid tick size: {0}")]
    InvalidTickSize(String),

    #[error("Unrecognized value: {0}")]
    Unrecognized(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
