//! Error types for Meshsync Core.

use thiserror::Error;

/// Errors raised by the pure data layer.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid digest: {0}")]
    InvalidDigest(String),

    #[error("encoding error: {0}")]
    EncodingError(String),

    #[error("decoding error: {0}")]
    DecodingError(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
