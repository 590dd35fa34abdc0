//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid session token: {0}")]
    InvalidToken(String),

    #[error("credential hashing failed: {0}")]
    CredentialHash(String),

    #[error("credential mismatch")]
    CredentialMismatch,

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
