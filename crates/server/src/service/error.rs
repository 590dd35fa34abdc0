//! Service-level error kinds.

use folio_metadata::MetadataError;
use folio_storage::StorageError;
use thiserror::Error;

/// Outcome kinds surfaced by the services to the HTTP layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("blob write failed: {0}")]
    BlobWrite(#[source] StorageError),

    #[error("blob delete failed: {0}")]
    BlobDelete(#[source] StorageError),

    #[error("metadata store fault: {0}")]
    Storage(#[from] MetadataError),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for service operations.
pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
