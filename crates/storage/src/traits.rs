//! Storage trait definitions.

use crate::error::StorageResult;
use async_trait::async_trait;
use bytes::Bytes;

/// Blob store for uploaded file bytes, addressed by key.
///
/// Keys are relative paths under the store root. Writes are atomic: a reader
/// either sees no blob at a key or the complete blob, never a partial write.
#[async_trait]
pub trait BlobStore: Send + Sync + 'static {
    /// Check if a blob exists.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Get a blob's metadata without reading its content.
    async fn head(&self, key: &str) -> StorageResult<BlobMeta>;

    /// Read a blob's content.
    async fn get(&self, key: &str) -> StorageResult<Bytes>;

    /// Write a blob atomically.
    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()>;

    /// Delete a blob. Deleting a missing key reports `NotFound`.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// List committed blob keys (in-flight temp files are excluded).
    async fn list(&self) -> StorageResult<Vec<String>>;

    /// Backend identifier used in logs and metrics.
    fn backend_name(&self) -> &'static str;

    /// Verify the backend is reachable and writable.
    ///
    /// Called once at startup; a failure aborts the process.
    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}

/// Metadata about a stored blob.
#[derive(Clone, Debug)]
pub struct BlobMeta {
    /// Blob size in bytes.
    pub size: u64,
    /// Last modification time (if available).
    pub last_modified: Option<time::OffsetDateTime>,
}
