//! Fault-injecting store wrappers.

use async_trait::async_trait;
use bytes::Bytes;
use folio_metadata::models::{NewPaper, NewUser, PaperRow, SessionRow, UserRow};
use folio_metadata::repos::{PaperRepo, SessionRepo, UserRepo};
use folio_metadata::{MetadataError, MetadataResult, MetadataStore};
use folio_storage::{BlobMeta, BlobStore, StorageError, StorageResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Metadata store that counts paper inserts and can be told to fail them.
#[allow(dead_code)]
pub struct InsertTrackingStore {
    inner: Arc<dyn MetadataStore>,
    fail_inserts: bool,
    pub attempts: AtomicUsize,
}

#[allow(dead_code)]
impl InsertTrackingStore {
    /// Every paper insert fails.
    pub fn failing(inner: Arc<dyn MetadataStore>) -> Self {
        Self {
            inner,
            fail_inserts: true,
            attempts: AtomicUsize::new(0),
        }
    }

    /// Paper inserts reach the inner store.
    pub fn passing(inner: Arc<dyn MetadataStore>) -> Self {
        Self {
            fail_inserts: false,
            ..Self::failing(inner)
        }
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl UserRepo for InsertTrackingStore {
    async fn create_user(&self, user: &NewUser) -> MetadataResult<i64> {
        self.inner.create_user(user).await
    }

    async fn get_user(&self, user_id: i64) -> MetadataResult<Option<UserRow>> {
        self.inner.get_user(user_id).await
    }

    async fn get_user_by_username(&self, username: &str) -> MetadataResult<Option<UserRow>> {
        self.inner.get_user_by_username(username).await
    }
}

#[async_trait]
impl SessionRepo for InsertTrackingStore {
    async fn create_session(&self, session: &SessionRow) -> MetadataResult<()> {
        self.inner.create_session(session).await
    }

    async fn get_session_by_hash(&self, token_hash: &str) -> MetadataResult<Option<SessionRow>> {
        self.inner.get_session_by_hash(token_hash).await
    }

    async fn count_sessions_for_user(&self, user_id: i64) -> MetadataResult<u64> {
        self.inner.count_sessions_for_user(user_id).await
    }
}

#[async_trait]
impl PaperRepo for InsertTrackingStore {
    async fn create_paper(&self, paper: &NewPaper) -> MetadataResult<PaperRow> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_inserts {
            return Err(MetadataError::Internal("injected insert failure".to_string()));
        }
        self.inner.create_paper(paper).await
    }

    async fn get_paper(&self, paper_id: i64) -> MetadataResult<Option<PaperRow>> {
        self.inner.get_paper(paper_id).await
    }

    async fn list_papers(&self) -> MetadataResult<Vec<PaperRow>> {
        self.inner.list_papers().await
    }

    async fn list_papers_for_user(&self, user_id: i64) -> MetadataResult<Vec<PaperRow>> {
        self.inner.list_papers_for_user(user_id).await
    }

    async fn delete_paper(&self, paper_id: i64, user_id: i64) -> MetadataResult<bool> {
        self.inner.delete_paper(paper_id, user_id).await
    }
}

#[async_trait]
impl MetadataStore for InsertTrackingStore {
    async fn migrate(&self) -> MetadataResult<()> {
        self.inner.migrate().await
    }

    async fn health_check(&self) -> MetadataResult<()> {
        self.inner.health_check().await
    }
}

/// Blob store whose deletes always fail.
#[allow(dead_code)]
pub struct FailingDeleteBlobStore {
    inner: Arc<dyn BlobStore>,
}

#[allow(dead_code)]
impl FailingDeleteBlobStore {
    pub fn new(inner: Arc<dyn BlobStore>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl BlobStore for FailingDeleteBlobStore {
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.inner.exists(key).await
    }

    async fn head(&self, key: &str) -> StorageResult<BlobMeta> {
        self.inner.head(key).await
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, data: Bytes) -> StorageResult<()> {
        self.inner.put(key, data).await
    }

    async fn delete(&self, _key: &str) -> StorageResult<()> {
        Err(StorageError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "injected delete failure",
        )))
    }

    async fn list(&self) -> StorageResult<Vec<String>> {
        self.inner.list().await
    }

    fn backend_name(&self) -> &'static str {
        "failing-delete"
    }
}

/// Blob store whose writes always fail.
#[allow(dead_code)]
pub struct FailingPutBlobStore {
    inner: Arc<dyn BlobStore>,
}

#[allow(dead_code)]
impl FailingPutBlobStore {
    pub fn new(inner: Arc<dyn BlobStore>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl BlobStore for FailingPutBlobStore {
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        self.inner.exists(key).await
    }

    async fn head(&self, key: &str) -> StorageResult<BlobMeta> {
        self.inner.head(key).await
    }

    async fn get(&self, key: &str) -> StorageResult<Bytes> {
        self.inner.get(key).await
    }

    async fn put(&self, _key: &str, _data: Bytes) -> StorageResult<()> {
        Err(StorageError::Io(std::io::Error::other("injected write failure")))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.inner.delete(key).await
    }

    async fn list(&self) -> StorageResult<Vec<String>> {
        self.inner.list().await
    }

    fn backend_name(&self) -> &'static str {
        "failing-put"
    }
}
