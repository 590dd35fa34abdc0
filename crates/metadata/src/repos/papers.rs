//! Paper repository.

use crate::error::MetadataResult;
use crate::models::{NewPaper, PaperRow};
use async_trait::async_trait;

/// Repository for uploaded file records.
#[async_trait]
pub trait PaperRepo: Send + Sync {
    /// Insert a record and return it with its assigned id.
    async fn create_paper(&self, paper: &NewPaper) -> MetadataResult<PaperRow>;

    /// Get a record by id.
    async fn get_paper(&self, paper_id: i64) -> MetadataResult<Option<PaperRow>>;

    /// All records, ordered by id.
    async fn list_papers(&self) -> MetadataResult<Vec<PaperRow>>;

    /// Records owned by a user, ordered by id.
    async fn list_papers_for_user(&self, user_id: i64) -> MetadataResult<Vec<PaperRow>>;

    /// Delete a record if it is owned by `user_id`.
    ///
    /// Returns `false` when no row matched, which covers a missing record,
    /// a foreign owner, and losing a race against a concurrent delete.
    async fn delete_paper(&self, paper_id: i64, user_id: i64) -> MetadataResult<bool>;
}
