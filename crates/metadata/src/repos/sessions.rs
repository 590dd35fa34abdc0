//! Session repository.

use crate::error::MetadataResult;
use crate::models::SessionRow;
use async_trait::async_trait;

/// Repository for login sessions.
///
/// Sessions have no expiry and are never revoked.
#[async_trait]
pub trait SessionRepo: Send + Sync {
    /// Persist a session.
    async fn create_session(&self, session: &SessionRow) -> MetadataResult<()>;

    /// Exact-match lookup by token digest.
    async fn get_session_by_hash(&self, token_hash: &str) -> MetadataResult<Option<SessionRow>>;

    /// Number of sessions held by a user.
    async fn count_sessions_for_user(&self, user_id: i64) -> MetadataResult<u64>;
}
