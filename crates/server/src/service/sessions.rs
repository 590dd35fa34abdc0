//! Session store: opaque bearer tokens mapped to user ids.

use crate::metrics;
use crate::service::error::{ServiceError, ServiceResult};
use folio_core::SessionToken;
use folio_metadata::MetadataStore;
use folio_metadata::models::SessionRow;
use folio_metadata::repos::SessionRepo;
use std::sync::Arc;
use time::OffsetDateTime;

/// Issues and resolves login sessions.
///
/// Sessions never expire and are never revoked; a user may hold any number
/// of them at once.
#[derive(Clone)]
pub struct SessionStore {
    metadata: Arc<dyn MetadataStore>,
}

impl SessionStore {
    pub fn new(metadata: Arc<dyn MetadataStore>) -> Self {
        Self { metadata }
    }

    /// Create a fresh session for `user_id` and return its token.
    pub async fn create(&self, user_id: i64) -> ServiceResult<SessionToken> {
        let token = SessionToken::generate();
        let row = SessionRow {
            token_hash: token.digest(),
            user_id,
            created_at: OffsetDateTime::now_utc(),
        };
        self.metadata.create_session(&row).await?;
        metrics::SESSIONS_CREATED.inc();
        let sessions = self.active_count(user_id).await?;
        tracing::info!(user_id, sessions, "session created");
        Ok(token)
    }

    /// Number of live sessions held by `user_id`.
    pub async fn active_count(&self, user_id: i64) -> ServiceResult<u64> {
        Ok(self.metadata.count_sessions_for_user(user_id).await?)
    }

    /// Resolve a token to its user id.
    ///
    /// An unknown token is `NotFound`; a database failure is `Storage`.
    pub async fn lookup(&self, token: &SessionToken) -> ServiceResult<i64> {
        self.metadata
            .get_session_by_hash(&token.digest())
            .await?
            .map(|row| row.user_id)
            .ok_or_else(|| ServiceError::NotFound("session".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_metadata::SqliteStore;
    use folio_metadata::models::NewUser;
    use folio_metadata::repos::UserRepo;

    #[tokio::test]
    async fn sessions_accumulate_per_user() {
        let dir = tempfile::tempdir().unwrap();
        let metadata: Arc<dyn MetadataStore> =
            Arc::new(SqliteStore::new(dir.path().join("meta.db")).await.unwrap());
        let user_id = metadata
            .create_user(&NewUser {
                username: "alice".to_string(),
                password_hash: "x".to_string(),
                created_at: OffsetDateTime::now_utc(),
            })
            .await
            .unwrap();
        let sessions = SessionStore::new(metadata);
        assert_eq!(sessions.active_count(user_id).await.unwrap(), 0);

        let first = sessions.create(user_id).await.unwrap();
        let second = sessions.create(user_id).await.unwrap();
        assert_ne!(first, second);
        assert_eq!(sessions.active_count(user_id).await.unwrap(), 2);

        assert_eq!(sessions.lookup(&first).await.unwrap(), user_id);
        let unknown = SessionToken::generate();
        assert!(matches!(
            sessions.lookup(&unknown).await,
            Err(ServiceError::NotFound(_))
        ));
    }
}
