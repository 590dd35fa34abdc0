//! Account operations: signup, login and user info.

use crate::metrics;
use crate::service::error::{ServiceError, ServiceResult};
use crate::service::sessions::SessionStore;
use folio_core::SessionToken;
use folio_metadata::models::NewUser;
use folio_metadata::repos::UserRepo;
use folio_metadata::{MetadataError, MetadataStore};
use std::sync::Arc;
use time::OffsetDateTime;

/// Public profile fields returned by userinfo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserInfo {
    pub username: String,
    pub file_path: String,
}

/// Signup, login and profile lookup.
#[derive(Clone)]
pub struct AccountService {
    metadata: Arc<dyn MetadataStore>,
    sessions: SessionStore,
}

impl AccountService {
    pub fn new(metadata: Arc<dyn MetadataStore>, sessions: SessionStore) -> Self {
        Self { metadata, sessions }
    }

    /// Register a new user and return its id.
    pub async fn signup(&self, username: &str, password: &str) -> ServiceResult<i64> {
        if username.is_empty() || password.is_empty() {
            return Err(ServiceError::InvalidInput(
                "username and password are required".to_string(),
            ));
        }

        let password = password.to_string();
        let password_hash =
            tokio::task::spawn_blocking(move || folio_core::hash_password(&password))
                .await
                .map_err(|e| ServiceError::Internal(format!("hashing task failed: {e}")))?
                .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let user = NewUser {
            username: username.to_string(),
            password_hash,
            created_at: OffsetDateTime::now_utc(),
        };

        match self.metadata.create_user(&user).await {
            Ok(user_id) => {
                tracing::info!(user_id, "user registered");
                Ok(user_id)
            }
            Err(MetadataError::AlreadyExists(what)) => Err(ServiceError::AlreadyExists(what)),
            Err(e) => Err(e.into()),
        }
    }

    /// Check credentials and open a new session.
    ///
    /// An unknown username and a wrong password are indistinguishable.
    pub async fn login(&self, username: &str, password: &str) -> ServiceResult<SessionToken> {
        let Some(user) = self.metadata.get_user_by_username(username).await? else {
            metrics::LOGIN_FAILURES.inc();
            tracing::info!("login rejected: unknown user");
            return Err(ServiceError::InvalidCredentials);
        };

        let password = password.to_string();
        let stored = user.password_hash.clone();
        let verified =
            tokio::task::spawn_blocking(move || folio_core::verify_password(&password, &stored))
                .await
                .map_err(|e| ServiceError::Internal(format!("verify task failed: {e}")))?;

        if verified.is_err() {
            metrics::LOGIN_FAILURES.inc();
            tracing::info!(user_id = user.user_id, "login rejected: bad password");
            return Err(ServiceError::InvalidCredentials);
        }

        self.sessions.create(user.user_id).await
    }

    /// Profile of the user behind a resolved session.
    pub async fn userinfo(&self, user_id: i64) -> ServiceResult<UserInfo> {
        let user = self
            .metadata
            .get_user(user_id)
            .await?
            .ok_or_else(|| {
                ServiceError::Unauthorized("session user no longer exists".to_string())
            })?;
        Ok(UserInfo {
            username: user.username,
            file_path: user.file_path.unwrap_or_default(),
        })
    }
}
