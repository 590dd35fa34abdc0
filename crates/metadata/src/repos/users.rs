//! User repository.

use crate::error::MetadataResult;
use crate::models::{NewUser, UserRow};
use async_trait::async_trait;

/// Repository for user accounts.
#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Create a user, returning its id.
    ///
    /// Fails with `AlreadyExists` when the username is taken.
    async fn create_user(&self, user: &NewUser) -> MetadataResult<i64>;

    /// Get a user by id.
    async fn get_user(&self, user_id: i64) -> MetadataResult<Option<UserRow>>;

    /// Get a user by exact username.
    async fn get_user_by_username(&self, username: &str) -> MetadataResult<Option<UserRow>>;
}
