//! Database models mapping to the metadata schema.

use sqlx::FromRow;
use time::OffsetDateTime;

// =============================================================================
// Users
// =============================================================================

/// Registered user.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub user_id: i64,
    pub username: String,
    /// Argon2 PHC string; never the plaintext.
    pub password_hash: String,
    /// Optional default storage path shown by userinfo.
    pub file_path: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Fields needed to insert a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub created_at: OffsetDateTime,
}

// =============================================================================
// Sessions
// =============================================================================

/// Login session keyed by the SHA-256 digest of its bearer token.
#[derive(Debug, Clone, FromRow)]
pub struct SessionRow {
    pub token_hash: String,
    pub user_id: i64,
    pub created_at: OffsetDateTime,
}

// =============================================================================
// Papers
// =============================================================================

/// Uploaded file record.
///
/// `file_path` is the blob key under the upload root and is unique: exactly
/// one record may reference a given blob.
#[derive(Debug, Clone, FromRow)]
pub struct PaperRow {
    pub paper_id: i64,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub year: i64,
    pub abstract_text: String,
    pub file_name: String,
    pub file_path: String,
    pub user_id: i64,
    pub created_at: OffsetDateTime,
}

/// Fields needed to insert a paper; the id is assigned by the database.
#[derive(Debug, Clone)]
pub struct NewPaper {
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub year: i64,
    pub abstract_text: String,
    pub file_name: String,
    pub file_path: String,
    pub user_id: i64,
    pub created_at: OffsetDateTime,
}
