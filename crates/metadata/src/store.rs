//! Metadata store trait and the SQLite implementation.

use crate::error::{MetadataResult, unique_violation_as_exists};
use crate::models::{NewPaper, NewUser, PaperRow, SessionRow, UserRow};
use crate::repos::{PaperRepo, SessionRepo, UserRepo};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Combined metadata store trait.
#[async_trait]
pub trait MetadataStore: UserRepo + SessionRepo + PaperRepo + Send + Sync {
    /// Run database migrations.
    async fn migrate(&self) -> MetadataResult<()>;

    /// Check database connectivity and health.
    async fn health_check(&self) -> MetadataResult<()>;
}

/// SQLite-based metadata store.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Open (creating if needed) a SQLite database and apply the schema.
    pub async fn new(path: impl AsRef<Path>) -> MetadataResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .foreign_keys(true)
            // Prevent transient "database is locked" errors under concurrent access.
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            // A single connection serializes writers; concurrent requests queue on the pool.
            .max_connections(1)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;

        tracing::debug!(path = %path.display(), "opened sqlite metadata store");
        Ok(store)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[async_trait]
impl MetadataStore for SqliteStore {
    async fn migrate(&self) -> MetadataResult<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    async fn health_check(&self) -> MetadataResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

mod sqlite_impl {
    use super::*;

    #[async_trait]
    impl UserRepo for SqliteStore {
        async fn create_user(&self, user: &NewUser) -> MetadataResult<i64> {
            let user_id: i64 = sqlx::query_scalar(
                "INSERT INTO users (username, password_hash, created_at) VALUES (?, ?, ?) RETURNING user_id",
            )
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                unique_violation_as_exists(e, || format!("username '{}'", user.username))
            })?;
            Ok(user_id)
        }

        async fn get_user(&self, user_id: i64) -> MetadataResult<Option<UserRow>> {
            let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE user_id = ?")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn get_user_by_username(&self, username: &str) -> MetadataResult<Option<UserRow>> {
            let row = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE username = ?")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }
    }

    #[async_trait]
    impl SessionRepo for SqliteStore {
        async fn create_session(&self, session: &SessionRow) -> MetadataResult<()> {
            sqlx::query("INSERT INTO sessions (token_hash, user_id, created_at) VALUES (?, ?, ?)")
                .bind(&session.token_hash)
                .bind(session.user_id)
                .bind(session.created_at)
                .execute(&self.pool)
                .await
                .map_err(|e| unique_violation_as_exists(e, || "session token".to_string()))?;
            Ok(())
        }

        async fn get_session_by_hash(
            &self,
            token_hash: &str,
        ) -> MetadataResult<Option<SessionRow>> {
            let row =
                sqlx::query_as::<_, SessionRow>("SELECT * FROM sessions WHERE token_hash = ?")
                    .bind(token_hash)
                    .fetch_optional(&self.pool)
                    .await?;
            Ok(row)
        }

        async fn count_sessions_for_user(&self, user_id: i64) -> MetadataResult<u64> {
            let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE user_id = ?")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;
            Ok(count as u64)
        }
    }

    #[async_trait]
    impl PaperRepo for SqliteStore {
        async fn create_paper(&self, paper: &NewPaper) -> MetadataResult<PaperRow> {
            let row = sqlx::query_as::<_, PaperRow>(
                r#"
                INSERT INTO papers (
                    title, author, publisher, year, abstract_text,
                    file_name, file_path, user_id, created_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                RETURNING *
                "#,
            )
            .bind(&paper.title)
            .bind(&paper.author)
            .bind(&paper.publisher)
            .bind(paper.year)
            .bind(&paper.abstract_text)
            .bind(&paper.file_name)
            .bind(&paper.file_path)
            .bind(paper.user_id)
            .bind(paper.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                unique_violation_as_exists(e, || format!("file_path '{}'", paper.file_path))
            })?;
            Ok(row)
        }

        async fn get_paper(&self, paper_id: i64) -> MetadataResult<Option<PaperRow>> {
            let row = sqlx::query_as::<_, PaperRow>("SELECT * FROM papers WHERE paper_id = ?")
                .bind(paper_id)
                .fetch_optional(&self.pool)
                .await?;
            Ok(row)
        }

        async fn list_papers(&self) -> MetadataResult<Vec<PaperRow>> {
            let rows = sqlx::query_as::<_, PaperRow>("SELECT * FROM papers ORDER BY paper_id")
                .fetch_all(&self.pool)
                .await?;
            Ok(rows)
        }

        async fn list_papers_for_user(&self, user_id: i64) -> MetadataResult<Vec<PaperRow>> {
            let rows = sqlx::query_as::<_, PaperRow>(
                "SELECT * FROM papers WHERE user_id = ? ORDER BY paper_id",
            )
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
            Ok(rows)
        }

        async fn delete_paper(&self, paper_id: i64, user_id: i64) -> MetadataResult<bool> {
            let result = sqlx::query("DELETE FROM papers WHERE paper_id = ? AND user_id = ?")
                .bind(paper_id)
                .bind(user_id)
                .execute(&self.pool)
                .await?;
            Ok(result.rows_affected() > 0)
        }
    }
}

/// SQL schema for SQLite.
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    user_id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    file_path TEXT,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS sessions (
    token_hash TEXT PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);

CREATE TABLE IF NOT EXISTS papers (
    paper_id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL DEFAULT '',
    author TEXT NOT NULL DEFAULT '',
    publisher TEXT NOT NULL DEFAULT '',
    year INTEGER NOT NULL DEFAULT 0,
    abstract_text TEXT NOT NULL DEFAULT '',
    file_name TEXT NOT NULL,
    file_path TEXT NOT NULL UNIQUE,
    user_id INTEGER NOT NULL REFERENCES users(user_id),
    created_at TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_papers_user ON papers(user_id);

-- Declared for the frontend data model; no server operation reads or writes these yet.
CREATE TABLE IF NOT EXISTS favorites (
    favorite_id INTEGER PRIMARY KEY AUTOINCREMENT,
    paper_id INTEGER NOT NULL REFERENCES papers(paper_id) ON DELETE CASCADE,
    user_id INTEGER NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    UNIQUE (paper_id, user_id)
);

CREATE TABLE IF NOT EXISTS keywords (
    keyword_id INTEGER PRIMARY KEY AUTOINCREMENT,
    paper_id INTEGER NOT NULL REFERENCES papers(paper_id) ON DELETE CASCADE,
    keyword TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_keywords_paper ON keywords(paper_id);
"#;
