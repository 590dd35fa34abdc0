//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Maximum size of a single uploaded file in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,
    /// URL prefix under which stored files are served.
    /// Preview responses build `fileUrl` from this prefix and the stored name.
    #[serde(default = "default_public_prefix")]
    pub public_prefix: String,
    /// Enable the /metrics endpoint for Prometheus scraping (default: true).
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
    /// Origins allowed by CORS. Empty means any origin.
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_max_upload_bytes() -> u64 {
    crate::DEFAULT_MAX_UPLOAD_BYTES
}

fn default_public_prefix() -> String {
    "/uploadfiles".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_upload_bytes: default_max_upload_bytes(),
            public_prefix: default_public_prefix(),
            metrics_enabled: default_metrics_enabled(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// Validate server configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_upload_bytes == 0 {
            return Err("server.max_upload_bytes must be greater than 0".to_string());
        }
        if usize::try_from(self.max_upload_bytes).is_err() {
            return Err(format!(
                "server.max_upload_bytes {} does not fit in memory on this platform",
                self.max_upload_bytes
            ));
        }
        if !self.public_prefix.starts_with('/') {
            return Err(format!(
                "server.public_prefix must start with '/', got {:?}",
                self.public_prefix
            ));
        }
        Ok(())
    }

    /// Public prefix without a trailing slash.
    pub fn public_prefix_trimmed(&self) -> &str {
        let trimmed = self.public_prefix.trim_end_matches('/');
        if trimmed.is_empty() { "/" } else { trimmed }
    }
}

/// Blob storage backend configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Local filesystem storage.
    Filesystem {
        /// Root directory for stored files.
        path: PathBuf,
    },
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Filesystem {
            path: PathBuf::from("./uploadfiles"),
        }
    }
}

impl StorageConfig {
    /// Root directory of the blob store.
    pub fn root(&self) -> &PathBuf {
        match self {
            StorageConfig::Filesystem { path } => path,
        }
    }
}

/// PostgreSQL SSL mode configuration.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PgSslMode {
    /// Disable SSL/TLS entirely.
    Disable,
    /// Prefer SSL/TLS but allow unencrypted connections (default).
    #[default]
    Prefer,
    /// Require SSL/TLS for all connections.
    Require,
}

/// Metadata store configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MetadataConfig {
    /// SQLite database (default, suited to a single host).
    Sqlite {
        /// Database file path.
        path: PathBuf,
    },
    /// PostgreSQL database.
    Postgres {
        /// Connection URL (optional if using individual fields).
        /// Takes precedence over individual fields if both are provided.
        url: Option<String>,
        /// Database host.
        host: Option<String>,
        /// Database port (default: 5432).
        #[serde(default = "default_pg_port")]
        port: Option<u16>,
        /// Database username.
        username: Option<String>,
        /// Database password.
        /// Prefer FOLIO_METADATA__PASSWORD over storing it in the file.
        password: Option<String>,
        /// Database name.
        database: Option<String>,
        /// SSL mode for connections.
        ssl_mode: Option<PgSslMode>,
        /// Maximum connections in the pool.
        #[serde(default = "default_max_connections")]
        max_connections: u32,
    },
}

fn default_max_connections() -> u32 {
    10
}

fn default_pg_port() -> Option<u16> {
    Some(5432)
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self::Sqlite {
            path: PathBuf::from("./data/metadata.db"),
        }
    }
}

impl MetadataConfig {
    /// Validate metadata configuration invariants.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            MetadataConfig::Sqlite { .. } => Ok(()),
            MetadataConfig::Postgres {
                url,
                host,
                database,
                ..
            } => match (url.as_ref(), host.as_ref(), database.as_ref()) {
                (Some(_), _, _) => Ok(()),
                (None, Some(_), Some(_)) => Ok(()),
                (None, None, _) => Err(
                    "postgres config requires either 'url' or 'host' + 'database'".to_string(),
                ),
                (None, Some(_), None) => Err(
                    "postgres config requires 'database' when using individual fields".to_string(),
                ),
            },
        }
    }
}

/// Complete application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Blob storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Metadata store configuration.
    #[serde(default)]
    pub metadata: MetadataConfig,
}

impl AppConfig {
    /// Create a test configuration with sensible defaults.
    ///
    /// **For testing only.** Uses filesystem storage and SQLite metadata
    /// at their default relative paths; tests normally override both.
    pub fn for_testing() -> Self {
        Self::default()
    }

    /// Validate every section, returning the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        self.server.validate()?;
        self.metadata.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Figment;
    use figment::providers::{Format, Toml};

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind, "127.0.0.1:8080");
        assert_eq!(config.public_prefix, "/uploadfiles");
        assert_eq!(config.max_upload_bytes, crate::DEFAULT_MAX_UPLOAD_BYTES);
        assert!(config.metrics_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_server_config_rejects_zero_upload_limit() {
        let config = ServerConfig {
            max_upload_bytes: 0,
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_public_prefix_trimmed() {
        let mut config = ServerConfig {
            public_prefix: "/files/".to_string(),
            ..ServerConfig::default()
        };
        assert_eq!(config.public_prefix_trimmed(), "/files");

        config.public_prefix = "/".to_string();
        assert_eq!(config.public_prefix_trimmed(), "/");

        config.public_prefix = "files".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_app_config_from_partial_toml() {
        let toml = r#"
            [server]
            bind = "0.0.0.0:9000"

            [storage]
            type = "filesystem"
            path = "/srv/folio/files"

            [metadata]
            type = "sqlite"
            path = "/srv/folio/meta.db"
        "#;
        let config: AppConfig = Figment::from(Toml::string(toml)).extract().unwrap();

        assert_eq!(config.server.bind, "0.0.0.0:9000");
        assert_eq!(config.server.public_prefix, "/uploadfiles");
        assert_eq!(
            config.storage.root(),
            &PathBuf::from("/srv/folio/files")
        );
        assert!(matches!(config.metadata, MetadataConfig::Sqlite { .. }));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_postgres_config_validation() {
        let missing = MetadataConfig::Postgres {
            url: None,
            host: Some("db".to_string()),
            port: Some(5432),
            username: None,
            password: None,
            database: None,
            ssl_mode: None,
            max_connections: 10,
        };
        assert!(missing.validate().is_err());

        let json = r#"{"type":"postgres","url":"postgres://u:p@localhost/folio"}"#;
        let config: MetadataConfig = serde_json::from_str(json).unwrap();
        match &config {
            MetadataConfig::Postgres {
                port,
                max_connections,
                ..
            } => {
                assert_eq!(*port, Some(5432));
                assert_eq!(*max_connections, 10);
            }
            _ => panic!("expected postgres config"),
        }
        assert!(config.validate().is_ok());
    }
}
