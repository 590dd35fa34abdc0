//! Application state shared across handlers.

use crate::auth::AuthGateway;
use crate::service::{AccountService, PaperService, SessionStore};
use folio_core::config::AppConfig;
use folio_metadata::MetadataStore;
use folio_storage::BlobStore;
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Blob storage backend.
    pub storage: Arc<dyn BlobStore>,
    /// Metadata store.
    pub metadata: Arc<dyn MetadataStore>,
    /// Session token resolution.
    pub auth: AuthGateway,
    /// Signup, login and profile lookup.
    pub accounts: AccountService,
    /// Paper records and blobs.
    pub papers: PaperService,
}

impl AppState {
    /// Wire the services onto the given stores.
    pub fn new(
        config: AppConfig,
        storage: Arc<dyn BlobStore>,
        metadata: Arc<dyn MetadataStore>,
    ) -> Self {
        let sessions = SessionStore::new(metadata.clone());
        let auth = AuthGateway::new(sessions.clone());
        let accounts = AccountService::new(metadata.clone(), sessions);
        let papers = PaperService::new(
            metadata.clone(),
            storage.clone(),
            config.server.public_prefix_trimmed(),
        );

        Self {
            config: Arc::new(config),
            storage,
            metadata,
            auth,
            accounts,
            papers,
        }
    }
}
