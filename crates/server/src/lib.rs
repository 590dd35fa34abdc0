//! HTTP API server for the folio document repository.
//!
//! Serves account signup/login, the paper catalog (list, upload, delete,
//! preview) and static retrieval of stored files.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod routes;
pub mod service;
pub mod state;

pub use auth::{AuthGateway, AuthOutcome, TraceId};
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
