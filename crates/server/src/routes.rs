//! Route configuration.

use crate::auth::auth_middleware;
use crate::handlers;
use crate::metrics::metrics_handler;
use crate::state::AppState;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method};
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Headroom above `max_upload_bytes` for multipart framing and text fields.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let server = &state.config.server;
    let origins = &server.cors_allowed_origins;

    let read_routes = Router::new()
        .route("/api/tables", get(handlers::list_papers))
        .route("/api/delete", get(handlers::delete_paper))
        .route("/api/preview", get(handlers::preview_paper))
        .route("/api/userinfo", get(handlers::userinfo))
        // Unauthenticated; used by probes.
        .route("/api/health", get(handlers::health_check))
        .layer(cors_layer(origins, &[Method::GET]));

    let body_limit = usize::try_from(server.max_upload_bytes)
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    let write_routes = Router::new()
        .route(
            "/upload/file",
            post(handlers::upload_paper).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/api/login", post(handlers::login))
        .route("/api/signup", post(handlers::signup))
        .layer(cors_layer(origins, &[Method::POST]));

    let mut router = Router::new().merge(read_routes).merge(write_routes);

    // Network-restrict this endpoint when exposed.
    if server.metrics_enabled {
        router = router.route("/metrics", get(metrics_handler));
    }

    let files = ServeDir::new(state.config.storage.root());
    router = match server.public_prefix_trimmed() {
        "/" => router.fallback_service(files),
        prefix => router.nest_service(prefix, files),
    };

    // Order of execution: TraceLayer -> Auth -> Handler
    router
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy for a group of routes sharing the same methods.
///
/// An empty origin list allows any origin.
fn cors_layer(origins: &[String], methods: &[Method]) -> CorsLayer {
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!(origin = %origin, "Ignoring unparseable CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    let mut allowed = methods.to_vec();
    allowed.push(Method::OPTIONS);

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(allowed)
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
}
