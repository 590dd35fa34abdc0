//! Request authentication: session token resolution and trace context.

use crate::error::ApiError;
use crate::service::{ServiceError, ServiceResult, SessionStore};
use crate::state::AppState;
use axum::extract::{Query, Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use folio_core::SessionToken;
use serde::Deserialize;
use tracing::Instrument;
use uuid::Uuid;

/// Maximum length for trace IDs.
/// Longer trace IDs are truncated to prevent log bloat and potential log injection.
const MAX_TRACE_ID_LEN: usize = 128;

/// Trace ID for request correlation.
#[derive(Clone, Debug)]
pub struct TraceId(pub String);

impl TraceId {
    /// Generate a new random trace ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create a trace ID from a client-provided value.
    /// The value is truncated to MAX_TRACE_ID_LEN characters and non-printable characters removed.
    pub fn from_client(value: &str) -> Self {
        let sanitized: String = value
            .chars()
            .take(MAX_TRACE_ID_LEN)
            .filter(|c| c.is_ascii_graphic() || *c == ' ')
            .collect();

        if sanitized.is_empty() {
            Self::new()
        } else {
            Self(sanitized)
        }
    }

    /// Get the trace ID as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TraceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of resolving a request's session token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthOutcome {
    /// A token was presented and names a live session.
    Authenticated { user_id: i64 },
    /// No token was presented.
    Anonymous,
    /// A token was presented but names no session.
    Invalid,
}

impl AuthOutcome {
    /// The user id, or `Unauthorized` for anything but a live session.
    pub fn require_user(&self) -> ServiceResult<i64> {
        match self {
            AuthOutcome::Authenticated { user_id } => Ok(*user_id),
            AuthOutcome::Anonymous => Err(ServiceError::Unauthorized(
                "authentication required".to_string(),
            )),
            AuthOutcome::Invalid => Err(ServiceError::Unauthorized(
                "invalid session token".to_string(),
            )),
        }
    }
}

/// Resolves optional session tokens to an [`AuthOutcome`].
#[derive(Clone)]
pub struct AuthGateway {
    sessions: SessionStore,
}

impl AuthGateway {
    pub fn new(sessions: SessionStore) -> Self {
        Self { sessions }
    }

    /// Resolve a raw token.
    ///
    /// Absent or blank tokens are `Anonymous`. A token that is malformed or
    /// unknown is `Invalid`, never downgraded to `Anonymous`. Only a
    /// metadata fault is an error.
    pub async fn resolve(&self, raw: Option<&str>) -> ServiceResult<AuthOutcome> {
        let Some(raw) = raw.filter(|t| !t.trim().is_empty()) else {
            return Ok(AuthOutcome::Anonymous);
        };

        let Ok(token) = SessionToken::parse(raw) else {
            return Ok(AuthOutcome::Invalid);
        };

        match self.sessions.lookup(&token).await {
            Ok(user_id) => Ok(AuthOutcome::Authenticated { user_id }),
            Err(ServiceError::NotFound(_)) => Ok(AuthOutcome::Invalid),
            Err(e) => Err(e),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct TokenQuery {
    #[serde(rename = "sessionToken")]
    session_token: Option<String>,
}

/// Extract bearer token from Authorization header.
/// Per RFC 6750, the "Bearer" scheme is case-insensitive.
fn extract_bearer_token(req: &Request) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            if v.len() >= 7 && v[..7].eq_ignore_ascii_case("bearer ") {
                Some(&v[7..])
            } else {
                None
            }
        })
}

/// Extract the `sessionToken` query parameter.
fn extract_query_token(req: &Request) -> Option<String> {
    Query::<TokenQuery>::try_from_uri(req.uri())
        .ok()
        .and_then(|Query(q)| q.session_token)
}

/// Extract trace ID from X-Trace-Id header or generate a new one.
fn extract_or_generate_trace_id(req: &Request) -> TraceId {
    req.headers()
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .map(TraceId::from_client)
        .unwrap_or_else(TraceId::new)
}

/// Authentication middleware.
///
/// Resolves the session token from the `Authorization` header, falling back
/// to the `sessionToken` query parameter, and stores the [`AuthOutcome`] and
/// [`TraceId`] as request extensions. Handlers decide what each outcome
/// permits.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let trace_id = extract_or_generate_trace_id(&req);
    let span = tracing::info_span!("request", trace_id = %trace_id);
    req.extensions_mut().insert(trace_id);

    let raw_token = extract_bearer_token(&req)
        .map(str::to_string)
        .or_else(|| extract_query_token(&req));

    let outcome = state
        .auth
        .resolve(raw_token.as_deref())
        .instrument(span.clone())
        .await?;

    if outcome == AuthOutcome::Invalid {
        span.in_scope(|| tracing::debug!("request carried an unknown session token"));
    }
    req.extensions_mut().insert(outcome);

    Ok(next.run(req).instrument(span).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn trace_id_is_sanitized() {
        let id = TraceId::from_client("abc\n\tdef");
        assert_eq!(id.as_str(), "abcdef");

        let long = "x".repeat(500);
        assert_eq!(TraceId::from_client(&long).as_str().len(), MAX_TRACE_ID_LEN);

        // Only control characters: fall back to a generated id
        let generated = TraceId::from_client("\n\n");
        assert!(Uuid::parse_str(generated.as_str()).is_ok());
    }

    #[test]
    fn bearer_scheme_is_case_insensitive() {
        let req = Request::builder()
            .uri("/api/tables")
            .header(AUTHORIZATION, "bEaReR tok123")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_bearer_token(&req), Some("tok123"));

        let basic = Request::builder()
            .uri("/")
            .header(AUTHORIZATION, "Basic Zm9vOmJhcg==")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_bearer_token(&basic), None);
    }

    #[test]
    fn query_token_is_extracted() {
        let req = Request::builder()
            .uri("/api/tables?sessionToken=abc-_123&other=1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_query_token(&req).as_deref(), Some("abc-_123"));

        let empty = Request::builder()
            .uri("/api/tables?sessionToken=")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_query_token(&empty).as_deref(), Some(""));

        let none = Request::builder()
            .uri("/api/tables")
            .body(Body::empty())
            .unwrap();
        assert_eq!(extract_query_token(&none), None);
    }

    #[test]
    fn require_user_only_accepts_live_sessions() {
        assert_eq!(
            AuthOutcome::Authenticated { user_id: 7 }
                .require_user()
                .unwrap(),
            7
        );
        assert!(AuthOutcome::Anonymous.require_user().is_err());
        assert!(AuthOutcome::Invalid.require_user().is_err());
    }
}
