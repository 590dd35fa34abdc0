//! Signup, login and user info endpoints.

use crate::auth::AuthOutcome;
use crate::error::ApiResult;
use crate::service::ServiceError;
use crate::state::AppState;
use axum::Json;
use axum::extract::{Extension, Form, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

/// Form body shared by signup and login.
#[derive(Debug, Default, Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Response body of signup and login.
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl AccountResponse {
    fn ok(message: &str, token: Option<String>) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            token,
        }
    }

    fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            token: None,
        }
    }
}

/// Response body of userinfo.
#[derive(Debug, Serialize)]
pub struct UserInfoResponse {
    pub username: String,
    pub file_path: String,
}

/// POST /api/signup - Register a user.
pub async fn signup(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> ApiResult<Response> {
    match state.accounts.signup(&form.username, &form.password).await {
        Ok(_) => Ok(Json(AccountResponse::ok("signup succeeded", None)).into_response()),
        Err(ServiceError::AlreadyExists(_)) => {
            Ok(Json(AccountResponse::rejected("username is already registered")).into_response())
        }
        Err(ServiceError::InvalidInput(msg)) => {
            Ok((StatusCode::BAD_REQUEST, Json(AccountResponse::rejected(msg))).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// POST /api/login - Check credentials and issue a session token.
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> ApiResult<Json<AccountResponse>> {
    match state.accounts.login(&form.username, &form.password).await {
        Ok(token) => Ok(Json(AccountResponse::ok(
            "login succeeded",
            Some(token.into_inner()),
        ))),
        Err(ServiceError::InvalidCredentials) => Ok(Json(AccountResponse::rejected(
            "invalid username or password",
        ))),
        Err(e) => Err(e.into()),
    }
}

/// GET /api/userinfo - Profile of the session's user.
pub async fn userinfo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthOutcome>,
) -> ApiResult<Json<UserInfoResponse>> {
    let user_id = auth.require_user()?;
    let info = state.accounts.userinfo(user_id).await?;
    Ok(Json(UserInfoResponse {
        username: info.username,
        file_path: info.file_path,
    }))
}
