//! Paper catalog endpoints: list, upload, delete, preview.

use crate::auth::AuthOutcome;
use crate::error::{ApiError, ApiResult};
use crate::service::{NewUpload, ServiceError};
use crate::state::AppState;
use axum::Json;
use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{Extension, Multipart, Query, State};
use axum::http::StatusCode;
use bytes::{Bytes, BytesMut};
use folio_metadata::models::PaperRow;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// JSON shape of a paper record.
#[derive(Debug, Serialize)]
pub struct PaperResponse {
    #[serde(rename = "ID")]
    pub id: i64,
    pub title: String,
    pub author: String,
    pub publisher: String,
    pub year: i64,
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub file_name: String,
    pub file_path: String,
    pub user_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<PaperRow> for PaperResponse {
    fn from(row: PaperRow) -> Self {
        Self {
            id: row.paper_id,
            title: row.title,
            author: row.author,
            publisher: row.publisher,
            year: row.year,
            abstract_text: row.abstract_text,
            file_name: row.file_name,
            file_path: row.file_path,
            user_id: row.user_id,
            created_at: row.created_at,
        }
    }
}

/// `?fileId=` query parameter.
#[derive(Debug, Default, Deserialize)]
pub struct FileIdQuery {
    #[serde(rename = "fileId")]
    pub file_id: Option<String>,
}

impl FileIdQuery {
    fn parse(&self) -> ApiResult<i64> {
        let raw = self
            .file_id
            .as_deref()
            .ok_or_else(|| ApiError::BadRequest("missing fileId".to_string()))?;
        raw.trim()
            .parse()
            .map_err(|_| ApiError::BadRequest(format!("invalid fileId: {raw:?}")))
    }
}

/// Response body of delete.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    /// "true" or "false", as a string.
    pub result: &'static str,
}

/// Response body of preview.
#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    #[serde(rename = "fileUrl")]
    pub file_url: String,
}

/// GET /api/tables - List papers visible to the caller.
pub async fn list_papers(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthOutcome>,
) -> ApiResult<Json<Vec<PaperResponse>>> {
    let rows = state.papers.list(&auth).await?;
    Ok(Json(rows.into_iter().map(PaperResponse::from).collect()))
}

fn multipart_error(err: MultipartError) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(err.body_text())
    } else {
        ApiError::BadRequest(err.body_text())
    }
}

/// Buffer a file part, failing once it grows past `max_bytes`.
async fn read_file_field(mut field: Field<'_>, max_bytes: u64) -> ApiResult<Bytes> {
    let mut buf = BytesMut::new();
    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        if (buf.len() + chunk.len()) as u64 > max_bytes {
            return Err(ApiError::PayloadTooLarge(format!("file exceeds {max_bytes} bytes")));
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf.freeze())
}

async fn field_text(field: Field<'_>) -> ApiResult<String> {
    field.text().await.map_err(multipart_error)
}

/// POST /upload/file - Store a file and record it for the caller.
///
/// The session token may also be sent as a `sessionToken` form field.
pub async fn upload_paper(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthOutcome>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<PaperResponse>)> {
    if auth == AuthOutcome::Invalid {
        return Err(ApiError::Unauthorized("invalid session token".to_string()));
    }

    let max_bytes = state.config.server.max_upload_bytes;
    let mut upload = NewUpload::default();
    let mut file_seen = false;
    let mut form_token = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                upload.original_name = field.file_name().unwrap_or_default().to_string();
                upload.data = read_file_field(field, max_bytes).await?;
                file_seen = true;
            }
            "title" => upload.title = field_text(field).await?,
            "author" => upload.author = field_text(field).await?,
            "publisher" => upload.publisher = field_text(field).await?,
            "abstract" => upload.abstract_text = field_text(field).await?,
            "year" => {
                let raw = field_text(field).await?;
                let raw = raw.trim();
                upload.year = if raw.is_empty() {
                    0
                } else {
                    raw.parse()
                        .map_err(|_| ApiError::BadRequest(format!("invalid year: {raw:?}")))?
                };
            }
            "sessionToken" => form_token = Some(field_text(field).await?),
            _ => {}
        }
    }

    let auth = match (auth, form_token) {
        (AuthOutcome::Anonymous, Some(token)) => state.auth.resolve(Some(token.as_str())).await?,
        (auth, _) => auth,
    };
    let user_id = auth.require_user()?;

    if !file_seen {
        return Err(ApiError::BadRequest("missing file field".to_string()));
    }

    let row = state.papers.upload(user_id, upload).await?;
    Ok((StatusCode::CREATED, Json(row.into())))
}

/// GET /api/delete - Delete one of the caller's papers.
///
/// A missing paper and someone else's paper both answer `"false"`.
pub async fn delete_paper(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthOutcome>,
    Query(query): Query<FileIdQuery>,
) -> ApiResult<Json<DeleteResponse>> {
    let user_id = auth.require_user()?;
    let paper_id = query.parse()?;

    match state.papers.delete(user_id, paper_id).await {
        Ok(()) => Ok(Json(DeleteResponse { result: "true" })),
        Err(ServiceError::NotFound(_) | ServiceError::Forbidden(_)) => {
            Ok(Json(DeleteResponse { result: "false" }))
        }
        Err(e) => Err(e.into()),
    }
}

/// GET /api/preview - URL of a paper's stored file.
pub async fn preview_paper(
    State(state): State<AppState>,
    Query(query): Query<FileIdQuery>,
) -> ApiResult<Json<PreviewResponse>> {
    let paper_id = query.parse()?;
    let file_url = state.papers.preview(paper_id).await?;
    Ok(Json(PreviewResponse { file_url }))
}
