//! Server test utilities.

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use folio_core::config::{AppConfig, MetadataConfig, StorageConfig};
use folio_metadata::{MetadataStore, SqliteStore};
use folio_server::{AppState, create_router};
use folio_storage::{BlobStore, FilesystemBackend};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "folio-test-boundary-7MA4YWxkTrZu0gW";

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub state: AppState,
    pub storage_root: PathBuf,
    _temp_dir: TempDir,
}

/// A file part plus text fields for a multipart upload.
#[allow(dead_code)]
pub struct UploadForm<'a> {
    pub file: Option<(&'a str, &'a [u8])>,
    pub fields: Vec<(&'a str, &'a str)>,
}

#[allow(dead_code)]
impl<'a> UploadForm<'a> {
    pub fn file(name: &'a str, data: &'a [u8]) -> Self {
        Self {
            file: Some((name, data)),
            fields: vec![
                ("title", "A Paper"),
                ("author", "A. Author"),
                ("publisher", "Press"),
                ("year", "2021"),
                ("abstract", "Short."),
            ],
        }
    }

    pub fn field(mut self, name: &'a str, value: &'a str) -> Self {
        self.fields.retain(|(n, _)| *n != name);
        self.fields.push((name, value));
        self
    }

    pub fn without_file(mut self) -> Self {
        self.file = None;
        self
    }

    fn encode(&self) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in &self.fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((file_name, data)) = self.file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }
}

/// Percent-encode a form value.
fn form_encode(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                (b as char).to_string()
            }
            _ => format!("%{b:02X}"),
        })
        .collect()
}

#[allow(dead_code)]
impl TestServer {
    /// Create a new test server with temporary storage.
    pub async fn new() -> Self {
        Self::with_config(|_| {}).await
    }

    /// Create a test server with custom config modifications.
    pub async fn with_config<F>(modifier: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        Self::with_stores(modifier, |storage| storage, |metadata| metadata).await
    }

    /// Create a test server whose stores are wrapped before use.
    pub async fn with_stores<F, S, M>(modifier: F, wrap_storage: S, wrap_metadata: M) -> Self
    where
        F: FnOnce(&mut AppConfig),
        S: FnOnce(Arc<dyn BlobStore>) -> Arc<dyn BlobStore>,
        M: FnOnce(Arc<dyn MetadataStore>) -> Arc<dyn MetadataStore>,
    {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");

        let storage_root = temp_dir.path().join("uploadfiles");
        let storage: Arc<dyn BlobStore> = Arc::new(
            FilesystemBackend::new(&storage_root)
                .await
                .expect("Failed to create storage backend"),
        );

        let db_path = temp_dir.path().join("metadata.db");
        let metadata: Arc<dyn MetadataStore> = Arc::new(
            SqliteStore::new(&db_path)
                .await
                .expect("Failed to create metadata store"),
        );

        let mut config = AppConfig::for_testing();
        config.storage = StorageConfig::Filesystem {
            path: storage_root.clone(),
        };
        config.metadata = MetadataConfig::Sqlite { path: db_path };
        modifier(&mut config);

        folio_server::metrics::register_metrics();

        let state = AppState::new(config, wrap_storage(storage), wrap_metadata(metadata));
        let router = create_router(state.clone());

        Self {
            router,
            state,
            storage_root,
            _temp_dir: temp_dir,
        }
    }

    /// Send a request and collect status, headers and body.
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, body)
    }

    /// GET a JSON endpoint, optionally with a bearer token.
    pub async fn get_json(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let (status, _, body) = self.send(builder.body(Body::empty()).unwrap()).await;
        (status, parse_json(&body))
    }

    /// GET raw bytes, e.g. a stored file.
    pub async fn fetch(&self, uri: &str) -> (StatusCode, Bytes) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (status, _, body) = self.send(request).await;
        (status, body)
    }

    /// POST a form-encoded body.
    pub async fn post_form(&self, uri: &str, fields: &[(&str, &str)]) -> (StatusCode, Value) {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", form_encode(k), form_encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        let (status, _, body) = self.send(request).await;
        (status, parse_json(&body))
    }

    pub async fn signup(&self, username: &str, password: &str) -> (StatusCode, Value) {
        self.post_form(
            "/api/signup",
            &[("username", username), ("password", password)],
        )
        .await
    }

    pub async fn login(&self, username: &str, password: &str) -> (StatusCode, Value) {
        self.post_form(
            "/api/login",
            &[("username", username), ("password", password)],
        )
        .await
    }

    /// Sign up and log in, returning the session token.
    pub async fn register(&self, username: &str) -> String {
        let password = format!("{username}-password");
        let (status, body) = self.signup(username, &password).await;
        assert_eq!(status, StatusCode::OK, "signup failed: {body}");
        assert_eq!(body["success"], true, "signup failed: {body}");

        let (status, body) = self.login(username, &password).await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"]
            .as_str()
            .expect("login response carries a token")
            .to_string()
    }

    /// POST a multipart upload, optionally with a bearer token.
    pub async fn upload(&self, token: Option<&str>, form: UploadForm<'_>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(Method::POST)
            .uri("/upload/file")
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            );
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let request = builder.body(Body::from(form.encode())).unwrap();
        let (status, _, body) = self.send(request).await;
        (status, parse_json(&body))
    }

    /// Upload a file and return its record id.
    pub async fn upload_file(&self, token: &str, name: &str, data: &[u8]) -> i64 {
        let (status, body) = self.upload(Some(token), UploadForm::file(name, data)).await;
        assert_eq!(status, StatusCode::CREATED, "upload failed: {body}");
        body["ID"].as_i64().expect("record carries an ID")
    }

    /// Ids visible to the given token, in listing order.
    pub async fn listed_ids(&self, token: Option<&str>) -> Vec<i64> {
        let (status, body) = self.get_json("/api/tables", token).await;
        assert_eq!(status, StatusCode::OK, "list failed: {body}");
        body.as_array()
            .expect("listing is an array")
            .iter()
            .map(|record| record["ID"].as_i64().unwrap())
            .collect()
    }

    /// Names of the blobs currently on disk.
    pub async fn stored_blobs(&self) -> Vec<String> {
        self.state.storage.list().await.unwrap()
    }
}

fn parse_json(body: &[u8]) -> Value {
    if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(body).unwrap_or(Value::Null)
    }
}
