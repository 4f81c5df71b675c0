#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use intake_api::config::{GoogleConfig, ServerConfig};
use intake_api::router::build_app_router;
use intake_api::state::{AppState, SheetsConnection};
use intake_sheets::memory::InMemorySheets;
use intake_sheets::{SourceKind, SpreadsheetWriter};

pub const SPREADSHEET_ID: &str = "abc123";
pub const SERVICE_EMAIL: &str = "intake@forms-prod.iam.gserviceaccount.com";

/// Build a test `ServerConfig` with safe defaults.
///
/// Points every credential path at a location that does not exist, so the
/// only credentials in play are the ones a test wires in explicitly.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["*".to_string()],
        request_timeout_secs: 30,
        environment: "test".to_string(),
        google: GoogleConfig {
            spreadsheet_id: Some(format!("{SPREADSHEET_ID}#gid=0")),
            credentials_json: None,
            credentials_path: PathBuf::from("/nonexistent/credentials.json"),
            secret_file_path: PathBuf::from("/nonexistent/secrets/credentials.json"),
        },
    }
}

/// An in-memory spreadsheet store holding one fresh spreadsheet.
pub fn sheets() -> Arc<InMemorySheets> {
    let sheets = Arc::new(InMemorySheets::new(SERVICE_EMAIL).with_project_id("forms-prod"));
    sheets.add_spreadsheet(SPREADSHEET_ID, "Website Forms", &["Sheet1"]);
    sheets
}

/// A ready connection backed by the given store.
pub fn ready(sheets: Arc<InMemorySheets>) -> SheetsConnection {
    SheetsConnection::Ready {
        writer: SpreadsheetWriter::new(sheets),
        source: SourceKind::InlineJson,
        origin: "GOOGLE_CREDENTIALS_JSON".to_string(),
    }
}

pub fn unavailable() -> SheetsConnection {
    SheetsConnection::Unavailable {
        reason: "Google credentials not found. Checked: GOOGLE_CREDENTIALS_JSON (not found)"
            .to_string(),
    }
}

/// Build the full application router with all middleware layers.
///
/// Uses the same builder as `main.rs` so integration tests exercise the
/// production middleware stack (CORS, request ID, timeout, tracing, panic
/// recovery).
pub fn build_test_app(sheets: SheetsConnection) -> Router {
    build_test_app_with(test_config(), sheets)
}

pub fn build_test_app_with(config: ServerConfig, sheets: SheetsConnection) -> Router {
    let state = AppState {
        config: Arc::new(config.clone()),
        sheets,
    };
    build_app_router(state, &config)
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, Body::empty()).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response {
    post_raw(app, uri, &body.to_string()).await
}

pub async fn post_raw(app: Router, uri: &str, body: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn options(app: Router, uri: &str) -> Response {
    send(app, Method::OPTIONS, uri, Body::empty()).await
}

async fn send(app: Router, method: Method, uri: &str, body: Body) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(body)
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
