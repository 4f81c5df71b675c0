//! Static informational endpoints.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

use crate::config::WORKER_THREADS;
use crate::handlers::diagnostics::SERVICE_NAME;
use crate::state::AppState;

/// GET /
pub async fn index() -> Json<Value> {
    Json(json!({
        "service": SERVICE_NAME,
        "description": "Accepts booking and contact form submissions and appends them to Google Sheets",
        "version": env!("CARGO_PKG_VERSION"),
        "health": "/api/health",
        "test": "/api/test",
    }))
}

/// GET /api/test
pub async fn test() -> Json<Value> {
    Json(json!({
        "message": "API is working",
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
        "endpoints": {
            "booking": "POST /api/booking",
            "contact": "POST /api/contact",
            "health": "GET /api/health",
            "config": "GET /api/config",
            "test_connection": "GET /api/test-connection",
            "debug": "GET /api/debug",
        },
    }))
}

/// GET /api/debug -- which settings are present, never their values.
pub async fn debug(State(state): State<AppState>) -> Json<Value> {
    let google = &state.config.google;

    Json(json!({
        "environment": state.config.environment,
        "version": env!("CARGO_PKG_VERSION"),
        "worker_threads": WORKER_THREADS,
        "spreadsheet_id_set": google.spreadsheet_id().is_some(),
        "credentials": {
            "secret_file_exists": google.secret_file_path.exists(),
            "inline_json_set": google.credentials_json.is_some(),
            "local_file_exists": google.credentials_path.exists(),
            "resolved_source": state.sheets.source(),
        },
    }))
}
