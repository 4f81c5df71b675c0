//! Operator-facing diagnostics: health, configuration report, and a live
//! connection test against the configured spreadsheet.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use intake_sheets::credentials::{inspect_file, FileInspection};
use intake_sheets::SourceKind;

use crate::error::{AppError, AppResult};
use crate::state::{AppState, SheetsConnection};

pub const SERVICE_NAME: &str = "form-intake-api";

/// Longest upstream error text echoed by the health check.
const HEALTH_ERROR_MAX_CHARS: usize = 100;

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `healthy` when the spreadsheet is reachable, `degraded` otherwise.
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub environment: String,
    pub timestamp: String,
    pub config: HealthConfig,
}

#[derive(Debug, Serialize)]
pub struct HealthConfig {
    pub secret_file_exists: bool,
    pub secret_file_path: String,
    pub credential_source: Option<SourceKind>,
    pub spreadsheet_id_set: bool,
    pub google_sheets_status: String,
    pub service_account_email: Option<String>,
}

/// GET /api/health -- always 200; connectivity problems show up as `degraded`.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let google = &state.config.google;
    let spreadsheet_id = google.spreadsheet_id();

    let sheets_status = match (&state.sheets, &spreadsheet_id) {
        (SheetsConnection::Ready { writer, .. }, Some(id)) => match writer.open(id).await {
            Ok(_) => "connected".to_string(),
            Err(e) => format!("error: {}", truncate(&e.to_string(), HEALTH_ERROR_MAX_CHARS)),
        },
        _ => "not_configured".to_string(),
    };
    let status = if sheets_status == "connected" {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.clone(),
        timestamp: Utc::now().to_rfc3339(),
        config: HealthConfig {
            secret_file_exists: google.secret_file_path.exists(),
            secret_file_path: google.secret_file_path.display().to_string(),
            credential_source: state.sheets.source(),
            spreadsheet_id_set: spreadsheet_id.is_some(),
            google_sheets_status: sheets_status,
            service_account_email: state.sheets.service_account_email().map(str::to_string),
        },
    })
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

// ---------------------------------------------------------------------------
// Configuration report
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ConfigReport {
    pub secret_file: FileInspection,
    pub inline_credentials_set: bool,
    pub local_credentials: LocalCredentials,
    pub spreadsheet_id: Option<String>,
    pub environment: String,
    pub port: u16,
}

#[derive(Debug, Serialize)]
pub struct LocalCredentials {
    pub path: String,
    pub exists: bool,
}

/// GET /api/config -- offline view of what the server was configured with.
pub async fn config(State(state): State<AppState>) -> Json<ConfigReport> {
    let google = &state.config.google;

    Json(ConfigReport {
        secret_file: inspect_file(&google.secret_file_path),
        inline_credentials_set: google.credentials_json.is_some(),
        local_credentials: LocalCredentials {
            path: google.credentials_path.display().to_string(),
            exists: google.credentials_path.exists(),
        },
        spreadsheet_id: google.spreadsheet_id(),
        environment: state.config.environment.clone(),
        port: state.config.port,
    })
}

// ---------------------------------------------------------------------------
// Connection test
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct ConnectionReport {
    pub success: bool,
    pub service_account: String,
    pub spreadsheet_title: String,
    pub spreadsheet_id: String,
    pub sheets: Vec<String>,
    pub message: &'static str,
}

/// GET /api/test-connection -- open the spreadsheet and list its worksheets.
pub async fn test_connection(State(state): State<AppState>) -> AppResult<Json<ConnectionReport>> {
    let spreadsheet_id = state.config.google.spreadsheet_id().ok_or_else(|| {
        AppError::BadRequest("GOOGLE_SPREADSHEET_ID environment variable not set".to_string())
    })?;
    let writer = state.sheets.writer()?;

    let meta = writer.open(&spreadsheet_id).await?;
    tracing::info!(
        %spreadsheet_id,
        title = %meta.title,
        worksheets = meta.worksheets.len(),
        "Connection test succeeded"
    );

    Ok(Json(ConnectionReport {
        success: true,
        service_account: writer.service_account_email().to_string(),
        spreadsheet_title: meta.title.clone(),
        sheets: meta.worksheet_titles(),
        spreadsheet_id: meta.spreadsheet_id,
        message: "Successfully connected to Google Sheets!",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate("abc", 100), "abc");
        assert_eq!(truncate("ééé", 2), "éé");
    }
}
