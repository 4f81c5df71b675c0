//! Errors from the Sheets collaborator and their classification.

use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum SheetsError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Minting or exchanging the service-account assertion failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Requested entity was not found: {0}")]
    NotFound(String),

    #[error("The caller does not have permission: {0}")]
    PermissionDenied(String),

    /// The Sheets API is not enabled for the service account's project.
    #[error("Google Sheets API is disabled: {0}")]
    ServiceDisabled(String),

    /// Any other non-2xx answer.
    #[error("Google API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

/// Classify a non-2xx Google API response.
///
/// API-disabled errors arrive as 403s, so they are detected from the body
/// before the status code is considered.
pub fn classify(status: u16, body: &str) -> SheetsError {
    let parsed = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let message = parsed
        .as_ref()
        .map(|e| e.error.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.trim().to_string());
    let google_status = parsed.map(|e| e.error.status).unwrap_or_default();

    if body.contains("SERVICE_DISABLED") || body.contains("has not been used") {
        SheetsError::ServiceDisabled(message)
    } else if status == 404 || google_status == "NOT_FOUND" {
        SheetsError::NotFound(message)
    } else if status == 403 || google_status == "PERMISSION_DENIED" {
        SheetsError::PermissionDenied(message)
    } else {
        SheetsError::Api { status, message }
    }
}
