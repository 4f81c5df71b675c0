//! Handlers for form submissions.
//!
//! A submission moves through body parsing, validation, connection lookup,
//! and the spreadsheet append. Any failure ends the request with a JSON
//! error; nothing is retried.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::{Map, Value};

use intake_core::spreadsheet::spreadsheet_url;
use intake_core::submission::{self, timestamp_now, FormKind};
use intake_sheets::AppendRequest;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Response payload for an accepted submission.
#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub success: bool,
    pub message: &'static str,
    pub timestamp: String,
    /// 1-based row of the appended submission, if it could be read back.
    pub row_number: Option<usize>,
    pub spreadsheet_url: String,
}

/// POST /api/booking
pub async fn submit_booking(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<SubmissionResponse>> {
    submit(&state, FormKind::Booking, &body).await.map(Json)
}

/// POST /api/contact
pub async fn submit_contact(
    State(state): State<AppState>,
    body: Bytes,
) -> AppResult<Json<SubmissionResponse>> {
    submit(&state, FormKind::Contact, &body).await.map(Json)
}

/// OPTIONS on a form route. Answers regardless of configuration.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn submit(state: &AppState, kind: FormKind, body: &[u8]) -> AppResult<SubmissionResponse> {
    let fields = parse_object(body)?;
    tracing::info!(
        form = kind.label(),
        fields = ?fields.keys().collect::<Vec<_>>(),
        "Received submission"
    );

    let submission = submission::validate(kind, &fields)?;
    let writer = state.sheets.writer()?;

    let timestamp = timestamp_now();
    let spreadsheet_id = state.config.google.spreadsheet_id.as_deref().unwrap_or_default();

    let outcome = writer
        .append(AppendRequest {
            spreadsheet_id,
            worksheet: kind.worksheet(),
            header: kind.header(),
            row: submission.to_row(&timestamp),
        })
        .await?;

    tracing::info!(
        form = kind.label(),
        spreadsheet_id = %outcome.spreadsheet_id,
        worksheet = %outcome.worksheet,
        row_number = ?outcome.row_number,
        "Submission saved"
    );

    Ok(SubmissionResponse {
        success: true,
        message: kind.success_message(),
        timestamp,
        row_number: outcome.row_number,
        spreadsheet_url: spreadsheet_url(&outcome.spreadsheet_id),
    })
}

/// Parse the request body as a JSON object.
fn parse_object(body: &[u8]) -> Result<Map<String, Value>, AppError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => Ok(fields),
        _ => Err(AppError::BadRequest("No JSON data received".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn only_objects_are_accepted() {
        assert!(parse_object(br#"{"name":"Jane"}"#).is_ok());
        assert_matches!(parse_object(b""), Err(AppError::BadRequest(_)));
        assert_matches!(parse_object(b"[1,2]"), Err(AppError::BadRequest(_)));
        assert_matches!(parse_object(b"null"), Err(AppError::BadRequest(_)));
        assert_matches!(parse_object(b"name=Jane"), Err(AppError::BadRequest(_)));
    }
}
