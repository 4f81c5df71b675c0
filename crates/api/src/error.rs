use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use intake_core::error::CoreError;
use intake_core::remediation;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `intake_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => {
                let kind = core.kind();
                let status = StatusCode::from_u16(kind.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                if status.is_server_error() {
                    tracing::error!(error = %core, code = kind.code(), "Request failed");
                } else {
                    tracing::warn!(error = %core, code = kind.code(), "Request rejected");
                }
                let message = match remediation::for_error(core) {
                    Some(r) if status == StatusCode::FORBIDDEN => r.render(),
                    _ => core.to_string(),
                };
                (status, kind.code(), message)
            }

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let mut body = json!({
            "success": false,
            "error": message,
            "code": code,
        });

        if let AppError::Core(core) = &self {
            if let CoreError::ValidationFailed { missing } = core {
                body["missing_fields"] = json!(missing);
            }
            if let Some(remediation) = remediation::for_error(core) {
                body["remediation"] = json!(remediation);
            }
        }

        (status, axum::Json(body)).into_response()
    }
}
