use serde::Serialize;

/// Failure categories surfaced to clients.
///
/// Each kind maps to exactly one HTTP status and one stable machine code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    ValidationFailed,
    ConfigurationMissing,
    ResourceNotFound,
    PermissionDenied,
    UpstreamDisabled,
    WriteFailed,
    UnexpectedFailure,
}

impl ErrorKind {
    /// Machine-readable code included in error bodies.
    pub fn code(self) -> &'static str {
        match self {
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::ConfigurationMissing => "CONFIGURATION_MISSING",
            Self::ResourceNotFound => "RESOURCE_NOT_FOUND",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::UpstreamDisabled => "UPSTREAM_DISABLED",
            Self::WriteFailed => "WRITE_FAILED",
            Self::UnexpectedFailure => "UNEXPECTED_FAILURE",
        }
    }

    /// HTTP status code for this kind.
    pub fn status_code(self) -> u16 {
        match self {
            Self::ValidationFailed => 400,
            Self::ResourceNotFound => 404,
            Self::PermissionDenied | Self::UpstreamDisabled => 403,
            Self::ConfigurationMissing | Self::WriteFailed | Self::UnexpectedFailure => 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    #[error("Missing required fields: {}", .missing.join(", "))]
    ValidationFailed { missing: Vec<String> },

    #[error("{0}")]
    ConfigurationMissing(String),

    #[error("Spreadsheet not found: {spreadsheet_id}")]
    ResourceNotFound { spreadsheet_id: String },

    #[error("Permission denied: {service_email} cannot access spreadsheet {spreadsheet_id}")]
    PermissionDenied {
        service_email: String,
        spreadsheet_id: String,
    },

    #[error("Google Sheets API is not enabled for this project")]
    UpstreamDisabled { project_id: Option<String> },

    #[error("Failed to save submission: {0}")]
    WriteFailed(String),

    #[error("{0}")]
    Unexpected(String),
}

impl CoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ValidationFailed { .. } => ErrorKind::ValidationFailed,
            Self::ConfigurationMissing(_) => ErrorKind::ConfigurationMissing,
            Self::ResourceNotFound { .. } => ErrorKind::ResourceNotFound,
            Self::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Self::UpstreamDisabled { .. } => ErrorKind::UpstreamDisabled,
            Self::WriteFailed(_) => ErrorKind::WriteFailed,
            Self::Unexpected(_) => ErrorKind::UnexpectedFailure,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.kind().status_code()
    }
}
