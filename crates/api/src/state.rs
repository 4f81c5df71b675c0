use std::sync::Arc;

use intake_core::error::CoreError;
use intake_sheets::{GoogleSheetsApi, SourceKind, SpreadsheetWriter};

use crate::config::{GoogleConfig, ServerConfig};

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Spreadsheet connection resolved once at startup.
    pub sheets: SheetsConnection,
}

/// Outcome of credential resolution at startup.
#[derive(Clone)]
pub enum SheetsConnection {
    Ready {
        writer: SpreadsheetWriter,
        source: SourceKind,
        /// Human-readable location the credentials were loaded from.
        origin: String,
    },
    /// No usable credentials; every write answers with this reason.
    Unavailable { reason: String },
}

impl SheetsConnection {
    /// Resolve credentials through the configured chain and build the
    /// Google client. Never fails: a missing key yields `Unavailable`.
    pub fn from_config(google: &GoogleConfig, http: reqwest::Client) -> Self {
        match google.credential_chain().resolve() {
            Ok(resolved) => Self::Ready {
                writer: SpreadsheetWriter::new(Arc::new(GoogleSheetsApi::new(http, resolved.key))),
                source: resolved.source,
                origin: resolved.origin,
            },
            Err(e) => {
                tracing::warn!(error = %e, "Google Sheets unavailable");
                Self::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    pub fn writer(&self) -> Result<&SpreadsheetWriter, CoreError> {
        match self {
            Self::Ready { writer, .. } => Ok(writer),
            Self::Unavailable { reason } => Err(CoreError::ConfigurationMissing(reason.clone())),
        }
    }

    pub fn source(&self) -> Option<SourceKind> {
        match self {
            Self::Ready { source, .. } => Some(*source),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn service_account_email(&self) -> Option<&str> {
        match self {
            Self::Ready { writer, .. } => Some(writer.service_account_email()),
            Self::Unavailable { .. } => None,
        }
    }
}
