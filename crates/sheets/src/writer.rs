//! Append-with-header algorithm.
//!
//! Opens the spreadsheet, settles on a worksheet, makes sure row 1 holds the
//! expected header, then appends one row. Open failures are classified for
//! the operator; anything after a successful open is a write failure. No
//! step is retried and nothing is rolled back.

use std::sync::Arc;

use intake_core::error::CoreError;
use intake_core::spreadsheet::clean_spreadsheet_id;

use crate::backend::{SheetsBackend, SpreadsheetMeta};
use crate::error::SheetsError;

/// Size of a worksheet created from scratch.
pub const DEFAULT_WORKSHEET_ROWS: u32 = 1000;
pub const DEFAULT_WORKSHEET_COLS: u32 = 10;

/// Title of the worksheet a new spreadsheet starts with.
pub const DEFAULT_WORKSHEET_TITLE: &str = "Sheet1";

const HEADER_ROW: u32 = 1;

#[derive(Debug, Clone)]
pub struct AppendRequest<'a> {
    pub spreadsheet_id: &'a str,
    pub worksheet: &'a str,
    pub header: &'a [&'a str],
    pub row: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppendOutcome {
    /// Cleaned identifier the row was written to.
    pub spreadsheet_id: String,
    /// Worksheet that received the row.
    pub worksheet: String,
    /// 1-based position of the new row, if it could be read back.
    pub row_number: Option<usize>,
}

#[derive(Clone)]
pub struct SpreadsheetWriter {
    backend: Arc<dyn SheetsBackend>,
}

impl SpreadsheetWriter {
    pub fn new(backend: Arc<dyn SheetsBackend>) -> Self {
        Self { backend }
    }

    pub fn service_account_email(&self) -> &str {
        self.backend.service_account_email()
    }

    /// Open a spreadsheet, mapping failures onto operator-facing errors.
    pub async fn open(&self, spreadsheet_id: &str) -> Result<SpreadsheetMeta, CoreError> {
        let spreadsheet_id = clean_spreadsheet_id(spreadsheet_id).ok_or_else(|| {
            CoreError::ConfigurationMissing("Google Spreadsheet ID not configured".to_string())
        })?;

        self.backend
            .open_by_key(&spreadsheet_id)
            .await
            .map_err(|e| self.classify_open_error(&spreadsheet_id, e))
    }

    pub async fn append(&self, request: AppendRequest<'_>) -> Result<AppendOutcome, CoreError> {
        let meta = self.open(request.spreadsheet_id).await?;
        let spreadsheet_id = meta.spreadsheet_id.clone();
        tracing::debug!(%spreadsheet_id, title = %meta.title, "Opened spreadsheet");

        let worksheet = self
            .resolve_worksheet(&meta, request.worksheet)
            .await
            .map_err(write_failed)?;

        let wrote_header = self
            .ensure_header(&spreadsheet_id, &worksheet, request.header)
            .await
            .map_err(write_failed)?;
        if wrote_header {
            tracing::info!(%spreadsheet_id, %worksheet, "Wrote header row");
        }

        self.backend
            .append_row(&spreadsheet_id, &worksheet, &request.row)
            .await
            .map_err(write_failed)?;

        let row_number = match self.backend.row_count(&spreadsheet_id, &worksheet).await {
            Ok(count) => Some(count),
            Err(e) => {
                tracing::warn!(%spreadsheet_id, %worksheet, error = %e, "Row appended but row count unavailable");
                None
            }
        };

        tracing::info!(%spreadsheet_id, %worksheet, ?row_number, "Appended row");

        Ok(AppendOutcome {
            spreadsheet_id,
            worksheet,
            row_number,
        })
    }

    /// Pick the worksheet to write to.
    ///
    /// Falls back to the first worksheet when the target is missing. A first
    /// worksheet still titled `Sheet1` is renamed to the target. A new
    /// worksheet is created only when there is no first worksheet or the
    /// rename fails.
    async fn resolve_worksheet(
        &self,
        meta: &SpreadsheetMeta,
        target: &str,
    ) -> Result<String, SheetsError> {
        if meta.worksheet(target).is_some() {
            return Ok(target.to_string());
        }

        if let Some(first) = meta.first_worksheet() {
            if first.title != DEFAULT_WORKSHEET_TITLE {
                tracing::info!(worksheet = %first.title, %target, "Target worksheet missing, using first worksheet");
                return Ok(first.title.clone());
            }
            match self
                .backend
                .rename_worksheet(&meta.spreadsheet_id, first.sheet_id, target)
                .await
            {
                Ok(()) => {
                    tracing::info!(from = %first.title, to = %target, "Renamed default worksheet");
                    return Ok(target.to_string());
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Could not rename default worksheet, creating a new one");
                }
            }
        }

        let created = self
            .backend
            .add_worksheet(
                &meta.spreadsheet_id,
                target,
                DEFAULT_WORKSHEET_ROWS,
                DEFAULT_WORKSHEET_COLS,
            )
            .await?;
        tracing::info!(worksheet = %created.title, "Created worksheet");
        Ok(created.title)
    }

    /// Write the header into row 1 unless it already starts with the
    /// expected first label. Returns whether anything was written.
    async fn ensure_header(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
        header: &[&str],
    ) -> Result<bool, SheetsError> {
        let Some(first_label) = header.first() else {
            return Ok(false);
        };

        let existing = self
            .backend
            .row_values(spreadsheet_id, worksheet, HEADER_ROW)
            .await?;
        if existing.first().map(String::as_str) == Some(*first_label) {
            return Ok(false);
        }

        let header: Vec<String> = header.iter().map(|h| h.to_string()).collect();
        self.backend
            .update_row(spreadsheet_id, worksheet, HEADER_ROW, &header)
            .await?;
        Ok(true)
    }

    fn classify_open_error(&self, spreadsheet_id: &str, err: SheetsError) -> CoreError {
        tracing::error!(%spreadsheet_id, error = %err, "Failed to open spreadsheet");
        match err {
            SheetsError::NotFound(_) => CoreError::ResourceNotFound {
                spreadsheet_id: spreadsheet_id.to_string(),
            },
            SheetsError::PermissionDenied(_) => CoreError::PermissionDenied {
                service_email: self.backend.service_account_email().to_string(),
                spreadsheet_id: spreadsheet_id.to_string(),
            },
            SheetsError::ServiceDisabled(_) => CoreError::UpstreamDisabled {
                project_id: self.backend.project_id().map(str::to_string),
            },
            other => CoreError::Unexpected(format!("Failed to access spreadsheet: {other}")),
        }
    }
}

fn write_failed(err: SheetsError) -> CoreError {
    tracing::error!(error = %err, "Spreadsheet write failed");
    CoreError::WriteFailed(err.to_string())
}
