//! The spreadsheet collaborator seam.

use async_trait::async_trait;
use serde::Serialize;

use crate::error::SheetsError;

/// A spreadsheet's title and worksheets, in tab order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpreadsheetMeta {
    pub spreadsheet_id: String,
    pub title: String,
    pub worksheets: Vec<WorksheetMeta>,
}

impl SpreadsheetMeta {
    pub fn worksheet(&self, title: &str) -> Option<&WorksheetMeta> {
        self.worksheets.iter().find(|w| w.title == title)
    }

    pub fn first_worksheet(&self) -> Option<&WorksheetMeta> {
        self.worksheets.iter().min_by_key(|w| w.index)
    }

    pub fn worksheet_titles(&self) -> Vec<String> {
        self.worksheets.iter().map(|w| w.title.clone()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorksheetMeta {
    pub sheet_id: i64,
    pub title: String,
    pub index: u32,
}

/// Operations the service needs from a spreadsheet store.
///
/// Rows are 1-based. Implementations report failures as [`SheetsError`]
/// already classified (not-found, permission, API disabled, ...).
#[async_trait]
pub trait SheetsBackend: Send + Sync {
    /// Email of the identity the backend acts as.
    fn service_account_email(&self) -> &str;

    /// Cloud project owning that identity, when known.
    fn project_id(&self) -> Option<&str>;

    async fn open_by_key(&self, spreadsheet_id: &str) -> Result<SpreadsheetMeta, SheetsError>;

    async fn add_worksheet(
        &self,
        spreadsheet_id: &str,
        title: &str,
        rows: u32,
        cols: u32,
    ) -> Result<WorksheetMeta, SheetsError>;

    async fn rename_worksheet(
        &self,
        spreadsheet_id: &str,
        sheet_id: i64,
        title: &str,
    ) -> Result<(), SheetsError>;

    async fn row_values(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
        row: u32,
    ) -> Result<Vec<String>, SheetsError>;

    /// Overwrite the leading cells of `row` with `values`, stored as given.
    async fn update_row(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
        row: u32,
        values: &[String],
    ) -> Result<(), SheetsError>;

    /// Append after the last row with data, interpreting values as if typed
    /// by a user (dates and numbers become native cell types).
    async fn append_row(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
        values: &[String],
    ) -> Result<(), SheetsError>;

    /// Number of rows up to and including the last row with data.
    async fn row_count(&self, spreadsheet_id: &str, worksheet: &str) -> Result<usize, SheetsError>;
}
