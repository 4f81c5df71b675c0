//! In-memory [`SheetsBackend`] for tests.
//!
//! Mirrors the observable behaviour of the REST API closely enough to
//! exercise the writer and the HTTP handlers: tab order, default sizes,
//! append-after-last-row, and classified open failures.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::backend::{SheetsBackend, SpreadsheetMeta, WorksheetMeta};
use crate::error::SheetsError;

/// Failure injected into `open_by_key`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenFailure {
    NotFound,
    PermissionDenied,
    ServiceDisabled,
}

#[derive(Default)]
struct State {
    spreadsheets: HashMap<String, Spreadsheet>,
    open_failure: Option<OpenFailure>,
    fail_writes: bool,
    fail_renames: bool,
    fail_row_count: bool,
    next_sheet_id: i64,
}

struct Spreadsheet {
    title: String,
    worksheets: Vec<Worksheet>,
}

struct Worksheet {
    sheet_id: i64,
    title: String,
    rows: Vec<Vec<String>>,
}

impl Worksheet {
    fn used_rows(&self) -> usize {
        self.rows
            .iter()
            .rposition(|r| r.iter().any(|c| !c.is_empty()))
            .map_or(0, |i| i + 1)
    }
}

pub struct InMemorySheets {
    service_email: String,
    project_id: Option<String>,
    state: Mutex<State>,
}

impl InMemorySheets {
    pub fn new(service_email: impl Into<String>) -> Self {
        Self {
            service_email: service_email.into(),
            project_id: None,
            state: Mutex::new(State::default()),
        }
    }

    pub fn with_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    pub fn add_spreadsheet(&self, spreadsheet_id: &str, title: &str, worksheets: &[&str]) {
        let mut state = self.lock();
        let mut sheets = Vec::with_capacity(worksheets.len());
        for title in worksheets {
            sheets.push(Worksheet {
                sheet_id: state.next_sheet_id,
                title: title.to_string(),
                rows: Vec::new(),
            });
            state.next_sheet_id += 1;
        }
        state.spreadsheets.insert(
            spreadsheet_id.to_string(),
            Spreadsheet {
                title: title.to_string(),
                worksheets: sheets,
            },
        );
    }

    pub fn seed_rows(&self, spreadsheet_id: &str, worksheet: &str, rows: Vec<Vec<String>>) {
        let mut state = self.lock();
        if let Ok(ws) = worksheet_mut(&mut state, spreadsheet_id, worksheet) {
            ws.rows = rows;
        }
    }

    pub fn fail_open(&self, failure: Option<OpenFailure>) {
        self.lock().open_failure = failure;
    }

    /// Make `rename_worksheet` fail while other writes still succeed.
    pub fn fail_renames(&self, fail: bool) {
        self.lock().fail_renames = fail;
    }

    /// Make `row_count` fail, as when the read after an append errors.
    pub fn fail_row_count(&self, fail: bool) {
        self.lock().fail_row_count = fail;
    }

    pub fn fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Rows with data, in order.
    pub fn rows(&self, spreadsheet_id: &str, worksheet: &str) -> Vec<Vec<String>> {
        let mut state = self.lock();
        match worksheet_mut(&mut state, spreadsheet_id, worksheet) {
            Ok(ws) => {
                let used = ws.used_rows();
                ws.rows[..used].to_vec()
            }
            Err(_) => Vec::new(),
        }
    }

    pub fn worksheet_titles(&self, spreadsheet_id: &str) -> Vec<String> {
        self.lock()
            .spreadsheets
            .get(spreadsheet_id)
            .map(|s| s.worksheets.iter().map(|w| w.title.clone()).collect())
            .unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_writable(state: &State) -> Result<(), SheetsError> {
        if state.fail_writes {
            Err(SheetsError::Api {
                status: 500,
                message: "Internal error encountered.".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

fn spreadsheet_mut<'a>(
    state: &'a mut State,
    spreadsheet_id: &str,
) -> Result<&'a mut Spreadsheet, SheetsError> {
    state
        .spreadsheets
        .get_mut(spreadsheet_id)
        .ok_or_else(|| SheetsError::NotFound("Requested entity was not found.".to_string()))
}

fn worksheet_mut<'a>(
    state: &'a mut State,
    spreadsheet_id: &str,
    worksheet: &str,
) -> Result<&'a mut Worksheet, SheetsError> {
    spreadsheet_mut(state, spreadsheet_id)?
        .worksheets
        .iter_mut()
        .find(|w| w.title == worksheet)
        .ok_or_else(|| SheetsError::Api {
            status: 400,
            message: format!("Unable to parse range: '{worksheet}'"),
        })
}

#[async_trait]
impl SheetsBackend for InMemorySheets {
    fn service_account_email(&self) -> &str {
        &self.service_email
    }

    fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    async fn open_by_key(&self, spreadsheet_id: &str) -> Result<SpreadsheetMeta, SheetsError> {
        let mut state = self.lock();
        match state.open_failure {
            Some(OpenFailure::NotFound) => {
                return Err(SheetsError::NotFound("Requested entity was not found.".into()))
            }
            Some(OpenFailure::PermissionDenied) => {
                return Err(SheetsError::PermissionDenied(
                    "The caller does not have permission".into(),
                ))
            }
            Some(OpenFailure::ServiceDisabled) => {
                return Err(SheetsError::ServiceDisabled(
                    "Google Sheets API has not been used in this project before or it is disabled."
                        .into(),
                ))
            }
            None => {}
        }

        let spreadsheet = spreadsheet_mut(&mut state, spreadsheet_id)?;
        Ok(SpreadsheetMeta {
            spreadsheet_id: spreadsheet_id.to_string(),
            title: spreadsheet.title.clone(),
            worksheets: spreadsheet
                .worksheets
                .iter()
                .enumerate()
                .map(|(i, w)| WorksheetMeta {
                    sheet_id: w.sheet_id,
                    title: w.title.clone(),
                    index: i as u32,
                })
                .collect(),
        })
    }

    async fn add_worksheet(
        &self,
        spreadsheet_id: &str,
        title: &str,
        _rows: u32,
        _cols: u32,
    ) -> Result<WorksheetMeta, SheetsError> {
        let mut state = self.lock();
        Self::check_writable(&state)?;
        let sheet_id = state.next_sheet_id;
        state.next_sheet_id += 1;

        let spreadsheet = spreadsheet_mut(&mut state, spreadsheet_id)?;
        if spreadsheet.worksheets.iter().any(|w| w.title == title) {
            return Err(SheetsError::Api {
                status: 400,
                message: format!("A sheet with the name \"{title}\" already exists."),
            });
        }
        spreadsheet.worksheets.push(Worksheet {
            sheet_id,
            title: title.to_string(),
            rows: Vec::new(),
        });

        Ok(WorksheetMeta {
            sheet_id,
            title: title.to_string(),
            index: (spreadsheet.worksheets.len() - 1) as u32,
        })
    }

    async fn rename_worksheet(
        &self,
        spreadsheet_id: &str,
        sheet_id: i64,
        title: &str,
    ) -> Result<(), SheetsError> {
        let mut state = self.lock();
        Self::check_writable(&state)?;
        if state.fail_renames {
            return Err(SheetsError::Api {
                status: 400,
                message: "Invalid requests[0].updateSheetProperties".to_string(),
            });
        }
        let spreadsheet = spreadsheet_mut(&mut state, spreadsheet_id)?;
        let worksheet = spreadsheet
            .worksheets
            .iter_mut()
            .find(|w| w.sheet_id == sheet_id)
            .ok_or_else(|| SheetsError::Api {
                status: 400,
                message: format!("No grid with id: {sheet_id}"),
            })?;
        worksheet.title = title.to_string();
        Ok(())
    }

    async fn row_values(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
        row: u32,
    ) -> Result<Vec<String>, SheetsError> {
        let mut state = self.lock();
        let ws = worksheet_mut(&mut state, spreadsheet_id, worksheet)?;
        Ok(ws
            .rows
            .get(row.saturating_sub(1) as usize)
            .cloned()
            .unwrap_or_default())
    }

    async fn update_row(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
        row: u32,
        values: &[String],
    ) -> Result<(), SheetsError> {
        let mut state = self.lock();
        Self::check_writable(&state)?;
        let ws = worksheet_mut(&mut state, spreadsheet_id, worksheet)?;

        let index = row.saturating_sub(1) as usize;
        if ws.rows.len() <= index {
            ws.rows.resize(index + 1, Vec::new());
        }
        let target = &mut ws.rows[index];
        if target.len() < values.len() {
            target.resize(values.len(), String::new());
        }
        target[..values.len()].clone_from_slice(values);
        Ok(())
    }

    async fn append_row(
        &self,
        spreadsheet_id: &str,
        worksheet: &str,
        values: &[String],
    ) -> Result<(), SheetsError> {
        let mut state = self.lock();
        Self::check_writable(&state)?;
        let ws = worksheet_mut(&mut state, spreadsheet_id, worksheet)?;
        let used = ws.used_rows();
        ws.rows.truncate(used);
        ws.rows.push(values.to_vec());
        Ok(())
    }

    async fn row_count(&self, spreadsheet_id: &str, worksheet: &str) -> Result<usize, SheetsError> {
        let mut state = self.lock();
        if state.fail_row_count {
            return Err(SheetsError::Api {
                status: 503,
                message: "The service is currently unavailable.".to_string(),
            });
        }
        Ok(worksheet_mut(&mut state, spreadsheet_id, worksheet)?.used_rows())
    }
}
