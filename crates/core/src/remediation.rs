//! Operator-facing remediation text.
//!
//! The people who see these messages own the spreadsheet, not the server,
//! so sharing and API-enablement failures carry the service account's email
//! and a numbered list of steps.

use serde::Serialize;

use crate::error::CoreError;
use crate::spreadsheet::edit_url;

const SHEETS_API_LIBRARY_URL: &str =
    "https://console.cloud.google.com/apis/library/sheets.googleapis.com";
const DRIVE_API_LIBRARY_URL: &str =
    "https://console.cloud.google.com/apis/library/drive.googleapis.com";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Remediation {
    #[serde(skip)]
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_account_email: Option<String>,
    pub steps: Vec<String>,
}

impl Remediation {
    /// Human-readable form: summary, optional email line, numbered steps.
    pub fn render(&self) -> String {
        let mut out = self.summary.clone();
        if let Some(email) = &self.service_account_email {
            out.push_str(&format!("\n\n{email}"));
        }
        out.push_str("\n\nSteps:");
        for (i, step) in self.steps.iter().enumerate() {
            out.push_str(&format!("\n{}. {step}", i + 1));
        }
        out
    }
}

/// Remediation for errors an operator can fix themselves.
pub fn for_error(err: &CoreError) -> Option<Remediation> {
    match err {
        CoreError::PermissionDenied {
            service_email,
            spreadsheet_id,
        } => Some(share_spreadsheet(service_email, spreadsheet_id)),
        CoreError::UpstreamDisabled { project_id } => Some(enable_apis(project_id.as_deref())),
        CoreError::ResourceNotFound { spreadsheet_id } => Some(check_spreadsheet_id(spreadsheet_id)),
        _ => None,
    }
}

fn share_spreadsheet(service_email: &str, spreadsheet_id: &str) -> Remediation {
    Remediation {
        summary: "Permission denied. Please share your Google Spreadsheet with this email:"
            .to_string(),
        service_account_email: Some(service_email.to_string()),
        steps: vec![
            format!("Open your spreadsheet: {}", edit_url(spreadsheet_id)),
            "Click the \"Share\" button (top-right)".to_string(),
            format!("Add email: {service_email}"),
            "Set the role to \"Editor\"".to_string(),
            "Click \"Send\"".to_string(),
        ],
    }
}

fn enable_apis(project_id: Option<&str>) -> Remediation {
    let select = match project_id {
        Some(id) => format!("Select your project ({id})"),
        None => "Select the project that owns the service account".to_string(),
    };
    Remediation {
        summary: "Google Sheets API is not enabled. Please enable it:".to_string(),
        service_account_email: None,
        steps: vec![
            format!("Go to: {SHEETS_API_LIBRARY_URL}"),
            select,
            "Click \"Enable\"".to_string(),
            format!("Also enable the Google Drive API: {DRIVE_API_LIBRARY_URL}"),
        ],
    }
}

fn check_spreadsheet_id(spreadsheet_id: &str) -> Remediation {
    Remediation {
        summary: format!("Spreadsheet not found. Check your GOOGLE_SPREADSHEET_ID: {spreadsheet_id}"),
        service_account_email: None,
        steps: vec![
            "Copy the ID from the spreadsheet URL (the part between /d/ and /edit)".to_string(),
            "Set GOOGLE_SPREADSHEET_ID to that value and restart the service".to_string(),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permission_denied_names_the_service_account() {
        let err = CoreError::PermissionDenied {
            service_email: "svc@proj.iam.gserviceaccount.com".into(),
            spreadsheet_id: "abc".into(),
        };
        let remediation = for_error(&err).unwrap();
        let text = remediation.render();

        assert_eq!(
            remediation.service_account_email.as_deref(),
            Some("svc@proj.iam.gserviceaccount.com")
        );
        assert!(text.contains("https://docs.google.com/spreadsheets/d/abc/edit"));
        assert!(text.contains("3. Add email: svc@proj.iam.gserviceaccount.com"));
        assert_eq!(remediation.steps.len(), 5);
    }

    #[test]
    fn disabled_api_mentions_project_when_known() {
        let err = CoreError::UpstreamDisabled {
            project_id: Some("forms-prod".into()),
        };
        let text = for_error(&err).unwrap().render();
        assert!(text.contains("Select your project (forms-prod)"));
        assert!(text.contains("sheets.googleapis.com"));
    }

    #[test]
    fn client_errors_have_no_remediation() {
        let err = CoreError::ValidationFailed {
            missing: vec!["name".into()],
        };
        assert!(for_error(&err).is_none());
        assert!(for_error(&CoreError::WriteFailed("x".into())).is_none());
    }
}
