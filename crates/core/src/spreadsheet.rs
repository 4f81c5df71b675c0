//! Spreadsheet identifier helpers.

const DOCS_BASE_URL: &str = "https://docs.google.com/spreadsheets/d";

/// Normalise a configured spreadsheet identifier.
///
/// Anything after the first `#` is dropped (copy-pasted URLs often carry a
/// `#gid=0` fragment) and surrounding whitespace is trimmed. Returns `None`
/// when nothing usable is left.
pub fn clean_spreadsheet_id(raw: &str) -> Option<String> {
    let id = raw.split('#').next().unwrap_or_default().trim();
    if id.is_empty() {
        None
    } else {
        Some(id.to_string())
    }
}

/// Public URL of a spreadsheet.
pub fn spreadsheet_url(spreadsheet_id: &str) -> String {
    format!("{DOCS_BASE_URL}/{spreadsheet_id}")
}

/// URL of the spreadsheet's editor view, where the sharing dialog lives.
pub fn edit_url(spreadsheet_id: &str) -> String {
    format!("{DOCS_BASE_URL}/{spreadsheet_id}/edit")
}
