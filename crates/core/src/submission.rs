//! Form definitions and submission validation.
//!
//! A submission is valid iff every required field for its form is present
//! and non-empty after trimming. Validation is all-or-nothing: a failure
//! names every missing field, in the form's declared order.

use chrono::{Local, NaiveDateTime};
use serde_json::{Map, Value};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Status written alongside every booking row.
pub const STATUS_SUBMITTED: &str = "Submitted";

/// Format of the server-generated timestamp column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const BOOKING_FIELDS: &[&str] = &["name", "phone", "time", "location"];
const BOOKING_HEADER: &[&str] = &["Name", "Phone", "Time", "Location", "Timestamp", "Status"];

const CONTACT_FIELDS: &[&str] = &["name", "email", "message"];
const CONTACT_HEADER: &[&str] = &["Name", "Email", "Message", "Timestamp"];

// ---------------------------------------------------------------------------
// Form kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Booking,
    Contact,
}

impl FormKind {
    /// Lower-case label used in logs and messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Booking => "booking",
            Self::Contact => "contact",
        }
    }

    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::Booking => BOOKING_FIELDS,
            Self::Contact => CONTACT_FIELDS,
        }
    }

    /// Worksheet the form's rows are appended to.
    pub fn worksheet(self) -> &'static str {
        match self {
            Self::Booking => "Bookings",
            Self::Contact => "Contact",
        }
    }

    /// Header row written once to a fresh worksheet.
    pub fn header(self) -> &'static [&'static str] {
        match self {
            Self::Booking => BOOKING_HEADER,
            Self::Contact => CONTACT_HEADER,
        }
    }

    pub fn success_message(self) -> &'static str {
        match self {
            Self::Booking => "Booking submitted successfully!",
            Self::Contact => "Message sent successfully!",
        }
    }
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

/// A validated submission: trimmed values in the form's field order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    kind: FormKind,
    values: Vec<String>,
}

impl Submission {
    pub fn kind(&self) -> FormKind {
        self.kind
    }

    /// Value of a required field, if the form declares it.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.kind
            .required_fields()
            .iter()
            .position(|f| *f == field)
            .map(|i| self.values[i].as_str())
    }

    /// Spreadsheet row for this submission, in header order.
    pub fn to_row(&self, timestamp: &str) -> Vec<String> {
        let mut row = self.values.clone();
        row.push(timestamp.to_string());
        if self.kind == FormKind::Booking {
            row.push(STATUS_SUBMITTED.to_string());
        }
        row
    }
}

/// Validate a parsed request body against the form's required fields.
///
/// A field counts as missing when it is absent, `null`, or empty after being
/// coerced to a string and trimmed.
pub fn validate(kind: FormKind, body: &Map<String, Value>) -> Result<Submission, CoreError> {
    let mut values = Vec::with_capacity(kind.required_fields().len());
    let mut missing = Vec::new();

    for field in kind.required_fields() {
        match body.get(*field).and_then(coerce_to_string) {
            Some(value) if !value.trim().is_empty() => values.push(value.trim().to_string()),
            _ => missing.push((*field).to_string()),
        }
    }

    if missing.is_empty() {
        Ok(Submission { kind, values })
    } else {
        Err(CoreError::ValidationFailed { missing })
    }
}

fn coerce_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// Current server-local time in `YYYY-MM-DD HH:MM:SS`.
pub fn timestamp_now() -> String {
    format_timestamp(Local::now().naive_local())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
