//! Google Sheets integration.
//!
//! Resolves service-account credentials, mints OAuth bearer tokens, talks to
//! the Sheets REST API, and implements the append-with-header algorithm on
//! top of the [`backend::SheetsBackend`] seam.

pub mod a1;
pub mod api;
pub mod auth;
pub mod backend;
pub mod credentials;
pub mod error;
#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod writer;

pub use api::GoogleSheetsApi;
pub use backend::{SheetsBackend, SpreadsheetMeta, WorksheetMeta};
pub use credentials::{CredentialChain, ResolvedCredentials, ServiceAccountKey, SourceKind};
pub use error::SheetsError;
pub use writer::{AppendOutcome, AppendRequest, SpreadsheetWriter};
