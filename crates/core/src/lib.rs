//! Domain building blocks for the intake service.
//!
//! Form definitions, field validation, the error taxonomy shared by every
//! layer, and the remediation text shown to spreadsheet owners. Nothing in
//! this crate performs I/O.

pub mod error;
pub mod remediation;
pub mod spreadsheet;
pub mod submission;
