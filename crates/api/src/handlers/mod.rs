pub mod diagnostics;
pub mod forms;
pub mod info;
