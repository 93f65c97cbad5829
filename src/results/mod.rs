//! Results storage and reporting module
//!
//! Report rendering and persistence for finished runs.

mod report;
mod storage;

pub use report::{ReportBuilder, ReportFormat};
pub use storage::{generate_run_id, write_report, ReportStorage, StoredReport};
