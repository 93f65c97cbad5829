//! Output formatting module
//!
//! Terminal rendering of progress, outcomes and summaries.

mod formatter;

pub use formatter::ResultFormatter;
