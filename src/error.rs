//! Error types for sweeps and reports.

use thiserror::Error;

use crate::models::RunStatus;

/// Run-level errors.
///
/// Per-endpoint failures are never reported through this type; they are
/// recorded as [`TestOutcome`](crate::models::TestOutcome) data instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// The API token was empty or malformed. Raised before any request.
    #[error("invalid API credential: {0}")]
    InvalidCredential(String),

    /// A report was requested for a run without outcomes.
    #[error("run has no outcomes to report")]
    EmptyRun,

    /// `start` was called on a runner that already left `Idle`.
    #[error("run already started (status: {0})")]
    AlreadyStarted(RunStatus),

    /// A status change that would move the run backwards.
    #[error("invalid run transition: {from} -> {to}")]
    InvalidTransition { from: RunStatus, to: RunStatus },

    /// Path template references a value the template context does not carry.
    #[error("unknown placeholder `{placeholder}` in path template `{template}`")]
    UnknownPlaceholder {
        template: String,
        placeholder: String,
    },

    /// Report encoding failed.
    #[error("report serialization failed: {0}")]
    Serialization(String),
}

/// Result alias for run-level operations.
pub type Result<T> = std::result::Result<T, ProbeError>;
