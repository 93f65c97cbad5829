//! Data models for API sweeps
//!
//! Endpoint descriptors, per-endpoint outcomes and run state.

mod endpoint;
mod outcome;
mod run_state;

pub use endpoint::{Category, EndpointDescriptor, TemplateContext, Tier};
pub use outcome::{status_hint, OutcomeKind, TestOutcome};
pub use run_state::{RunState, RunStatus, RunSummary};
