//! Run state models
//!
//! Progress and accumulated outcomes of one sweep through the catalog.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::endpoint::Category;
use super::outcome::TestOutcome;
use crate::error::{ProbeError, Result};

/// Run lifecycle status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Idle,
    Running,
    Completed,
    Aborted,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Completed | RunStatus::Aborted)
    }

    /// Allowed forward transitions. `Idle -> Aborted` covers a credential
    /// rejected before the first request.
    pub fn can_transition_to(&self, next: RunStatus) -> bool {
        matches!(
            (self, next),
            (RunStatus::Idle, RunStatus::Running)
                | (RunStatus::Idle, RunStatus::Aborted)
                | (RunStatus::Running, RunStatus::Completed)
                | (RunStatus::Running, RunStatus::Aborted)
        )
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStatus::Idle => write!(f, "idle"),
            RunStatus::Running => write!(f, "running"),
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::Aborted => write!(f, "aborted"),
        }
    }
}

/// State of a single run.
///
/// Only the runner mutates this; everyone else sees clones.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    pub run_id: String,
    pub total: usize,
    pub completed: usize,
    pub current_endpoint: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub outcomes: Vec<TestOutcome>,
    pub status: RunStatus,
}

impl RunState {
    pub fn new(run_id: impl Into<String>, total: usize) -> Self {
        Self {
            run_id: run_id.into(),
            total,
            completed: 0,
            current_endpoint: None,
            started_at: None,
            finished_at: None,
            outcomes: Vec::new(),
            status: RunStatus::Idle,
        }
    }

    /// Move to `next`, rejecting backward or repeated transitions
    pub fn transition(&mut self, next: RunStatus) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(ProbeError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    pub(crate) fn begin(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.transition(RunStatus::Running)?;
        self.completed = 0;
        self.outcomes.clear();
        self.started_at = Some(now);
        Ok(())
    }

    pub(crate) fn finish(&mut self, status: RunStatus, now: DateTime<Utc>) -> Result<()> {
        self.transition(status)?;
        self.current_endpoint = None;
        self.finished_at = Some(now);
        Ok(())
    }

    pub(crate) fn record(&mut self, outcome: TestOutcome) {
        debug_assert!(self.completed < self.total);
        self.outcomes.push(outcome);
        self.completed = self.outcomes.len();
        self.current_endpoint = None;
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.success).count()
    }

    pub fn progress_percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.completed as f64 / self.total as f64) * 100.0
        }
    }

    /// A report can be produced once the run stopped with at least one outcome
    pub fn report_available(&self) -> bool {
        self.status.is_terminal() && !self.outcomes.is_empty()
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary::from_state(self)
    }
}

/// Per-category success counts
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub category: Category,
    pub successful: usize,
    pub failed: usize,
}

/// Aggregate figures for a run
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub completed: usize,
    pub successful: usize,
    pub failed: usize,
    /// Percentage of completed endpoints that succeeded
    pub success_rate: f64,
    /// Mean latency of successful outcomes
    pub avg_latency_ms: u64,
    pub total_data_items: usize,
    pub categories: Vec<CategorySummary>,
}

impl RunSummary {
    pub fn from_state(state: &RunState) -> Self {
        let successful: Vec<&TestOutcome> = state.outcomes.iter().filter(|o| o.success).collect();
        let completed = state.outcomes.len();
        let failed = completed - successful.len();

        let success_rate = if completed == 0 {
            0.0
        } else {
            (successful.len() as f64 / completed as f64) * 100.0
        };
        let avg_latency_ms = if successful.is_empty() {
            0
        } else {
            successful.iter().map(|o| o.latency_ms).sum::<u64>() / successful.len() as u64
        };
        let total_data_items = successful.iter().map(|o| o.data_count).sum();

        let categories = Category::all()
            .into_iter()
            .filter_map(|category| {
                let in_category: Vec<_> = state
                    .outcomes
                    .iter()
                    .filter(|o| o.category == category)
                    .collect();
                if in_category.is_empty() {
                    return None;
                }
                let ok = in_category.iter().filter(|o| o.success).count();
                Some(CategorySummary {
                    category,
                    successful: ok,
                    failed: in_category.len() - ok,
                })
            })
            .collect();

        Self {
            total: state.total,
            completed,
            successful: successful.len(),
            failed,
            success_rate,
            avg_latency_ms,
            total_data_items,
            categories,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Completed: {}/{} | Success: {} | Failed: {} | Rate: {:.1}% | Avg latency: {}ms",
            self.completed,
            self.total,
            self.successful,
            self.failed,
            self.success_rate,
            self.avg_latency_ms
        )
    }
}
