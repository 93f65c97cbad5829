//! Terminal formatting for runs
//!
//! Progress lines, per-endpoint lines, the boxed summary and the catalog
//! listing.

use crate::models::{EndpointDescriptor, OutcomeKind, RunState, RunStatus, TestOutcome, Tier};

const BAR_WIDTH: usize = 20;

/// Result formatter
pub struct ResultFormatter {
    colorize: bool,
}

impl ResultFormatter {
    pub fn new() -> Self {
        Self { colorize: true }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    /// Bar, `completed/total` and the endpoint in flight
    pub fn format_progress(&self, state: &RunState) -> String {
        let percent = state.progress_percent();
        let filled = ((percent / 100.0) * BAR_WIDTH as f64).round() as usize;
        let bar = format!(
            "{}{}",
            "█".repeat(filled.min(BAR_WIDTH)),
            "░".repeat(BAR_WIDTH - filled.min(BAR_WIDTH))
        );

        let mut line = format!(
            "[{}] {:>3}/{:<3} {:5.1}%",
            bar, state.completed, state.total, percent
        );
        if let Some(endpoint) = &state.current_endpoint {
            line.push_str(&format!("  -> {endpoint}"));
        }
        line
    }

    pub fn format_outcome(&self, outcome: &TestOutcome) -> String {
        let status = match outcome.kind() {
            OutcomeKind::Success => self.paint("\x1b[32m", "✓ OK  "),
            OutcomeKind::HttpError => self.paint("\x1b[31m", "✗ HTTP"),
            OutcomeKind::NetworkFailure => self.paint("\x1b[31m", "! NET "),
        };

        let detail = if outcome.success {
            format!("{} items", outcome.data_count)
        } else {
            outcome.error.clone().unwrap_or_default()
        };

        format!(
            "{:30} {:12} {} [{:>6}ms] {}",
            outcome.endpoint,
            outcome.category.name(),
            status,
            outcome.latency_ms,
            detail
        )
    }

    /// Boxed summary of a terminal run
    pub fn format_summary(&self, state: &RunState) -> String {
        let summary = state.summary();
        let mut output = String::new();

        output.push_str("\n╔══════════════════════════════════════════════════════════════╗\n");
        output.push_str(&format!(
            "║  Run {:28} {:>27} ║\n",
            state.run_id,
            self.status_label(state.status)
        ));
        output.push_str("╠══════════════════════════════════════════════════════════════╣\n");

        for outcome in &state.outcomes {
            output.push_str(&format!("  {}\n", self.format_outcome(outcome)));
        }

        output.push_str("╠══════════════════════════════════════════════════════════════╣\n");

        let ok = if self.colorize {
            format!("\x1b[32m{}\x1b[0m", summary.successful)
        } else {
            summary.successful.to_string()
        };
        let failed = if self.colorize && summary.failed > 0 {
            format!("\x1b[31m{}\x1b[0m", summary.failed)
        } else {
            summary.failed.to_string()
        };

        output.push_str(&format!(
            "║  Completed: {}/{} | Success: {} | Failed: {}\n",
            summary.completed, summary.total, ok, failed
        ));
        output.push_str(&format!(
            "║  Success Rate: {:5.1}% | Avg Latency: {}ms | Items: {}\n",
            summary.success_rate, summary.avg_latency_ms, summary.total_data_items
        ));
        for category in &summary.categories {
            output.push_str(&format!(
                "║    {:12} {:>3} ok {:>3} failed\n",
                category.category.name(),
                category.successful,
                category.failed
            ));
        }
        output.push_str("╚══════════════════════════════════════════════════════════════╝\n");

        output
    }

    /// Catalog listing for the `list` command
    pub fn format_catalog(&self, endpoints: &[EndpointDescriptor], detailed: bool) -> String {
        let mut output = String::new();
        output.push_str(&format!("\nAvailable endpoints ({}):\n\n", endpoints.len()));

        for (i, endpoint) in endpoints.iter().enumerate() {
            let tier = match endpoint.tier {
                Tier::Premium => self.paint("\x1b[33m", " [premium]"),
                Tier::Basic => String::new(),
            };
            output.push_str(&format!(
                "  {:2}. {:30} {:12}{}\n",
                i + 1,
                endpoint.name,
                endpoint.category.name(),
                tier
            ));
            if detailed {
                output.push_str(&format!("      GET /{}\n", endpoint.path));
                for (key, value) in endpoint.params {
                    output.push_str(&format!("          {key}={value}\n"));
                }
            }
        }
        output
    }

    fn status_label(&self, status: RunStatus) -> String {
        match status {
            RunStatus::Completed => self.paint("\x1b[32m", "COMPLETED"),
            RunStatus::Aborted => self.paint("\x1b[33m", "ABORTED"),
            RunStatus::Running => "RUNNING".to_string(),
            RunStatus::Idle => "IDLE".to_string(),
        }
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.colorize {
            format!("{color}{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }
}

impl Default for ResultFormatter {
    fn default() -> Self {
        Self::new()
    }
}
