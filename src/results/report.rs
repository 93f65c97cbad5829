//! Report generation for run results
//!
//! Renders a finished [`RunState`] into a document. Rendering is pure: the
//! same state always produces the same bytes.

use std::fmt::{self, Write};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ProbeError, Result};
use crate::models::{Category, RunState, RunStatus, RunSummary, TestOutcome};

/// Report output format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Json,
    Csv,
    Markdown,
    Text,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(ReportFormat::Json),
            "csv" => Some(ReportFormat::Csv),
            "markdown" | "md" => Some(ReportFormat::Markdown),
            "text" | "txt" => Some(ReportFormat::Text),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
            ReportFormat::Markdown => "md",
            ReportFormat::Text => "txt",
        }
    }

    pub fn all() -> [ReportFormat; 4] {
        [
            ReportFormat::Json,
            ReportFormat::Csv,
            ReportFormat::Markdown,
            ReportFormat::Text,
        ]
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
            ReportFormat::Markdown => "markdown",
            ReportFormat::Text => "text",
        };
        f.write_str(name)
    }
}

/// One line of the report
#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    endpoint: &'a str,
    category: Category,
    success: bool,
    status_code: Option<u16>,
    error: Option<&'a str>,
    latency_ms: u64,
    data_count: usize,
}

impl<'a> From<&'a TestOutcome> for ReportRow<'a> {
    fn from(outcome: &'a TestOutcome) -> Self {
        Self {
            endpoint: &outcome.endpoint,
            category: outcome.category,
            success: outcome.success,
            status_code: outcome.status_code,
            error: outcome.error.as_deref(),
            latency_ms: outcome.latency_ms,
            data_count: outcome.data_count,
        }
    }
}

#[derive(Debug, Serialize)]
struct ReportDocument<'a> {
    run_id: &'a str,
    status: RunStatus,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    summary: RunSummary,
    outcomes: Vec<ReportRow<'a>>,
}

/// Builds a report document from a run
#[derive(Clone, Copy, Debug)]
pub struct ReportBuilder {
    format: ReportFormat,
}

impl ReportBuilder {
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Render `state`. Fails with `EmptyRun` when there are no outcomes.
    pub fn build(&self, state: &RunState) -> Result<Vec<u8>> {
        if state.outcomes.is_empty() {
            return Err(ProbeError::EmptyRun);
        }

        match self.format {
            ReportFormat::Json => build_json(state),
            ReportFormat::Csv => build_csv(state),
            ReportFormat::Markdown => render(state, write_markdown),
            ReportFormat::Text => render(state, write_text),
        }
    }
}

fn build_json(state: &RunState) -> Result<Vec<u8>> {
    let document = ReportDocument {
        run_id: &state.run_id,
        status: state.status,
        started_at: state.started_at,
        finished_at: state.finished_at,
        summary: state.summary(),
        outcomes: state.outcomes.iter().map(ReportRow::from).collect(),
    };
    serde_json::to_vec_pretty(&document).map_err(|e| ProbeError::Serialization(e.to_string()))
}

fn build_csv(state: &RunState) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record([
            "endpoint",
            "category",
            "success",
            "status_code",
            "error",
            "latency_ms",
            "data_count",
        ])
        .map_err(csv_error)?;

    for outcome in &state.outcomes {
        writer
            .write_record([
                outcome.endpoint.clone(),
                outcome.category.name().to_string(),
                outcome.success.to_string(),
                outcome
                    .status_code
                    .map(|s| s.to_string())
                    .unwrap_or_default(),
                outcome.error.clone().unwrap_or_default(),
                outcome.latency_ms.to_string(),
                outcome.data_count.to_string(),
            ])
            .map_err(csv_error)?;
    }

    writer
        .into_inner()
        .map_err(|e| ProbeError::Serialization(e.to_string()))
}

fn csv_error(e: csv::Error) -> ProbeError {
    ProbeError::Serialization(e.to_string())
}

fn render(state: &RunState, write: fn(&mut String, &RunState) -> fmt::Result) -> Result<Vec<u8>> {
    let mut output = String::new();
    write(&mut output, state).map_err(|e| ProbeError::Serialization(e.to_string()))?;
    Ok(output.into_bytes())
}

fn write_text(output: &mut String, state: &RunState) -> fmt::Result {
    let summary = state.summary();

    writeln!(output, "{:=^70}", " SportMonks API Test Report ")?;
    writeln!(output)?;
    writeln!(output, "Run ID:   {}", state.run_id)?;
    writeln!(output, "Status:   {}", state.status)?;
    writeln!(output, "Started:  {}", format_datetime(state.started_at))?;
    writeln!(output, "Finished: {}", format_datetime(state.finished_at))?;
    writeln!(output)?;

    writeln!(output, "{:-^70}", " Summary ")?;
    writeln!(output, "{summary}")?;
    writeln!(output, "Data items: {}", summary.total_data_items)?;
    for category in &summary.categories {
        writeln!(
            output,
            "  {:<12} {} ok / {} failed",
            category.category.name(),
            category.successful,
            category.failed
        )?;
    }
    writeln!(output)?;

    writeln!(output, "{:-^70}", " Endpoints ")?;
    writeln!(
        output,
        "{:<30} {:<12} {:>9} {:>7} {}",
        "Endpoint", "Category", "Time(ms)", "Items", "Status"
    )?;
    writeln!(output, "{:-<70}", "")?;
    for outcome in &state.outcomes {
        writeln!(
            output,
            "{:<30} {:<12} {:>9} {:>7} {} {}",
            truncate(&outcome.endpoint, 30),
            outcome.category.name(),
            outcome.latency_ms,
            outcome.data_count,
            outcome.kind().symbol(),
            outcome.status_or_error()
        )?;
    }
    writeln!(output, "{:=^70}", "")
}

fn write_markdown(output: &mut String, state: &RunState) -> fmt::Result {
    let summary = state.summary();

    writeln!(output, "# SportMonks API Test Report\n")?;
    writeln!(output, "| Property | Value |")?;
    writeln!(output, "|----------|-------|")?;
    writeln!(output, "| Run ID | `{}` |", state.run_id)?;
    writeln!(output, "| Status | {} |", state.status)?;
    writeln!(output, "| Started | {} |", format_datetime(state.started_at))?;
    writeln!(output, "| Finished | {} |", format_datetime(state.finished_at))?;

    writeln!(output, "\n## Summary\n")?;
    writeln!(output, "| Metric | Value |")?;
    writeln!(output, "|--------|-------|")?;
    writeln!(output, "| Completed | {}/{} |", summary.completed, summary.total)?;
    writeln!(output, "| Successful | {} |", summary.successful)?;
    writeln!(output, "| Failed | {} |", summary.failed)?;
    writeln!(output, "| Success Rate | {:.1}% |", summary.success_rate)?;
    writeln!(output, "| Avg Latency | {}ms |", summary.avg_latency_ms)?;
    writeln!(output, "| Data Items | {} |", summary.total_data_items)?;

    writeln!(output, "\n## Endpoints\n")?;
    writeln!(output, "| Endpoint | Category | Result | Status | Latency (ms) | Items |")?;
    writeln!(output, "|----------|----------|--------|--------|--------------|-------|")?;
    for outcome in &state.outcomes {
        writeln!(
            output,
            "| {} | {} | {} | {} | {} | {} |",
            outcome.endpoint,
            outcome.category.name(),
            if outcome.success { "✅" } else { "❌" },
            outcome.status_or_error().replace('|', "\\|"),
            outcome.latency_ms,
            outcome.data_count
        )?;
    }
    Ok(())
}

fn format_datetime(dt: Option<DateTime<Utc>>) -> String {
    dt.map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars - 3).collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EndpointDescriptor;
    use chrono::TimeZone;

    const TEAMS: EndpointDescriptor =
        EndpointDescriptor::new("Teams", "football/teams", Category::Teams);
    const ODDS: EndpointDescriptor =
        EndpointDescriptor::new("Pre-match Odds", "football/odds/pre-match", Category::Odds);

    fn finished_run() -> RunState {
        let mut state = RunState::new("20240501_120000_0042", 2);
        state
            .begin(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap())
            .unwrap();
        state.record(TestOutcome::from_status(&TEAMS, "u", 200, 120).with_data_count(25));
        state.record(TestOutcome::from_status(&ODDS, "u", 403, 80));
        state
            .finish(
                RunStatus::Completed,
                Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 3).unwrap(),
            )
            .unwrap();
        state
    }

    #[test]
    fn test_report_format() {
        assert_eq!(ReportFormat::from_str("JSON"), Some(ReportFormat::Json));
        assert_eq!(ReportFormat::from_str("md"), Some(ReportFormat::Markdown));
        assert_eq!(ReportFormat::from_str("txt"), Some(ReportFormat::Text));
        assert!(ReportFormat::from_str("html").is_none());
        assert_eq!(ReportFormat::Markdown.extension(), "md");
    }

    #[test]
    fn test_empty_run_rejected() {
        let state = RunState::new("run", 3);
        for format in ReportFormat::all() {
            assert_eq!(
                ReportBuilder::new(format).build(&state),
                Err(ProbeError::EmptyRun)
            );
        }
    }

    #[test]
    fn test_build_is_deterministic() {
        let state = finished_run();
        for format in ReportFormat::all() {
            let builder = ReportBuilder::new(format);
            assert_eq!(builder.build(&state), builder.build(&state.clone()));
        }
    }

    #[test]
    fn test_json_report() {
        let bytes = ReportBuilder::new(ReportFormat::Json)
            .build(&finished_run())
            .unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(doc["run_id"], "20240501_120000_0042");
        assert_eq!(doc["status"], "completed");
        assert_eq!(doc["summary"]["successful"], 1);
        assert_eq!(doc["outcomes"][0]["endpoint"], "Teams");
        assert_eq!(doc["outcomes"][0]["data_count"], 25);
        assert_eq!(doc["outcomes"][1]["status_code"], 403);
        assert_eq!(doc["outcomes"][1]["success"], false);
    }

    #[test]
    fn test_csv_report() {
        let bytes = ReportBuilder::new(ReportFormat::Csv)
            .build(&finished_run())
            .unwrap();
        let mut reader = csv::Reader::from_reader(bytes.as_slice());

        let header: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
        assert_eq!(header[0], "endpoint");
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "Teams");
        assert_eq!(&rows[0][2], "true");
        assert_eq!(&rows[1][3], "403");
        assert!(rows[1][4].contains("subscription"));
    }

    #[test]
    fn test_text_and_markdown_reports() {
        let state = finished_run();

        let text = String::from_utf8(
            ReportBuilder::new(ReportFormat::Text).build(&state).unwrap(),
        )
        .unwrap();
        assert!(text.contains("Run ID:   20240501_120000_0042"));
        assert!(text.contains("2024-05-01 12:00:03 UTC"));
        assert!(text.contains("Pre-match Odds"));

        let markdown = String::from_utf8(
            ReportBuilder::new(ReportFormat::Markdown)
                .build(&state)
                .unwrap(),
        )
        .unwrap();
        assert!(markdown.starts_with("# SportMonks API Test Report"));
        assert!(markdown.contains("| Teams | Teams | ✅ | 200 | 120 | 25 |"));
        assert!(markdown.contains("| Success Rate | 50.0% |"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
    }
}
