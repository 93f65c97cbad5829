//! Report storage and retrieval
//!
//! Saves rendered reports as `report_<run_id>.<ext>` files.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::report::ReportFormat;

const REPORT_PREFIX: &str = "report_";

/// Generate unique run ID (`YYYYmmdd_HHMMSS_NNNN`)
pub fn generate_run_id() -> String {
    let timestamp = Utc::now().format("%Y%m%d_%H%M%S");
    let random: u32 = rand::random::<u32>() % 10000;
    format!("{timestamp}_{random:04}")
}

/// Report storage manager
pub struct ReportStorage {
    base_dir: PathBuf,
}

impl ReportStorage {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Storage under the user data directory
    pub fn default_dir() -> Self {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sportmonks-probe")
            .join("reports");
        Self::new(base_dir)
    }

    /// Storage in `dir` when given, else the default directory
    pub fn at(dir: Option<&Path>) -> Self {
        dir.map(Self::new).unwrap_or_else(Self::default_dir)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn report_path(&self, run_id: &str, format: ReportFormat) -> PathBuf {
        self.base_dir
            .join(format!("{REPORT_PREFIX}{run_id}.{}", format.extension()))
    }

    /// Write a rendered report
    pub fn save(&self, run_id: &str, format: ReportFormat, bytes: &[u8]) -> Result<PathBuf> {
        fs::create_dir_all(&self.base_dir).with_context(|| {
            format!("Failed to create report directory: {}", self.base_dir.display())
        })?;

        let path = self.report_path(run_id, format);
        write_report(&path, bytes)?;
        info!("Saved report to {}", path.display());
        Ok(path)
    }

    /// Stored reports, newest first
    pub fn list(&self) -> Result<Vec<StoredReport>> {
        if !self.base_dir.exists() {
            return Ok(Vec::new());
        }

        let mut reports = Vec::new();
        for entry in fs::read_dir(&self.base_dir)? {
            let entry = entry?;
            let path = entry.path();
            match StoredReport::from_path(&path) {
                Some(mut report) => {
                    report.size_bytes = entry.metadata().map(|m| m.len()).unwrap_or(0);
                    reports.push(report);
                }
                None => debug!("Skipping {}", path.display()),
            }
        }

        // Run ids start with the timestamp, so reverse lexical order is newest first
        reports.sort_by(|a, b| b.run_id.cmp(&a.run_id).then(a.path.cmp(&b.path)));
        Ok(reports)
    }
}

/// Write report bytes to an explicit path
pub fn write_report(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(path, bytes)
        .with_context(|| format!("Failed to write report: {}", path.display()))
}

/// A report file found in storage
#[derive(Clone, Debug, PartialEq)]
pub struct StoredReport {
    pub run_id: String,
    pub format: ReportFormat,
    pub path: PathBuf,
    pub size_bytes: u64,
}

impl StoredReport {
    fn from_path(path: &Path) -> Option<Self> {
        let stem = path.file_stem()?.to_str()?;
        let run_id = stem.strip_prefix(REPORT_PREFIX)?;
        let format = ReportFormat::from_str(path.extension()?.to_str()?)?;
        Some(Self {
            run_id: run_id.to_string(),
            format,
            path: path.to_path_buf(),
            size_bytes: 0,
        })
    }

    /// Start time encoded in the run id, when it has the standard shape
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        let timestamp = self.run_id.get(..15)?;
        chrono::NaiveDateTime::parse_from_str(timestamp, "%Y%m%d_%H%M%S")
            .ok()
            .map(|naive| naive.and_utc())
    }
}
