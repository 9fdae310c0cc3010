//! Durable persistence for crawl reports
//!
//! Writes the full report as JSON for later retrieval, a flattened CSV of
//! failing links for human download, and the run metadata used for "last
//! check" display. All writes go to a temporary sibling file first and are
//! renamed into place, so a concurrent reader never observes a partially
//! written artifact.

use crate::report::{CrawlReport, CrawlRun};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the persisted report JSON
pub const REPORT_FILE_NAME: &str = "link-checker-last-result.json";

/// File name of the failing-links CSV export
pub const CSV_FILE_NAME: &str = "link-checker-last-result.csv";

/// File name of the persisted run metadata
pub const RUN_FILE_NAME: &str = "link-checker-last-run.json";

/// Errors that can occur while persisting or loading report artifacts
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Result type for persistence operations
pub type PersistResult<T> = Result<T, PersistError>;

/// Owns the on-disk locations of one run's report artifacts
///
/// The output directory is passed in explicitly per run; there is no
/// process-wide report path.
#[derive(Debug, Clone)]
pub struct ReportStore {
    report_path: PathBuf,
    csv_path: PathBuf,
    run_path: PathBuf,
}

impl ReportStore {
    /// Creates a store rooted at the given output directory
    pub fn new(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            report_path: dir.join(REPORT_FILE_NAME),
            csv_path: dir.join(CSV_FILE_NAME),
            run_path: dir.join(RUN_FILE_NAME),
        }
    }

    /// Path of the persisted report JSON
    pub fn report_path(&self) -> &Path {
        &self.report_path
    }

    /// Path of the failing-links CSV
    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }

    /// Persists the report and run metadata, overwriting the previous run
    ///
    /// # Arguments
    ///
    /// * `report` - The finalized report to write
    /// * `run` - Completed run metadata
    ///
    /// # Returns
    ///
    /// * `Ok(())` - All artifacts written and renamed into place
    /// * `Err(PersistError)` - A write failed; the in-memory report is
    ///   untouched and persistence can be retried
    pub fn persist(&self, report: &CrawlReport, run: &CrawlRun) -> PersistResult<()> {
        let json = serde_json::to_string_pretty(report)?;
        write_atomic(&self.report_path, json.as_bytes())?;

        let csv = format_failing_csv(report);
        write_atomic(&self.csv_path, csv.as_bytes())?;

        let run_json = serde_json::to_string_pretty(run)?;
        write_atomic(&self.run_path, run_json.as_bytes())?;

        tracing::info!(
            "Persisted report ({} entries) to {}",
            report.total_entries(),
            self.report_path.display()
        );

        Ok(())
    }

    /// Loads the last persisted report as a JSON string
    ///
    /// Returns `"{}"` when no report has ever been persisted.
    pub fn load_last(&self) -> PersistResult<String> {
        match fs::read_to_string(&self.report_path) {
            Ok(content) => Ok(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok("{}".to_string()),
            Err(e) => Err(PersistError::Read {
                path: self.report_path.clone(),
                source: e,
            }),
        }
    }

    /// Loads the metadata of the last completed run, if any
    pub fn load_last_run(&self) -> PersistResult<Option<CrawlRun>> {
        match fs::read_to_string(&self.run_path) {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PersistError::Read {
                path: self.run_path.clone(),
                source: e,
            }),
        }
    }
}

/// Writes bytes to a temporary sibling file, then renames it into place
fn write_atomic(path: &Path, bytes: &[u8]) -> PersistResult<()> {
    let tmp_path = path.with_extension("tmp");

    fs::write(&tmp_path, bytes).map_err(|source| PersistError::Write {
        path: tmp_path.clone(),
        source,
    })?;

    fs::rename(&tmp_path, path).map_err(|source| PersistError::Write {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(())
}

/// Formats the non-2xx rows of a report as CSV with header `Found on,URL`
fn format_failing_csv(report: &CrawlReport) -> String {
    let mut csv = String::from("Found on,URL\n");

    for (_key, row) in report.failing_rows() {
        csv.push_str(&csv_field(&row.found_on_url));
        csv.push(',');
        csv.push_str(&csv_field(&row.url));
        csv.push('\n');
    }

    csv
}

/// Quotes a CSV field when it contains a delimiter, quote, or newline
fn csv_field(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
