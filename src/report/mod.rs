//! Crawl result model and accumulation
//!
//! This module defines the per-URL outcome record, the status-code-keyed
//! report it folds into, and the observer seam through which the crawl loop
//! delivers outcomes as concurrent fetches complete.

mod persist;

pub use persist::{PersistError, ReportStore, CSV_FILE_NAME, REPORT_FILE_NAME, RUN_FILE_NAME};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Mutex;

/// Bucket key used for outcomes that carry no HTTP status code
pub const ERROR_BUCKET: &str = "error";

/// Classification of a fetch failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// The request exceeded the configured timeout
    Timeout,
    /// The connection could not be established
    Connect,
    /// TLS handshake or certificate failure
    Tls,
    /// The redirect chain exceeded the hop limit
    TooManyRedirects,
    /// The redirect chain revisited a URL
    RedirectLoop,
    /// Any other transport-level failure
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Tls => "tls",
            Self::TooManyRedirects => "too-many-redirects",
            Self::RedirectLoop => "redirect-loop",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}

/// The result of fetching one URL, success or failure
///
/// Immutable once created. `status_code` and `error` are mutually exclusive:
/// a completed request carries a status code, a failed one carries an error
/// kind.
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlOutcome {
    /// The URL that was fetched (normalized form)
    pub url: String,

    /// The page the URL was discovered on; the base URL for the seed
    pub found_on_url: String,

    /// HTTP status code, None when the fetch failed before a response
    pub status_code: Option<u16>,

    /// Failure classification when no response arrived
    pub error: Option<ErrorKind>,

    /// URLs visited while following redirects, in hop order
    pub redirect_chain: Vec<String>,
}

impl CrawlOutcome {
    /// Returns the report bucket key for this outcome
    pub fn bucket_key(&self) -> String {
        match self.status_code {
            Some(code) => code.to_string(),
            None => ERROR_BUCKET.to_string(),
        }
    }

    /// Returns true if this outcome represents a broken link (non-2xx)
    pub fn is_failing(&self) -> bool {
        match self.status_code {
            Some(code) => !(200..300).contains(&code),
            None => true,
        }
    }
}

/// One row of the report: a link and the page that referenced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRow {
    pub found_on_url: String,
    pub url: String,
}

/// The accumulated crawl report
///
/// Maps a status-code key (or the reserved `"error"` key) to the rows that
/// completed with that status. Row order within a bucket reflects completion
/// order, not discovery order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CrawlReport {
    buckets: BTreeMap<String, Vec<ReportRow>>,
}

impl CrawlReport {
    /// Returns the rows in the given bucket, if any
    pub fn bucket(&self, key: &str) -> Option<&[ReportRow]> {
        self.buckets.get(key).map(Vec::as_slice)
    }

    /// Iterates over all buckets in key order
    pub fn buckets(&self) -> impl Iterator<Item = (&str, &[ReportRow])> {
        self.buckets.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Iterates over the rows of every non-2xx bucket, including `"error"`
    pub fn failing_rows(&self) -> impl Iterator<Item = (&str, &ReportRow)> {
        self.buckets
            .iter()
            .filter(|(key, _)| !is_success_key(key))
            .flat_map(|(key, rows)| rows.iter().map(move |row| (key.as_str(), row)))
    }

    /// Total number of rows across all buckets
    pub fn total_entries(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    fn push(&mut self, key: String, row: ReportRow) {
        self.buckets.entry(key).or_default().push(row);
    }
}

/// Returns true for bucket keys in the 2xx range
fn is_success_key(key: &str) -> bool {
    key.parse::<u16>()
        .map(|code| (200..300).contains(&code))
        .unwrap_or(false)
}

/// Metadata for one crawl run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrawlRun {
    /// When the crawl was started
    pub started_at: DateTime<Utc>,

    /// The URL the crawl was seeded with
    pub base_url: String,

    /// When the crawl finished; None while still running
    pub completed_at: Option<DateTime<Utc>>,
}

impl CrawlRun {
    /// Creates run metadata stamped with the current time
    pub fn start(base_url: &str) -> Self {
        Self {
            started_at: Utc::now(),
            base_url: base_url.to_string(),
            completed_at: None,
        }
    }

    /// Stamps the completion time
    pub fn complete(&mut self) {
        self.completed_at = Some(Utc::now());
    }
}

/// Observer seam for per-URL outcomes
///
/// The crawl loop delivers every outcome, success or failure, through this
/// trait exactly once. Implementations must tolerate concurrent invocation
/// from in-flight fetch tasks.
pub trait CrawlObserver: Send + Sync {
    fn on_outcome(&self, outcome: CrawlOutcome);
}

/// Accumulates outcomes into a [`CrawlReport`]
///
/// Appends are serialized through an internal mutex so that concurrent
/// completions neither lose nor duplicate entries.
#[derive(Debug, Default)]
pub struct ReportCollector {
    report: Mutex<CrawlReport>,
}

impl ReportCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an immutable snapshot of the accumulated report
    pub fn finalize(&self) -> CrawlReport {
        self.report
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl CrawlObserver for ReportCollector {
    fn on_outcome(&self, outcome: CrawlOutcome) {
        let key = outcome.bucket_key();
        let row = ReportRow {
            found_on_url: outcome.found_on_url,
            url: outcome.url,
        };

        tracing::debug!("Recording outcome: {} -> bucket {}", row.url, key);

        let mut report = self.report.lock().unwrap_or_else(|e| e.into_inner());
        report.push(key, row);
    }
}
