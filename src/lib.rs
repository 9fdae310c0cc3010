//! Linkcheck: a broken-link crawler with durable reporting
//!
//! This crate crawls a website starting from a base URL, records the HTTP
//! status of every fetched resource together with the page it was found on,
//! and persists a structured report plus a CSV export of the failing links.

pub mod config;
pub mod crawler;
pub mod report;
pub mod robots;
pub mod url;

use thiserror::Error;

/// Main error type for linkcheck operations
#[derive(Debug, Error)]
pub enum LinkCheckError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Failed to persist crawl report: {0}")]
    Persist(#[from] report::PersistError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
///
/// These abort a crawl before any fetch is dispatched.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

/// URL-specific errors
///
/// A discovered link that fails with one of these is dropped, not retried.
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,

    #[error("Empty URL")]
    Empty,
}

/// Result type alias for linkcheck operations
pub type Result<T> = std::result::Result<T, LinkCheckError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::CrawlConfig;
pub use crawler::{run_crawl, Coordinator, CrawlProfile};
pub use report::{CrawlOutcome, CrawlReport, CrawlRun, ErrorKind, ReportStore};
pub use url::normalize;
