//! Configuration module for linkcheck
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, plus building configurations programmatically from a base URL.
//!
//! # Example
//!
//! ```no_run
//! use linkcheck::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("linkcheck.toml")).unwrap();
//! println!("Crawling {}", config.crawl.base_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{CrawlConfig, CrawlSettings, OutputConfig};

// Re-export parser and validation functions
pub use parser::load_config;
pub use validation::validate;
