//! Crawler module: fetching, extraction, scheduling, and orchestration
//!
//! This module contains the core crawl engine:
//! - HTTP fetching with redirect-chain tracking
//! - HTML link extraction
//! - The frontier queue, visited set, and run state machine
//! - The coordinator tying it all together

mod coordinator;
mod fetcher;
mod parser;
mod profile;
mod scheduler;

pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{build_http_client, fetch_url, FetchOptions, FetchResult, MAX_REDIRECTS};
pub use parser::{extract_links, is_html_content_type};
pub use profile::CrawlProfile;
pub use scheduler::{CrawlPhase, CrawlTarget, Scheduler};
