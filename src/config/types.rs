use serde::Deserialize;

/// Main configuration structure for a crawl run
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlConfig {
    pub crawl: CrawlSettings,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlSettings {
    /// The URL the crawl is seeded with
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum number of fetches in flight at once
    ///
    /// Kept low by default: ten concurrent connections was enough to trigger
    /// 429 responses from shared hosts, which pollutes the report.
    #[serde(rename = "max-concurrent", default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Per-request timeout in seconds
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Whether links on other hosts are fetched too
    ///
    /// When true, TLS verification is relaxed so that broken links behind
    /// misconfigured certificates are still discovered and classified.
    #[serde(rename = "crawl-external", default = "default_true")]
    pub crawl_external: bool,

    /// Whether robots.txt directives are skipped
    #[serde(rename = "ignore-robots", default = "default_true")]
    pub ignore_robots: bool,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory the report artifacts are written into
    #[serde(default = "default_output_dir")]
    pub dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_max_concurrent() -> usize {
    3
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_output_dir() -> String {
    ".".to_string()
}

impl CrawlConfig {
    /// Builds a configuration from a base URL with all defaults applied
    pub fn for_base_url(base_url: impl Into<String>) -> Self {
        Self {
            crawl: CrawlSettings {
                base_url: base_url.into(),
                max_concurrent: default_max_concurrent(),
                timeout_secs: default_timeout_secs(),
                crawl_external: default_true(),
                ignore_robots: default_true(),
            },
            output: OutputConfig::default(),
        }
    }
}
