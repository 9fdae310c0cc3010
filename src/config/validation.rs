use crate::config::types::CrawlConfig;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
///
/// Returns the parsed base URL on success so callers do not have to parse it
/// a second time. Any error here aborts the run before a single fetch is
/// dispatched.
pub fn validate(config: &CrawlConfig) -> Result<Url, ConfigError> {
    let base_url = validate_base_url(&config.crawl.base_url)?;

    if config.crawl.max_concurrent < 1 || config.crawl.max_concurrent > 100 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent must be between 1 and 100, got {}",
            config.crawl.max_concurrent
        )));
    }

    if config.crawl.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout-secs must be >= 1, got {}",
            config.crawl.timeout_secs
        )));
    }

    if config.output.dir.is_empty() {
        return Err(ConfigError::Validation(
            "output dir cannot be empty".to_string(),
        ));
    }

    Ok(base_url)
}

/// Validates the base URL: must parse and must be HTTP(S) with a host
fn validate_base_url(raw: &str) -> Result<Url, ConfigError> {
    if raw.is_empty() {
        return Err(ConfigError::InvalidBaseUrl(
            "base-url cannot be empty".to_string(),
        ));
    }

    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidBaseUrl(format!("{}: {}", raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidBaseUrl(format!(
            "base-url must use http or https, got scheme '{}'",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidBaseUrl(format!(
            "base-url has no host: {}",
            raw
        )));
    }

    Ok(url)
}
