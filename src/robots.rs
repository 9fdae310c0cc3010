//! Per-host robots.txt gate
//!
//! The original deployment always ignored robots.txt (the site audits its
//! own content), so this gate is off by default and only consulted when
//! `ignore-robots` is disabled. robots.txt is fetched once per origin and
//! cached for the lifetime of the run; a missing or unfetchable robots.txt
//! allows everything.

use robotstxt::DefaultMatcher;
use std::collections::HashMap;
use url::Url;

/// Product token checked against robots.txt user-agent groups
const AGENT: &str = "linkcheck";

/// Caches robots.txt bodies per origin and answers allow/deny queries
#[derive(Debug)]
pub struct RobotsGate {
    client: reqwest::Client,
    cache: HashMap<String, Option<String>>,
}

impl RobotsGate {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            cache: HashMap::new(),
        }
    }

    /// Returns true if robots.txt permits fetching the URL
    ///
    /// The first query for an origin fetches its robots.txt; later queries
    /// hit the cache.
    pub async fn is_allowed(&mut self, url: &Url) -> bool {
        let origin = match origin_of(url) {
            Some(o) => o,
            None => return true,
        };

        if !self.cache.contains_key(&origin) {
            let body = self.fetch_robots(&origin).await;
            self.cache.insert(origin.clone(), body);
        }

        match self.cache.get(&origin).and_then(|b| b.as_deref()) {
            Some(body) => {
                DefaultMatcher::default().one_agent_allowed_by_robots(body, AGENT, url.as_str())
            }
            None => true,
        }
    }

    async fn fetch_robots(&self, origin: &str) -> Option<String> {
        let robots_url = format!("{}/robots.txt", origin);
        tracing::debug!("Fetching {}", robots_url);

        match self.client.get(&robots_url).send().await {
            Ok(response) if response.status().is_success() => response.text().await.ok(),
            Ok(response) => {
                tracing::debug!("No robots.txt at {} ({})", robots_url, response.status());
                None
            }
            Err(e) => {
                tracing::debug!("Failed to fetch {}: {}", robots_url, e);
                None
            }
        }
    }
}

/// Builds the `scheme://host[:port]` origin string for a URL
fn origin_of(url: &Url) -> Option<String> {
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    })
}
