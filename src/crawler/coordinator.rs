//! Crawl coordinator - main crawl orchestration logic
//!
//! The coordinator drives the run through its phases: it seeds the frontier,
//! keeps up to `max-concurrent` fetches in flight, feeds extracted links
//! back into the scheduler, delivers outcomes to the observer, and stamps
//! the run metadata. All queue and visited-set bookkeeping happens on this
//! single control loop; only the fetches themselves run in parallel.

use crate::config::{validate, CrawlConfig};
use crate::crawler::fetcher::{build_http_client, fetch_url, FetchOptions, FetchResult};
use crate::crawler::parser::extract_links;
use crate::crawler::profile::CrawlProfile;
use crate::crawler::scheduler::{CrawlTarget, Scheduler};
use crate::report::{CrawlObserver, CrawlOutcome, CrawlReport, CrawlRun, ReportCollector, ReportStore};
use crate::robots::RobotsGate;
use crate::{LinkCheckError, Result};
use reqwest::Client;
use std::sync::Arc;
use tokio::task::JoinSet;
use url::Url;

/// Orchestrates one crawl run
///
/// All fallible setup happens in [`Coordinator::new`]; once `run` starts,
/// per-URL failures are recorded as outcomes and never abort the run.
pub struct Coordinator {
    config: CrawlConfig,
    base_url: Url,
    client: Client,
    options: FetchOptions,
    profile: CrawlProfile,
    scheduler: Scheduler,
    observer: Arc<dyn CrawlObserver>,
    robots: Option<RobotsGate>,
}

impl Coordinator {
    /// Creates a coordinator, validating the configuration
    ///
    /// # Arguments
    ///
    /// * `config` - The crawl configuration; an invalid base URL or option
    ///   aborts here, before any fetch
    /// * `observer` - Receives one outcome per discovered link
    pub fn new(config: CrawlConfig, observer: Arc<dyn CrawlObserver>) -> Result<Self> {
        let base_url = validate(&config)?;

        let options = FetchOptions {
            timeout_secs: config.crawl.timeout_secs,
            // External hosts are audited even behind bad certificates
            verify_tls: !config.crawl.crawl_external,
            follow_redirects: true,
            track_redirect_chain: true,
        };

        let client = build_http_client(&options)?;
        let profile = CrawlProfile::for_external_policy(&base_url, config.crawl.crawl_external);

        let robots = if config.crawl.ignore_robots {
            None
        } else {
            Some(RobotsGate::new(client.clone()))
        };

        Ok(Self {
            config,
            base_url,
            client,
            options,
            profile,
            scheduler: Scheduler::new(),
            observer,
            robots,
        })
    }

    /// Runs the crawl to completion and returns the finalized run metadata
    ///
    /// The loop alternates between filling free fetch slots from the
    /// frontier and awaiting one completion. When the frontier is empty but
    /// fetches remain in flight the run drains; no outcome is lost.
    pub async fn run(&mut self) -> Result<CrawlRun> {
        let mut run = CrawlRun::start(self.base_url.as_str());
        tracing::info!("Starting crawl of {}", self.base_url);

        self.scheduler.begin(CrawlTarget::seed(&self.base_url));

        let mut in_flight: JoinSet<(CrawlTarget, Url, FetchResult)> = JoinSet::new();
        let mut fetches_completed: u64 = 0;

        loop {
            // Fill free slots. Admission (normalize, profile, dedup) is
            // serialized here so the visited set has a single writer.
            while in_flight.len() < self.config.crawl.max_concurrent {
                let target = match self.scheduler.dequeue() {
                    Some(t) => t,
                    None => break,
                };

                let normalized = match self.scheduler.admit(&target, &self.profile) {
                    Some(url) => url,
                    None => continue,
                };

                if let Some(gate) = self.robots.as_mut() {
                    if !gate.is_allowed(&normalized).await {
                        tracing::debug!("robots.txt disallows {}", normalized);
                        continue;
                    }
                }

                let client = self.client.clone();
                let options = self.options.clone();
                in_flight.spawn(async move {
                    let result = fetch_url(&client, normalized.as_str(), &options).await;
                    (target, normalized, result)
                });
            }

            if in_flight.is_empty() {
                // Frontier exhausted and nothing left in flight
                break;
            }

            if self.scheduler.is_queue_empty() {
                self.scheduler.mark_draining();
            }

            match in_flight.join_next().await {
                Some(Ok((target, normalized, result))) => {
                    self.on_fetch_complete(target, normalized, result);
                    fetches_completed += 1;

                    if fetches_completed % 10 == 0 {
                        tracing::info!(
                            "Progress: {} fetched, {} queued, {} in flight",
                            fetches_completed,
                            self.scheduler.queue_len(),
                            in_flight.len()
                        );
                    }
                }
                Some(Err(e)) => {
                    tracing::error!("Fetch task failed: {}", e);
                }
                None => break,
            }
        }

        self.scheduler.complete();
        run.complete();

        tracing::info!(
            "Crawl completed: {} URLs visited ({} fetches)",
            self.scheduler.visited_count(),
            fetches_completed
        );

        Ok(run)
    }

    /// Handles one finished fetch: extract links, re-queue, emit the outcome
    fn on_fetch_complete(&mut self, target: CrawlTarget, normalized: Url, result: FetchResult) {
        let (status_code, error, redirect_chain) = match result {
            FetchResult::Completed {
                status_code,
                body,
                content_type,
                redirect_chain,
            } => {
                if !body.is_empty() {
                    // Relative hrefs resolve against the requested URL, not
                    // the post-redirect one
                    for discovered in extract_links(&body, &content_type, &normalized) {
                        self.scheduler.enqueue(discovered);
                    }
                }
                (Some(status_code), None, redirect_chain)
            }
            FetchResult::Failed {
                kind,
                redirect_chain,
            } => {
                tracing::debug!("Fetch of {} failed: {}", normalized, kind);
                (None, Some(kind), redirect_chain)
            }
        };

        // The seed page is fetched for discovery only; the report holds
        // {foundOnUrl, url} pairs, which the seed does not have.
        if let Some(found_on_url) = target.found_on_url {
            self.observer.on_outcome(CrawlOutcome {
                url: normalized.to_string(),
                found_on_url,
                status_code,
                error,
                redirect_chain,
            });
        }
    }
}

/// Runs a complete crawl and persists the resulting report
///
/// This is the trigger interface: synchronous from the caller's perspective
/// but long-running. A run that encountered fetch errors still succeeds and
/// reports them as classified entries; only setup and persistence failures
/// surface as errors.
///
/// # Arguments
///
/// * `config` - The crawl configuration
/// * `test_url_override` - Replaces the configured base URL when set, for
///   pointing a crawl at a staging copy
///
/// # Returns
///
/// * `Ok((CrawlReport, CrawlRun))` - The finalized report and run metadata,
///   already persisted
/// * `Err(LinkCheckError)` - Configuration or persistence failure
pub async fn run_crawl(
    mut config: CrawlConfig,
    test_url_override: Option<String>,
) -> Result<(CrawlReport, CrawlRun)> {
    if let Some(override_url) = test_url_override {
        tracing::info!("Base URL overridden to {}", override_url);
        config.crawl.base_url = override_url;
    }

    let collector = Arc::new(ReportCollector::new());
    let mut coordinator = Coordinator::new(config.clone(), collector.clone())?;
    let run = coordinator.run().await?;

    let report = collector.finalize();

    let store = ReportStore::new(&config.output.dir);
    store.persist(&report, &run).map_err(LinkCheckError::from)?;

    Ok((report, run))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConfigError;

    #[test]
    fn test_invalid_base_url_aborts_before_running() {
        let config = CrawlConfig::for_base_url("not a url");
        let observer = Arc::new(ReportCollector::new());

        assert!(matches!(
            Coordinator::new(config, observer),
            Err(LinkCheckError::Config(ConfigError::InvalidBaseUrl(_)))
        ));
    }

    #[test]
    fn test_zero_concurrency_aborts() {
        let mut config = CrawlConfig::for_base_url("http://example.test/");
        config.crawl.max_concurrent = 0;
        let observer = Arc::new(ReportCollector::new());

        assert!(Coordinator::new(config, observer).is_err());
    }

    #[tokio::test]
    async fn test_run_crawl_rejects_bad_override() {
        let config = CrawlConfig::for_base_url("http://example.test/");
        let result = run_crawl(config, Some("ftp://example.test/".to_string())).await;
        assert!(matches!(result.unwrap_err(), LinkCheckError::Config(_)));
    }

    // End-to-end crawl behavior is exercised with wiremock in
    // tests/crawl_tests.rs.
}
