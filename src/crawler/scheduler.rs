//! Scheduler: the crawl frontier, the visited set, and the run state machine
//!
//! The scheduler is exclusively owned by the coordinator's control loop, so
//! all discovery, dedup, and enqueue bookkeeping is single-writer. Only the
//! fetch step runs in parallel. `admit` is the single gate through which a
//! target becomes fetchable: it normalizes, applies the crawl profile, and
//! marks the URL visited in one step, so no normalized URL is ever admitted
//! twice per run.

use crate::crawler::profile::CrawlProfile;
use crate::url::normalize;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// One discovered, not-yet-visited link and the page that referenced it
///
/// Created by the link extractor or as the initial seed, consumed exactly
/// once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    /// The discovered URL, absolute
    pub url: String,

    /// The page the URL was found on; None for the seed
    pub found_on_url: Option<String>,
}

impl CrawlTarget {
    /// Creates the initial seed target for a run
    pub fn seed(base_url: &Url) -> Self {
        Self {
            url: base_url.to_string(),
            found_on_url: None,
        }
    }
}

/// Lifecycle of a crawl run
///
/// `Idle → Running → Draining → Completed`. Draining means the queue is
/// empty but fetches are still in flight; Completed is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    Idle,
    Running,
    Draining,
    Completed,
}

/// Owns the FIFO frontier and the visited set for one crawl run
#[derive(Debug)]
pub struct Scheduler {
    queue: VecDeque<CrawlTarget>,
    visited: HashSet<String>,
    phase: CrawlPhase,
}

impl Scheduler {
    /// Creates an idle scheduler with an empty frontier and visited set
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
            visited: HashSet::new(),
            phase: CrawlPhase::Idle,
        }
    }

    /// Seeds the frontier and moves the run to `Running`
    pub fn begin(&mut self, seed: CrawlTarget) {
        debug_assert_eq!(self.phase, CrawlPhase::Idle);
        self.queue.push_back(seed);
        self.transition(CrawlPhase::Running);
    }

    /// Adds a discovered target to the back of the frontier
    ///
    /// New discoveries while draining move the run back to `Running`;
    /// enqueueing after completion is a no-op.
    pub fn enqueue(&mut self, target: CrawlTarget) {
        match self.phase {
            CrawlPhase::Completed => {
                tracing::warn!("Dropping target enqueued after completion: {}", target.url);
            }
            CrawlPhase::Draining => {
                self.queue.push_back(target);
                self.transition(CrawlPhase::Running);
            }
            _ => self.queue.push_back(target),
        }
    }

    /// Removes the oldest target from the frontier (FIFO by discovery order)
    pub fn dequeue(&mut self) -> Option<CrawlTarget> {
        self.queue.pop_front()
    }

    /// Gates a dequeued target and marks it visited
    ///
    /// Returns the normalized URL when the target should be fetched, or None
    /// when it is malformed, rejected by the profile, or already visited.
    /// Rejected targets are dropped silently (debug log only).
    pub fn admit(&mut self, target: &CrawlTarget, profile: &CrawlProfile) -> Option<Url> {
        let normalized = match normalize(&target.url, None) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Dropping unfetchable URL {}: {}", target.url, e);
                return None;
            }
        };

        if !profile.should_visit(&normalized) {
            tracing::debug!("Profile rejected {}", normalized);
            return None;
        }

        if !self.visited.insert(normalized.as_str().to_string()) {
            tracing::trace!("Already visited {}", normalized);
            return None;
        }

        Some(normalized)
    }

    /// Notes that the frontier is empty while fetches remain in flight
    pub fn mark_draining(&mut self) {
        if self.phase == CrawlPhase::Running && self.queue.is_empty() {
            self.transition(CrawlPhase::Draining);
        }
    }

    /// Marks the run complete; terminal, a new run needs a fresh scheduler
    pub fn complete(&mut self) {
        self.transition(CrawlPhase::Completed);
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    /// Number of targets waiting in the frontier
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_queue_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of distinct normalized URLs admitted so far
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    fn transition(&mut self, to: CrawlPhase) {
        if self.phase == CrawlPhase::Completed {
            tracing::warn!("Ignoring transition out of Completed");
            return;
        }
        tracing::trace!("Crawl phase: {:?} -> {:?}", self.phase, to);
        self.phase = to;
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(url: &str) -> CrawlTarget {
        CrawlTarget {
            url: url.to_string(),
            found_on_url: Some("http://example.test/".to_string()),
        }
    }

    fn running_scheduler() -> Scheduler {
        let mut scheduler = Scheduler::new();
        let base = Url::parse("http://example.test/").unwrap();
        scheduler.begin(CrawlTarget::seed(&base));
        scheduler
    }

    #[test]
    fn test_new_scheduler_is_idle_and_empty() {
        let scheduler = Scheduler::new();
        assert_eq!(scheduler.phase(), CrawlPhase::Idle);
        assert!(scheduler.is_queue_empty());
        assert_eq!(scheduler.visited_count(), 0);
    }

    #[test]
    fn test_begin_seeds_and_runs() {
        let scheduler = running_scheduler();
        assert_eq!(scheduler.phase(), CrawlPhase::Running);
        assert_eq!(scheduler.queue_len(), 1);
    }

    #[test]
    fn test_fifo_dispatch_order() {
        let mut scheduler = running_scheduler();
        scheduler.dequeue();
        scheduler.enqueue(target("http://example.test/a"));
        scheduler.enqueue(target("http://example.test/b"));

        assert_eq!(scheduler.dequeue().unwrap().url, "http://example.test/a");
        assert_eq!(scheduler.dequeue().unwrap().url, "http://example.test/b");
    }

    #[test]
    fn test_admit_at_most_once() {
        let mut scheduler = running_scheduler();
        let profile = CrawlProfile::AllUrls;

        let first = scheduler.admit(&target("http://example.test/page"), &profile);
        assert!(first.is_some());

        // Same resource in a different spelling is still a duplicate
        let dup = scheduler.admit(&target("HTTP://EXAMPLE.TEST/page/"), &profile);
        assert!(dup.is_none());
        assert_eq!(scheduler.visited_count(), 1);
    }

    #[test]
    fn test_admit_rejects_malformed() {
        let mut scheduler = running_scheduler();
        let profile = CrawlProfile::AllUrls;

        assert!(scheduler.admit(&target("mailto:a@b.test"), &profile).is_none());
        assert!(scheduler.admit(&target(""), &profile).is_none());
        assert_eq!(scheduler.visited_count(), 0);
    }

    #[test]
    fn test_admit_respects_profile() {
        let mut scheduler = running_scheduler();
        let base = Url::parse("http://example.test/").unwrap();
        let profile = CrawlProfile::internal_only(&base);

        assert!(scheduler
            .admit(&target("http://external.test/y"), &profile)
            .is_none());
        // A profile rejection must not poison the visited set
        assert_eq!(scheduler.visited_count(), 0);
    }

    #[test]
    fn test_draining_and_back() {
        let mut scheduler = running_scheduler();
        scheduler.dequeue();

        scheduler.mark_draining();
        assert_eq!(scheduler.phase(), CrawlPhase::Draining);

        // A completion delivering new links resumes the run
        scheduler.enqueue(target("http://example.test/late"));
        assert_eq!(scheduler.phase(), CrawlPhase::Running);
    }

    #[test]
    fn test_mark_draining_requires_empty_queue() {
        let mut scheduler = running_scheduler();
        scheduler.mark_draining();
        assert_eq!(scheduler.phase(), CrawlPhase::Running);
    }

    #[test]
    fn test_completed_is_terminal() {
        let mut scheduler = running_scheduler();
        scheduler.complete();
        assert_eq!(scheduler.phase(), CrawlPhase::Completed);

        scheduler.enqueue(target("http://example.test/late"));
        assert_eq!(scheduler.phase(), CrawlPhase::Completed);

        scheduler.mark_draining();
        assert_eq!(scheduler.phase(), CrawlPhase::Completed);
    }

    #[test]
    fn test_seed_target_has_no_referrer() {
        let base = Url::parse("http://example.test/").unwrap();
        let seed = CrawlTarget::seed(&base);
        assert_eq!(seed.url, "http://example.test/");
        assert!(seed.found_on_url.is_none());
    }
}
