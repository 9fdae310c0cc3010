//! Crawl profile: the policy deciding which discovered URLs are eligible
//! for visitation.

use url::Url;

/// Visitation policy for discovered URLs
///
/// A profile is a pure decision function: the same URL always gets the same
/// answer within a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlProfile {
    /// Accept any HTTP(S) URL regardless of host
    ///
    /// Used to also detect externally-broken links referenced from the site.
    AllUrls,

    /// Accept only URLs sharing the base URL's host
    InternalOnly { host: String },
}

impl CrawlProfile {
    /// Builds an internal-only profile from the base URL's host
    pub fn internal_only(base_url: &Url) -> Self {
        Self::InternalOnly {
            host: base_url.host_str().unwrap_or_default().to_lowercase(),
        }
    }

    /// Selects the profile implied by the crawl-external setting
    pub fn for_external_policy(base_url: &Url, crawl_external: bool) -> Self {
        if crawl_external {
            Self::AllUrls
        } else {
            Self::internal_only(base_url)
        }
    }

    /// Decides whether a normalized URL should be queued for fetching
    pub fn should_visit(&self, url: &Url) -> bool {
        match self {
            Self::AllUrls => true,
            Self::InternalOnly { host } => url
                .host_str()
                .map(|h| h.eq_ignore_ascii_case(host))
                .unwrap_or(false),
        }
    }
}
