//! HTML link extraction
//!
//! Parses fetched bodies and yields the outgoing links together with the
//! page they were found on. Only HTML-like content types are parsed; other
//! resources (images, PDFs, ...) yield no links but are still recorded as
//! outcomes by the observer.

use crate::crawler::scheduler::CrawlTarget;
use scraper::{Html, Selector};
use url::Url;

/// Content types we are willing to parse for links
const HTML_CONTENT_TYPES: &[&str] = &["text/html", "application/xhtml+xml"];

/// Returns true if the Content-Type header denotes an HTML-like body
pub fn is_html_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    HTML_CONTENT_TYPES.contains(&essence.as_str())
}

/// Extracts outgoing links from a fetched body
///
/// Re-parsing the same body yields the same sequence. Malformed markup
/// degrades gracefully: scraper recovers whatever anchors it can rather
/// than failing the fetch.
///
/// # Arguments
///
/// * `body` - The fetched response body
/// * `content_type` - The response Content-Type header
/// * `source_url` - The page the body came from, used to resolve relative
///   hrefs and recorded as each target's referring page
///
/// # Returns
///
/// The discovered targets, in document order
pub fn extract_links(body: &str, content_type: &str, source_url: &Url) -> Vec<CrawlTarget> {
    if !is_html_content_type(content_type) {
        return Vec::new();
    }

    let document = Html::parse_document(body);
    let mut targets = Vec::new();

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute) = resolve_link(href, source_url) {
                    targets.push(CrawlTarget {
                        url: absolute,
                        found_on_url: Some(source_url.to_string()),
                    });
                }
            }
        }
    }

    targets
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes and data: URIs
/// - fragment-only links (same page anchors)
/// - hrefs that do not resolve to HTTP(S)
fn resolve_link(href: &str, source_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match source_url.join(href) {
        Ok(absolute) if absolute.scheme() == "http" || absolute.scheme() == "https" => {
            Some(absolute.to_string())
        }
        _ => None,
    }
}
