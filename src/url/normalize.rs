use crate::UrlError;
use url::Url;

/// Normalizes a URL into the canonical form used as a dedup key
///
/// # Normalization Steps
///
/// 1. Resolve relative input against `base` (the page the link was found on)
/// 2. Reject empty strings, malformed URLs, and non-HTTP(S) schemes
/// 3. Lowercase scheme and host, strip default ports (the `url` parser
///    already does both)
/// 4. Remove the fragment (everything after #)
/// 5. Remove the trailing slash on non-root paths
/// 6. Keep query strings verbatim: differing queries are distinct resources
///
/// Normalization is idempotent: feeding the output back in yields the same
/// URL.
///
/// # Arguments
///
/// * `raw` - The URL string to normalize, possibly relative
/// * `base` - The URL to resolve relative input against, if any
///
/// # Returns
///
/// * `Ok(Url)` - Normalized URL
/// * `Err(UrlError)` - The input should be dropped, not retried
///
/// # Examples
///
/// ```
/// use linkcheck::url::normalize;
///
/// let url = normalize("HTTP://Example.COM:80/page/#intro", None).unwrap();
/// assert_eq!(url.as_str(), "http://example.com/page");
/// ```
pub fn normalize(raw: &str, base: Option<&Url>) -> Result<Url, UrlError> {
    let raw = raw.trim();

    if raw.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut url = match base {
        Some(base) => base
            .join(raw)
            .map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?,
        None => Url::parse(raw).map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?,
    };

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    // Trailing slash carries no meaning for path-only URLs; the root path
    // stays "/" because the url crate cannot represent an empty path here.
    let path = url.path();
    if path.len() > 1 && path.ends_with('/') {
        let trimmed = path[..path.len() - 1].to_string();
        url.set_path(&trimmed);
    }

    Ok(url)
}
