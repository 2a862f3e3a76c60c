//! Request enumeration over the prefix × suffix cross product

use crate::probe::request::ProbeRequest;
use std::sync::Arc;
use url::Url;

/// Produces one request per (prefix, suffix) pair
///
/// Iteration is suffix-major: every prefix is paired with the first suffix
/// before any prefix sees the second. The target URL is the plain
/// concatenation `prefix + suffix`; pairs that do not parse as an absolute
/// URL are logged and skipped.
///
/// The iterator is lazy and single-pass.
///
/// # Example
///
/// ```
/// use meg::probe::enumerate;
/// use std::sync::Arc;
///
/// let prefixes = vec!["http://a".to_string(), "http://b".to_string()];
/// let suffixes = vec!["/x".to_string(), "/y".to_string()];
/// let urls: Vec<String> = enumerate(&prefixes, &suffixes, "GET", Arc::from(Vec::new()))
///     .map(|r| r.url.to_string())
///     .collect();
/// assert_eq!(urls, ["http://a/x", "http://b/x", "http://a/y", "http://b/y"]);
/// ```
pub fn enumerate<'a>(
    prefixes: &'a [String],
    suffixes: &'a [String],
    method: &'a str,
    headers: Arc<[String]>,
) -> impl Iterator<Item = ProbeRequest> + 'a {
    suffixes.iter().flat_map(move |suffix| {
        let headers = Arc::clone(&headers);
        prefixes
            .iter()
            .filter_map(move |prefix| build_request(prefix, suffix, method, &headers))
    })
}

fn build_request(
    prefix: &str,
    suffix: &str,
    method: &str,
    headers: &Arc<[String]>,
) -> Option<ProbeRequest> {
    let raw = format!("{}{}", prefix, suffix);
    match Url::parse(&raw) {
        Ok(url) => Some(ProbeRequest {
            method: method.to_string(),
            url,
            headers: Arc::clone(headers),
        }),
        Err(e) => {
            tracing::warn!("failed to parse url '{}': {}", raw, e);
            None
        }
    }
}
