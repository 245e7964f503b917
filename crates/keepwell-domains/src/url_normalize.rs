use keepwell_core::error::{CoreError, CoreResult};
use sha2::{Digest, Sha256};
use url::Url;

/// Tracking query parameters stripped during normalisation.
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "ref",
    "fbclid",
    "gclid",
    "mc_cid",
    "mc_eid",
];

/// Normalise a saved URL: lower-case host, strip `www.`, force https, drop
/// tracking query parameters and the fragment, and drop a trailing slash on
/// the path. Two URLs that differ only in these respects normalise to the
/// same string and therefore hash to the same `url_hash`.
pub fn normalize_url(raw: &str) -> CoreResult<Url> {
    let mut url = Url::parse(raw).map_err(|e| CoreError::Validation(format!("invalid URL: {e}")))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(CoreError::Validation(format!(
            "unsupported URL scheme: {}",
            url.scheme()
        )));
    }
    url.set_scheme("https")
        .map_err(|_| CoreError::Validation("could not normalise URL scheme".to_string()))?;

    let host = url
        .host_str()
        .ok_or_else(|| CoreError::Validation("URL has no host".to_string()))?
        .to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
    url.set_host(Some(&host))
        .map_err(|_| CoreError::Validation("could not normalise URL host".to_string()))?;

    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !TRACKING_PARAMS.contains(&k.as_ref()))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if retained.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(&retained);
    }

    url.set_fragment(None);

    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
    }

    Ok(url)
}

/// SHA-256 hex digest of a normalised URL; the deduplication key.
pub fn url_hash(normalized: &Url) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_str().as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tracking_params_and_www_and_forces_https() {
        let a = normalize_url("https://www.instagram.com/p/XYZ?utm_source=x").unwrap();
        let b = normalize_url("http://instagram.com/p/XYZ/").unwrap();
        assert_eq!(a.as_str(), b.as_str());
        assert!(a.as_str().ends_with("/p/XYZ"));
        assert_eq!(a.scheme(), "https");
    }

    #[test]
    fn same_normalized_url_hashes_identically() {
        let a = normalize_url("https://www.instagram.com/p/XYZ?utm_source=x").unwrap();
        let b = normalize_url("https://instagram.com/p/XYZ/").unwrap();
        assert_eq!(url_hash(&a), url_hash(&b));
    }

    #[test]
    fn drops_fragment_and_preserves_non_tracking_query_params() {
        let url = normalize_url("https://example.com/post?id=7&utm_campaign=x#section").unwrap();
        assert_eq!(url.as_str(), "https://example.com/post?id=7");
    }

    #[test]
    fn rejects_non_http_schemes() {
        assert!(normalize_url("ftp://example.com/file").is_err());
    }

    #[test]
    fn rejects_unparseable_urls() {
        assert!(normalize_url("not a url").is_err());
    }
}
