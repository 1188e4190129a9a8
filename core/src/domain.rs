//! Domain extraction for the admission gate.
//!
//! The original source stubbed this out by returning the whole URL, which
//! defeats per-domain rate limiting entirely. This extracts the actual host
//! using a real URL parser and lowercases it for stable map keys.
//! Public-suffix-aware registrable-domain reduction (e.g. collapsing
//! `a.example.co.uk` and `b.example.co.uk` to the same registrable domain)
//! is a reserved refinement, not implemented here.

use crate::error::CoreError;
use url::Url;

/// Extract and normalize the host component of `raw_url`.
///
/// Returns the lowercased host (e.g. `"example.com"`), stripped of a
/// trailing dot if present. Errors if the URL cannot be parsed or has no
/// host (e.g. `mailto:` URIs).
pub fn extract_domain(raw_url: &str) -> Result<String, CoreError> {
    let url = Url::parse(raw_url).map_err(|e| CoreError::InvalidUrl {
        url: raw_url.to_string(),
        reason: e.to_string(),
    })?;

    let host = url.host_str().ok_or_else(|| CoreError::NoHost {
        url: raw_url.to_string(),
    })?;

    Ok(host.trim_end_matches('.').to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_lowercased_host() {
        assert_eq!(extract_domain("https://Example.COM/path").unwrap(), "example.com");
    }

    #[test]
    fn ignores_path_and_query() {
        assert_eq!(
            extract_domain("https://example.com/a/b?x=1#frag").unwrap(),
            "example.com"
        );
    }

    #[test]
    fn preserves_subdomains() {
        assert_eq!(extract_domain("https://a.example.com/1").unwrap(), "a.example.com");
        assert_eq!(extract_domain("https://b.example.com/1").unwrap(), "b.example.com");
    }

    #[test]
    fn strips_trailing_dot() {
        assert_eq!(extract_domain("https://example.com./x").unwrap(), "example.com");
    }

    #[test]
    fn rejects_malformed_url() {
        assert!(extract_domain("not a url").is_err());
    }

    #[test]
    fn rejects_url_without_host() {
        assert!(extract_domain("mailto:ops@example.com").is_err());
    }

    #[test]
    fn is_case_insensitive_for_rate_limit_keys() {
        let a = extract_domain("https://EXAMPLE.com/1").unwrap();
        let b = extract_domain("https://example.COM/2").unwrap();
        assert_eq!(a, b);
    }
}
