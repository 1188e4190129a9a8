//! Builds a one-shot fetch client bound to a proxy and profile, and
//! performs the single capped-size GET.
//!
//! Grounded on the teacher's `core/src/client.rs` (timeout + reqwest
//! builder) generalized to accept a proxy and apply a profile's headers,
//! matching the spoofing role of `fingerprint_manager::apply_spoofing`.

use std::time::Duration;

use reqwest::Client;
use scour_profile::Profile;
use scour_proxy::ProxyHandle;
use thiserror::Error;

pub const MAX_BODY_BYTES: usize = 1024 * 1024;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("client build error: {0}")]
    ClientBuild(reqwest::Error),
    #[error("request error: {0}")]
    Request(reqwest::Error),
}

pub struct Fetched {
    pub status_code: u16,
    pub headers: std::collections::HashMap<String, String>,
    pub body: Vec<u8>,
    pub truncated: bool,
    pub captured_bytes: usize,
}

/// Builds a client for one fetch: proxy transport when `proxy` is `Some`,
/// the profile's user-agent and accept-language on every request.
fn build_client(proxy: Option<&ProxyHandle>) -> Result<Client, FetchError> {
    let mut builder = Client::builder().timeout(REQUEST_TIMEOUT);
    if let Some(handle) = proxy {
        let proxy = reqwest::Proxy::all(handle.info.proxy_url()).map_err(FetchError::ClientBuild)?;
        builder = builder.proxy(proxy);
    }
    builder.build().map_err(FetchError::ClientBuild)
}

/// Issues a single GET, applying `profile`'s headers, through `proxy` (or
/// directly when `proxy` is `None`). Reads the body up to `MAX_BODY_BYTES`,
/// truncating silently beyond that and recording the truncation.
pub async fn fetch_once(
    url: &str,
    proxy: Option<&ProxyHandle>,
    profile: &Profile,
) -> Result<Fetched, FetchError> {
    let client = build_client(proxy)?;

    let response = client
        .get(url)
        .header("User-Agent", &profile.user_agent)
        .header("Accept-Language", &profile.language)
        .send()
        .await
        .map_err(FetchError::Request)?;

    let status_code = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_str().unwrap_or_default().to_string()))
        .collect();

    let mut body = Vec::with_capacity(MAX_BODY_BYTES.min(64 * 1024));
    let mut truncated = false;
    let mut stream = response;
    while let Some(chunk) = stream.chunk().await.map_err(FetchError::Request)? {
        if body.len() + chunk.len() > MAX_BODY_BYTES {
            let remaining = MAX_BODY_BYTES - body.len();
            body.extend_from_slice(&chunk[..remaining]);
            truncated = true;
            break;
        }
        body.extend_from_slice(&chunk);
    }

    let captured_bytes = body.len();
    Ok(Fetched {
        status_code,
        headers,
        body,
        truncated,
        captured_bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use scour_profile::ProfileFactory;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn disabled_profile() -> Profile {
        ProfileFactory::default_disabled()
            .generate_profile("https://example.com")
            .unwrap()
    }

    #[tokio::test]
    async fn body_exactly_at_cap_is_captured_intact() {
        let server = MockServer::start().await;
        let body = vec![b'x'; MAX_BODY_BYTES];
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
            .mount(&server)
            .await;

        let fetched = fetch_once(&server.uri(), None, &disabled_profile()).await.unwrap();

        assert!(!fetched.truncated);
        assert_eq!(fetched.captured_bytes, MAX_BODY_BYTES);
        assert_eq!(fetched.body.len(), MAX_BODY_BYTES);
    }

    #[tokio::test]
    async fn body_one_byte_over_cap_is_truncated_but_still_a_success() {
        let server = MockServer::start().await;
        let body = vec![b'x'; MAX_BODY_BYTES + 1];
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
            .mount(&server)
            .await;

        let fetched = fetch_once(&server.uri(), None, &disabled_profile()).await.unwrap();

        assert!(fetched.truncated);
        assert_eq!(fetched.captured_bytes, MAX_BODY_BYTES);
        assert_eq!(fetched.body.len(), MAX_BODY_BYTES);
        assert_eq!(fetched.status_code, 200);
    }

    #[tokio::test]
    async fn applies_profile_headers_and_captures_response_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).insert_header("x-test", "yes").set_body_bytes(b"ok".to_vec()))
            .mount(&server)
            .await;

        let profile = disabled_profile();
        let fetched = fetch_once(&server.uri(), None, &profile).await.unwrap();

        assert_eq!(fetched.status_code, 200);
        assert_eq!(fetched.headers.get("x-test").map(String::as_str), Some("yes"));
        assert!(!fetched.truncated);
        assert_eq!(fetched.body, b"ok");
    }
}
