//! Upstream emoji host client

use crate::error::{EmojiCacheError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Content type used when upstream does not declare one
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Default bound on a single upstream request
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A response from the upstream host, whatever its status
#[derive(Debug, Clone)]
pub struct UpstreamResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
}

/// Source of truth for emoji content
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Full URL that `path` is fetched from, for logging
    fn url(&self, path: &str) -> String;

    /// Issue a single GET for `path`
    async fn get(&self, path: &str) -> Result<UpstreamResponse>;
}

/// HTTP client for the upstream emoji host
///
/// Certificate verification stays on and failed requests are not retried.
pub struct HttpUpstream {
    client: Client,
    base_url: String,
}

impl HttpUpstream {
    /// Create a client for `base_url` with the default timeout
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client for `base_url` with a custom timeout
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EmojiCacheError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> Result<UpstreamResponse> {
        let url = self.url(path);
        debug!(url = %url, "Fetching emoji from upstream");

        let response = self.client.get(&url).send().await?;
        let status = response.status().as_u16();

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_string();

        let body = response.bytes().await?.to_vec();

        debug!(
            status,
            size = body.len(),
            content_type = %content_type,
            "Fetched emoji from upstream"
        );

        Ok(UpstreamResponse {
            status,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn test_url_joins_base_and_path() {
        let upstream = HttpUpstream::new("https://yt3.ggpht.com/").unwrap();
        assert_eq!(upstream.base_url(), "https://yt3.ggpht.com");
        assert_eq!(
            upstream.url("/emoji/abc=w48-h48"),
            "https://yt3.ggpht.com/emoji/abc=w48-h48"
        );
    }

    #[tokio::test]
    async fn test_get_returns_status_type_and_body() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/emoji/one");
                then.status(200)
                    .header("Content-Type", "image/png")
                    .body([0x89u8, b'P', b'N', b'G']);
            })
            .await;

        let upstream = HttpUpstream::new(&server.base_url()).unwrap();
        let response = upstream.get("/emoji/one").await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.content_type, "image/png");
        assert_eq!(response.body, vec![0x89, b'P', b'N', b'G']);
        mock.assert_calls_async(1).await;
    }

    #[tokio::test]
    async fn test_get_passes_through_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/missing");
                then.status(404).header("Content-Type", "text/html").body("nope");
            })
            .await;

        let upstream = HttpUpstream::new(&server.base_url()).unwrap();
        let response = upstream.get("/missing").await.unwrap();

        assert_eq!(response.status, 404);
        assert_eq!(response.body, b"nope");
    }

    #[tokio::test]
    async fn test_get_without_content_type_uses_fallback() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/untyped");
                then.status(200).body("raw");
            })
            .await;

        let upstream = HttpUpstream::new(&server.base_url()).unwrap();
        let response = upstream.get("/untyped").await.unwrap();

        assert_eq!(response.content_type, FALLBACK_CONTENT_TYPE);
    }

    #[tokio::test]
    async fn test_get_times_out_on_hung_upstream() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/slow");
                then.status(200).delay(Duration::from_secs(5)).body("late");
            })
            .await;

        let upstream =
            HttpUpstream::with_timeout(&server.base_url(), Duration::from_millis(200)).unwrap();

        let started = std::time::Instant::now();
        let result = upstream.get("/slow").await;

        assert!(matches!(result, Err(EmojiCacheError::Upstream(_))));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_get_connection_refused() {
        // Nothing listens on port 9 locally
        let upstream =
            HttpUpstream::with_timeout("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let result = upstream.get("/emoji").await;
        assert!(matches!(result, Err(EmojiCacheError::Upstream(_))));
    }
}
