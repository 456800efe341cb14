//! Feed retrieval through the rendering proxy.
//!
//! Every request goes to `PROXY_PREFIX` followed by the original feed URL;
//! the deployment cannot reach the feed hosts directly.
//!
//! # Architecture
//!
//! - [`FetchFeed`]: Trait the pipeline depends on, so tests can swap in stubs
//! - [`ProxyFetcher`]: The `reqwest`-backed implementation used in production

use reqwest::Client;
use std::error::Error;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};
use url::Url;

/// Prefix prepended to every feed URL.
pub const PROXY_PREFIX: &str = "https://r.jina.ai/http://";

/// Identifying `User-Agent` sent with each request.
pub const USER_AGENT: &str = "Mozilla/5.0 (AI News Aggregator)";

/// Upper bound on a single fetch, connect through body.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Pause after each source attempt, whether it succeeded or not.
pub const PACING_DELAY: Duration = Duration::from_millis(300);

/// Trait for retrieving the raw text of a feed.
pub trait FetchFeed {
    /// Fetch the feed at `url` and return its body as text.
    ///
    /// Any error means the source is skipped for this run.
    async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error>>;
}

/// Fetches feeds through [`PROXY_PREFIX`] with a fixed timeout and user agent.
#[derive(Debug, Clone)]
pub struct ProxyFetcher {
    client: Client,
}

impl ProxyFetcher {
    /// Build the shared HTTP client.
    pub fn new() -> Result<Self, Box<dyn Error>> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }
}

/// Build the URL actually requested for a feed.
pub fn proxied_url(url: &str) -> Result<Url, url::ParseError> {
    Url::parse(&format!("{PROXY_PREFIX}{url}"))
}

/// Decode a response body, replacing invalid UTF-8 instead of failing.
pub fn decode_body(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

impl FetchFeed for ProxyFetcher {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &str) -> Result<String, Box<dyn Error>> {
        let t0 = Instant::now();
        let target = proxied_url(url)?;

        let response = self.client.get(target).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Proxy returned non-success status");
        }
        let bytes = response.error_for_status()?.bytes().await?;

        let body = decode_body(&bytes);
        debug!(
            bytes = bytes.len(),
            elapsed_ms = t0.elapsed().as_millis() as u128,
            "Fetched feed body"
        );
        Ok(body)
    }
}
