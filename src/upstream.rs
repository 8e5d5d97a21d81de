//! Upstream Module
//!
//! The fetcher side of the cache: produces fresh JSON for a resource path.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::FetchError;

// == Upstream Trait ==
/// Source of fresh data. Any failure must surface as `Err`, never as an
/// empty `Ok`, so the cache can tell "no data" from "fetch failed".
#[async_trait]
pub trait Upstream: Send + Sync {
    async fn fetch(&self, path: &str) -> Result<Value, FetchError>;
}

// == HTTP Upstream ==
/// Fetches `GET <base_url>/<path>` and decodes the body as JSON.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: reqwest::Client,
    base_url: String,
}

impl HttpUpstream {
    pub const PLATFORM_HEADER: &'static str = "x-client-platform";

    /// Builds a client with the given per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            Self::PLATFORM_HEADER,
            reqwest::header::HeaderValue::from_static("market-cache"),
        );
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Full URL for a resource path.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl Upstream for HttpUpstream {
    async fn fetch(&self, path: &str) -> Result<Value, FetchError> {
        let url = self.url_for(path);
        debug!(%url, "fetching upstream");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        Ok(response.json::<Value>().await?)
    }
}
