use crate::error::{upstream_error, SignageResult};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Where raw event payloads come from
#[async_trait]
pub trait EventSource: Send + Sync + 'static {
    /// Retrieve the raw upstream payload
    async fn fetch_raw(&self) -> SignageResult<Value>;
}

/// Upstream calendar API reached over HTTP
#[derive(Debug, Clone)]
pub struct HttpEventSource {
    client: Client,
    url: Url,
}

impl HttpEventSource {
    /// Create a source for `url` whose requests give up after `timeout`
    pub fn new(url: Url, timeout: Duration) -> SignageResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| upstream_error(&format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl EventSource for HttpEventSource {
    async fn fetch_raw(&self) -> SignageResult<Value> {
        debug!("Fetching events from {}", self.url);

        let response = self.client.get(self.url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                upstream_error("Timed out fetching events")
            } else {
                upstream_error(&format!("Failed to fetch events: {}", e))
            }
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(upstream_error(&format!(
                "Failed to fetch events: HTTP {} - {}",
                status,
                error_body.chars().take(200).collect::<String>()
            )));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| upstream_error(&format!("Failed to parse events response: {}", e)))
    }
}
