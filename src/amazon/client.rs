//! HTTP client for Amazon product pages using wreq.

use crate::config::Config;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info, warn};
use wreq::Client;

/// Trait for product page fetching - enables mocking for tests.
#[async_trait]
pub trait ProductFetcher: Send + Sync {
    /// Fetches a product page by ASIN and returns the HTML.
    async fn product(&self, asin: &str) -> Result<String>;
}

/// Amazon HTTP client sending a fixed browser header set.
pub struct AmazonClient {
    client: Client,
    base_url: String,
    user_agent: String,
    cookie: Option<String>,
}

impl AmazonClient {
    /// Creates a new Amazon client with the given configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(10));

        // Configure proxy if specified
        if let Some(proxy_url) = &config.proxy {
            debug!("Configuring proxy: {}", proxy_url);
            let proxy = wreq::Proxy::all(proxy_url).context("Failed to configure proxy")?;
            builder = builder.proxy(proxy);
        }

        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
            cookie: config.cookie.clone().filter(|c| !c.trim().is_empty()),
        })
    }

    /// Returns the product page URL for an ASIN.
    pub fn product_url(&self, asin: &str) -> String {
        format!("{}/dp/{}", self.base_url, asin)
    }

    /// Performs a GET request with the static header set.
    async fn get(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);

        let mut request = self
            .client
            .get(url)
            .header("User-Agent", self.user_agent.as_str())
            .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8")
            .header("Accept-Language", "en-US,en;q=0.5")
            .header("Accept-Encoding", "gzip, deflate, br")
            .header("Sec-Fetch-Dest", "document")
            .header("Sec-Fetch-Mode", "navigate")
            .header("Sec-Fetch-Site", "none")
            .header("Sec-Fetch-User", "?1")
            .header("TE", "trailers")
            .header("Upgrade-Insecure-Requests", "1");

        if let Some(cookie) = &self.cookie {
            request = request.header("Cookie", cookie.as_str());
        }

        let response = request.send().await.context("Failed to send request")?;

        let status = response.status();
        debug!("Response status: {}", status);

        if status == 503 {
            warn!("Rate limited (503). A fresh session cookie may help.");
            anyhow::bail!("Rate limited by Amazon (503)");
        }

        if !status.is_success() {
            anyhow::bail!("Request failed with status: {}", status);
        }

        response.text().await.context("Failed to read response body")
    }
}

#[async_trait]
impl ProductFetcher for AmazonClient {
    async fn product(&self, asin: &str) -> Result<String> {
        let url = self.product_url(asin);

        info!("Fetching product: {}", asin);
        self.get(&url).await
    }
}
