//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - Mapping a page index to its address
//! - GET requests with a bounded timeout
//! - Error classification
//!
//! The fetcher never retries. A failed page is reported back to the
//! coordinator, which decides what to do with it.

use crate::config::{Config, UserAgentConfig};
use crate::HarvestError;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Why a page could not be retrieved
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("HTTP {status}")]
    HttpStatus { status: u16 },

    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to read body: {0}")]
    Body(String),

    #[error("cannot build page address: {0}")]
    InvalidUrl(String),
}

/// Source of raw page markup, addressed by page index
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Retrieves the markup of page `page_index` (1-based)
    async fn fetch(&self, page_index: u32) -> Result<String, FetchFailure>;

    /// Where page `page_index` lives, for logging
    fn describe_page(&self, page_index: u32) -> String;
}

/// Maps page indices onto listing URLs
///
/// Page 1 is the base URL itself; page `n > 1` is `<base>/<segment>/<n>`.
#[derive(Debug, Clone)]
pub struct PageAddress {
    base: Url,
    segment: String,
}

impl PageAddress {
    pub fn new(base_url: &str, segment: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            base: Url::parse(base_url)?,
            segment: segment.to_string(),
        })
    }

    /// Address of page `page_index`
    pub fn page_url(&self, page_index: u32) -> Result<Url, FetchFailure> {
        if page_index <= 1 {
            return Ok(self.base.clone());
        }

        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| FetchFailure::InvalidUrl(format!("{} cannot take a path", self.base)))?
            .pop_if_empty()
            .push(&self.segment)
            .push(&page_index.to_string());
        Ok(url)
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Upper bound for a whole request, body included
///
/// # Example
///
/// ```no_run
/// use mcq_harvest::config::UserAgentConfig;
/// use mcq_harvest::crawler::build_http_client;
/// use std::time::Duration;
///
/// let config = UserAgentConfig {
///     crawler_name: "McqHarvest".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(15)).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig, timeout: Duration) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL; ContactEmail)
    let user_agent = format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches listing pages over HTTP
pub struct HttpFetcher {
    client: Client,
    address: PageAddress,
}

impl HttpFetcher {
    pub fn new(client: Client, address: PageAddress) -> Self {
        Self { client, address }
    }

    /// Builds the client and page addressing from configuration
    pub fn from_config(config: &Config) -> Result<Self, HarvestError> {
        let timeout = Duration::from_secs(config.crawler.request_timeout_secs);
        let client = build_http_client(&config.user_agent, timeout)?;
        let address = PageAddress::new(&config.source.base_url, &config.source.page_segment)?;
        Ok(Self::new(client, address))
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, page_index: u32) -> Result<String, FetchFailure> {
        let url = self.address.page_url(page_index)?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchFailure::HttpStatus {
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchFailure::Timeout
            } else {
                FetchFailure::Body(e.to_string())
            }
        })
    }

    fn describe_page(&self, page_index: u32) -> String {
        match self.address.page_url(page_index) {
            Ok(url) => url.to_string(),
            Err(e) => format!("page {} ({})", page_index, e),
        }
    }
}

/// Maps a transport error onto a failure kind
fn classify_error(e: reqwest::Error) -> FetchFailure {
    if e.is_timeout() {
        FetchFailure::Timeout
    } else if e.is_connect() {
        FetchFailure::Connect(e.to_string())
    } else {
        FetchFailure::Transport(e.to_string())
    }
}
