//! Listing page fetcher.
//!
//! One GET per run against the configured URL with a desktop-browser
//! User-Agent. A non-200 status is reported as [`FetchOutcome::Unavailable`];
//! only transport failures are errors. There is no retry.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, error, warn};

use crate::error::{FetchError, FetchResult};

/// Browser User-Agent sent with every request to get past basic bot filtering.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Result of a fetch that reached the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// HTTP 200 with the response body.
    Page(String),
    /// Any other status.
    Unavailable { status: u16 },
}

/// Source of listing-page markup.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> FetchResult<FetchOutcome>;
}

/// Fetcher backed by `reqwest`.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> FetchResult<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            reqwest::header::ACCEPT_LANGUAGE,
            reqwest::header::HeaderValue::from_static("nb-NO,nb;q=0.9,en-US;q=0.8,en;q=0.5"),
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(FetchError::Client)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<FetchOutcome> {
        debug!(url = %url, "Fetching listing page");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "HTTP request failed");
                FetchError::Transport {
                    url: url.to_string(),
                    source: Box::new(e),
                }
            })?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            error!(
                url = %url,
                status = status.as_u16(),
                "Failed to retrieve the page"
            );
            return Ok(FetchOutcome::Unavailable {
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| FetchError::Body {
            url: url.to_string(),
            source: Box::new(e),
        })?;

        debug!(url = %url, bytes = body.len(), "Listing page fetched");
        Ok(FetchOutcome::Page(body))
    }
}
