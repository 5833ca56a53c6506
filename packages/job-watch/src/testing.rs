//! Testing utilities including mock implementations.
//!
//! These let the pipeline run end to end without network or SMTP access.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

use crate::error::{FetchError, FetchResult};
use crate::fetcher::{FetchOutcome, PageFetcher};
use crate::notifier::Notifier;
use crate::types::{Delivery, Digest, JobRecord};

/// What the mock fetcher hands back.
#[derive(Debug, Clone)]
enum MockResponse {
    Page(String),
    Status(u16),
    TransportError,
}

/// A mock fetcher returning a configurable response.
///
/// # Example
///
/// ```rust
/// use job_watch::testing::{listing_page, MockFetcher};
/// use job_watch::JobRecord;
///
/// let fetcher = MockFetcher::page(listing_page(&[JobRecord::new("Acme", "Engineer", "2024-05-01")]));
/// assert_eq!(fetcher.call_count(), 0);
/// ```
#[derive(Clone)]
pub struct MockFetcher {
    response: Arc<RwLock<MockResponse>>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    /// Respond with HTTP 200 and `html`.
    pub fn page(html: impl Into<String>) -> Self {
        Self::with_response(MockResponse::Page(html.into()))
    }

    /// Respond with a non-200 status.
    pub fn status(status: u16) -> Self {
        Self::with_response(MockResponse::Status(status))
    }

    /// Fail at the transport level, as an unreachable host would.
    pub fn transport_error() -> Self {
        Self::with_response(MockResponse::TransportError)
    }

    fn with_response(response: MockResponse) -> Self {
        Self {
            response: Arc::new(RwLock::new(response)),
            calls: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Swap the page served on subsequent fetches.
    pub fn set_page(&self, html: impl Into<String>) {
        *self.response.write().unwrap() = MockResponse::Page(html.into());
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// URLs requested so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<FetchOutcome> {
        self.calls.write().unwrap().push(url.to_string());

        let response = self.response.read().unwrap().clone();
        match response {
            MockResponse::Page(html) => Ok(FetchOutcome::Page(html)),
            MockResponse::Status(status) => Ok(FetchOutcome::Unavailable { status }),
            MockResponse::TransportError => Err(FetchError::Transport {
                url: url.to_string(),
                source: Box::new(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    "connection refused",
                )),
            }),
        }
    }
}

/// A mock notifier that records every digest it receives.
#[derive(Clone)]
pub struct MockNotifier {
    delivery: Delivery,
    sent: Arc<RwLock<Vec<Digest>>>,
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNotifier {
    /// A notifier whose deliveries always succeed.
    pub fn new() -> Self {
        Self::with_delivery(Delivery::Sent)
    }

    /// A notifier whose deliveries always fail.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self::with_delivery(Delivery::Failed {
            reason: reason.into(),
        })
    }

    fn with_delivery(delivery: Delivery) -> Self {
        Self {
            delivery,
            sent: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn call_count(&self) -> usize {
        self.sent.read().unwrap().len()
    }

    pub fn last_digest(&self) -> Option<Digest> {
        self.sent.read().unwrap().last().cloned()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn notify(&self, digest: &Digest) -> Delivery {
        self.sent.write().unwrap().push(digest.clone());
        self.delivery.clone()
    }
}

/// Render `jobs` as a listing page in the source site's markup.
pub fn listing_page(jobs: &[JobRecord]) -> String {
    let panels: String = jobs
        .iter()
        .map(|job| {
            format!(
                r#"
      <div class="c-content-panel">
        <a href="/jobs/detail">
          <h3 class="job_title">{}</h3>
        </a>
        <h5 class="job_cname">{}</h5>
        <h5 class="job_deadline">{}</h5>
      </div>"#,
                job.title, job.company, job.deadline
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html>
  <head><title>Ledige stillinger</title></head>
  <body>
    <section class="jobs">{}
    </section>
  </body>
</html>"#,
        panels
    )
}
