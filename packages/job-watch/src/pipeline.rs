//! Run driver: fetch, extract, diff, classify, notify, persist.
//!
//! ```text
//! fetch ──► non-200? ──► SourceUnavailable (no email, no write)
//!   │
//!   ▼
//! extract ──► load history ──► new_listings + approaching
//!   │
//!   ├─► both empty ──► NothingNew
//!   ▼
//! notify ──► append new listings to history ──► Completed
//! ```
//!
//! History is written even when delivery fails, so a listing is never
//! reported as new twice.

use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use crate::classify::{approaching, new_listings};
use crate::error::Result;
use crate::extractor::Extractor;
use crate::fetcher::{FetchOutcome, PageFetcher};
use crate::history::HistoryStore;
use crate::notifier::Notifier;
use crate::types::{Delivery, Digest, RunOutcome, RunReport};

/// One configured watch run.
pub struct Pipeline<F, N> {
    fetcher: F,
    notifier: N,
    extractor: Extractor,
    history: HistoryStore,
    source_url: String,
    horizon_days: u32,
    persist: bool,
}

impl<F: PageFetcher, N: Notifier> Pipeline<F, N> {
    pub fn new(
        fetcher: F,
        notifier: N,
        extractor: Extractor,
        history: HistoryStore,
        source_url: impl Into<String>,
        horizon_days: u32,
    ) -> Self {
        Self {
            fetcher,
            notifier,
            extractor,
            history,
            source_url: source_url.into(),
            horizon_days,
            persist: true,
        }
    }

    /// Leave the history file untouched (dry runs).
    pub fn without_persistence(mut self) -> Self {
        self.persist = false;
        self
    }

    /// Run once using the local calendar date.
    pub async fn run(&self) -> Result<RunOutcome> {
        self.run_on(Local::now().date_naive()).await
    }

    /// Run once as if today were `today`.
    pub async fn run_on(&self, today: NaiveDate) -> Result<RunOutcome> {
        info!(url = %self.source_url, %today, "Checking for job listing updates");

        let html = match self.fetcher.fetch(&self.source_url).await? {
            FetchOutcome::Page(html) => html,
            FetchOutcome::Unavailable { status } => {
                warn!(status, "Source unavailable, skipping run");
                return Ok(RunOutcome::SourceUnavailable { status });
            }
        };

        let fresh = self.extractor.extract(&html)?;
        let mut history = self.history.load().await?;

        let digest = Digest {
            new_listings: new_listings(&fresh, &history),
            approaching: approaching(&fresh, today, self.horizon_days),
        };

        info!(
            fetched = fresh.len(),
            known = history.len(),
            new_listings = digest.new_listings.len(),
            approaching = digest.approaching.len(),
            "Compared listings against history"
        );

        if digest.is_empty() {
            info!("No new job listings found.");
            return Ok(RunOutcome::NothingNew {
                fetched: fresh.len(),
            });
        }

        let delivery = self.notifier.notify(&digest).await;
        if let Delivery::Failed { reason } = &delivery {
            warn!(error = %reason, "Digest not delivered, recording listings as seen anyway");
        }

        let history_written = self.persist && !digest.new_listings.is_empty();
        if history_written {
            self.history
                .append(&mut history, &digest.new_listings)
                .await?;
        }

        Ok(RunOutcome::Completed(RunReport {
            fetched: fresh.len(),
            new_listings: digest.new_listings,
            approaching: digest.approaching,
            delivery,
            history_written,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WatchError;
    use crate::extractor::ListingSelectors;
    use crate::testing::{listing_page, MockFetcher, MockNotifier};
    use crate::types::JobRecord;
    use tempfile::TempDir;

    const URL: &str = "https://jobs.example.com/jobs";

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 10).unwrap()
    }

    fn pipeline(
        dir: &TempDir,
        fetcher: MockFetcher,
        notifier: MockNotifier,
    ) -> Pipeline<MockFetcher, MockNotifier> {
        Pipeline::new(
            fetcher,
            notifier,
            Extractor::new(&ListingSelectors::default()).unwrap(),
            HistoryStore::new(dir.path().join("old_jobs.json")),
            URL,
            3,
        )
    }

    #[tokio::test]
    async fn test_fetches_configured_url() {
        let dir = TempDir::new().unwrap();
        let fetcher = MockFetcher::page(listing_page(&[]));
        let pipeline = pipeline(&dir, fetcher.clone(), MockNotifier::new());

        pipeline.run_on(today()).await.unwrap();
        assert_eq!(fetcher.calls(), vec![URL.to_string()]);
    }

    #[tokio::test]
    async fn test_empty_page_is_nothing_new() {
        let dir = TempDir::new().unwrap();
        let notifier = MockNotifier::new();
        let pipeline = pipeline(&dir, MockFetcher::page(listing_page(&[])), notifier.clone());

        let outcome = pipeline.run_on(today()).await.unwrap();
        assert_eq!(outcome, RunOutcome::NothingNew { fetched: 0 });
        assert_eq!(notifier.call_count(), 0);
        assert!(!dir.path().join("old_jobs.json").exists());
    }

    #[tokio::test]
    async fn test_transport_error_aborts() {
        let dir = TempDir::new().unwrap();
        let notifier = MockNotifier::new();
        let pipeline = pipeline(&dir, MockFetcher::transport_error(), notifier.clone());

        let err = pipeline.run_on(today()).await.unwrap_err();
        assert!(matches!(err, WatchError::Fetch(_)));
        assert_eq!(notifier.call_count(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_history_aborts_before_notifying() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("old_jobs.json"), "not json").unwrap();
        let notifier = MockNotifier::new();
        let page = listing_page(&[JobRecord::new("Acme", "Engineer", "2024-05-01")]);
        let pipeline = pipeline(&dir, MockFetcher::page(page), notifier.clone());

        let err = pipeline.run_on(today()).await.unwrap_err();
        assert!(matches!(err, WatchError::History(_)));
        assert_eq!(notifier.call_count(), 0);
        assert_eq!(
            std::fs::read_to_string(dir.path().join("old_jobs.json")).unwrap(),
            "not json"
        );
    }

    #[tokio::test]
    async fn test_approaching_only_does_not_rewrite_history() {
        let dir = TempDir::new().unwrap();
        let soon = JobRecord::new("Acme", "Engineer", "2024-03-11");
        let store = HistoryStore::new(dir.path().join("old_jobs.json"));
        store.save(&[soon.clone()]).await.unwrap();
        let before = std::fs::metadata(store.path()).unwrap().modified().unwrap();

        let notifier = MockNotifier::new();
        let pipeline = pipeline(&dir, MockFetcher::page(listing_page(&[soon.clone()])), notifier.clone());

        match pipeline.run_on(today()).await.unwrap() {
            RunOutcome::Completed(report) => {
                assert!(report.new_listings.is_empty());
                assert_eq!(report.approaching, vec![soon]);
                assert!(!report.history_written);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        let after = std::fs::metadata(store.path()).unwrap().modified().unwrap();
        assert_eq!(before, after);
        assert_eq!(notifier.call_count(), 1);
    }

    #[tokio::test]
    async fn test_dry_run_skips_persistence() {
        let dir = TempDir::new().unwrap();
        let page = listing_page(&[JobRecord::new("Acme", "Engineer", "2024-05-01")]);
        let pipeline =
            pipeline(&dir, MockFetcher::page(page), MockNotifier::new()).without_persistence();

        match pipeline.run_on(today()).await.unwrap() {
            RunOutcome::Completed(report) => {
                assert_eq!(report.new_listings.len(), 1);
                assert!(!report.history_written);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert!(!dir.path().join("old_jobs.json").exists());
    }
}
