//! Job board watcher.
//!
//! Scrapes a job-listing page, diffs the postings against a JSON history of
//! everything seen before, flags postings whose deadline is close, and emails
//! a digest to the configured mailbox. One invocation is one run; schedule it
//! externally (cron, CI timer).
//!
//! # Usage
//!
//! ```rust,ignore
//! use job_watch::{Config, HttpFetcher, SmtpNotifier, Pipeline, HistoryStore};
//! use job_watch::extractor::{Extractor, ListingSelectors};
//!
//! let config = Config::from_env()?;
//! let pipeline = Pipeline::new(
//!     HttpFetcher::new(config.http_timeout)?,
//!     SmtpNotifier::new(config.smtp.clone()),
//!     Extractor::new(&ListingSelectors::default())?,
//!     HistoryStore::new(&config.history_path),
//!     config.source_url.as_str(),
//!     config.deadline_horizon_days,
//! );
//! let outcome = pipeline.run().await?;
//! ```
//!
//! # Modules
//!
//! - [`fetcher`] - HTTP fetch of the listing page
//! - [`extractor`] - Listing panels to [`JobRecord`]s
//! - [`history`] - JSON file of previously seen records
//! - [`classify`] - Novelty filter and deadline window
//! - [`notifier`] - HTML digest and SMTP delivery
//! - [`pipeline`] - The run driver
//! - [`testing`] - Mock fetcher and notifier

pub mod classify;
pub mod config;
pub mod credentials;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod history;
pub mod logging;
pub mod notifier;
pub mod pipeline;
pub mod testing;
pub mod types;

pub use config::{Config, SmtpConfig};
pub use error::{ConfigError, ExtractError, FetchError, HistoryError, NotifyError, WatchError};
pub use fetcher::{FetchOutcome, HttpFetcher, PageFetcher};
pub use history::HistoryStore;
pub use notifier::{LogNotifier, Notifier, SmtpNotifier};
pub use pipeline::Pipeline;
pub use types::{Delivery, Digest, JobRecord, RunOutcome, RunReport};
