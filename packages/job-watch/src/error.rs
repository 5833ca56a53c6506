//! Typed errors for the job watcher.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so the run driver can
//! decide per failure kind whether to abort or carry on.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a watch run.
#[derive(Debug, Error)]
pub enum WatchError {
    /// Listing page could not be fetched at the transport level
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Listing markup did not have the expected shape
    #[error("extraction failed: {0}")]
    Extract(#[from] ExtractError),

    /// History file could not be read or written
    #[error("history error: {0}")]
    History(#[from] HistoryError),

    /// Configuration could not be loaded
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Transport-level fetch failures.
///
/// A non-200 status is not an error; see [`crate::fetcher::FetchOutcome`].
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Request failed (DNS, connect, timeout, reset)
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Response body could not be read
    #[error("failed to read body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Markup-shape errors raised while extracting listings.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// A CSS selector failed to parse
    #[error("invalid selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },

    /// A listing panel is missing one of its labeled sub-elements
    #[error("listing panel {panel} has no {field} element")]
    MissingField { panel: usize, field: &'static str },
}

/// History store failures.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Reading or writing the history file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The history file is not a JSON array of job records
    #[error("malformed history in {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Records could not be serialized
    #[error("failed to serialize history: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Digest delivery failures.
///
/// These never abort a run; the notifier renders them into a failed delivery.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Configured address is not a valid mailbox
    #[error("invalid mailbox {address:?}: {source}")]
    InvalidMailbox {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    /// Message could not be assembled
    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    /// SMTP session failed
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

impl NotifyError {
    /// True when the server rejected the login (reply code 535).
    pub fn is_auth_rejected(&self) -> bool {
        match self {
            NotifyError::Smtp(e) => is_auth_rejection(e.status()),
            _ => false,
        }
    }
}

/// Whether an SMTP reply code means the credentials were refused.
pub fn is_auth_rejection(code: Option<lettre::transport::smtp::response::Code>) -> bool {
    code.is_some_and(|code| code.to_string() == "535")
}

/// Configuration errors raised at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required variable is unset
    #[error("{0} must be set")]
    Missing(&'static str),

    /// Variable is set but unusable
    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Result type alias for watch runs.
pub type Result<T> = std::result::Result<T, WatchError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for extraction.
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;

/// Result type alias for history operations.
pub type HistoryResult<T> = std::result::Result<T, HistoryError>;

/// Result type alias for digest delivery.
pub type NotifyResult<T> = std::result::Result<T, NotifyError>;

/// Result type alias for configuration loading.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
