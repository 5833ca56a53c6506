use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

use crate::credentials::MailCredentials;
use crate::error::{ConfigError, ConfigResult};

pub const DEFAULT_SOURCE_URL: &str = "https://www.bindeleddet.no/jobs";
pub const DEFAULT_HISTORY_PATH: &str = "old_jobs.json";
pub const DEFAULT_DEADLINE_HORIZON_DAYS: u32 = 3;
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// SMTP relay settings.
#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    /// Submission port; the connection is upgraded with STARTTLS.
    pub port: u16,
    pub credentials: MailCredentials,
}

/// Run configuration, built once at startup and passed to each component.
#[derive(Debug, Clone)]
pub struct Config {
    pub source_url: Url,
    pub history_path: PathBuf,
    pub deadline_horizon_days: u32,
    pub http_timeout: Duration,
    pub smtp: SmtpConfig,
    /// Rotating log file; stdout when unset.
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> ConfigResult<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// The mailbox address comes from `EMAIL_ADDRESS`, or from
    /// `EMAIL_ADDRESS_USER` and `EMAIL_ADDRESS_DOMAIN` joined with `@`.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let address = match var("EMAIL_ADDRESS") {
            Some(address) => address,
            None => {
                let user = var("EMAIL_ADDRESS_USER").ok_or(ConfigError::Missing(
                    "EMAIL_ADDRESS or EMAIL_ADDRESS_USER",
                ))?;
                let domain =
                    var("EMAIL_ADDRESS_DOMAIN").ok_or(ConfigError::Missing("EMAIL_ADDRESS_DOMAIN"))?;
                format!("{}@{}", user.trim(), domain.trim())
            }
        };
        let address = address.trim().to_string();
        if !address.contains('@') {
            return Err(ConfigError::Invalid {
                name: "EMAIL_ADDRESS",
                reason: format!("{:?} is not an email address", address),
            });
        }

        let app_password =
            var("EMAIL_APP_PASSWORD").ok_or(ConfigError::Missing("EMAIL_APP_PASSWORD"))?;

        let source_url = var("JOB_WATCH_SOURCE_URL").unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string());
        let source_url = Url::parse(&source_url).map_err(|e| ConfigError::Invalid {
            name: "JOB_WATCH_SOURCE_URL",
            reason: e.to_string(),
        })?;

        let deadline_horizon_days = parse_or(
            var("JOB_WATCH_DEADLINE_HORIZON_DAYS"),
            "JOB_WATCH_DEADLINE_HORIZON_DAYS",
            DEFAULT_DEADLINE_HORIZON_DAYS,
        )?;
        let http_timeout_secs = parse_or(
            var("JOB_WATCH_HTTP_TIMEOUT_SECS"),
            "JOB_WATCH_HTTP_TIMEOUT_SECS",
            DEFAULT_HTTP_TIMEOUT_SECS,
        )?;
        let smtp_port = parse_or(var("SMTP_PORT"), "SMTP_PORT", DEFAULT_SMTP_PORT)?;

        Ok(Self {
            source_url,
            history_path: var("JOB_WATCH_HISTORY_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_HISTORY_PATH)),
            deadline_horizon_days,
            http_timeout: Duration::from_secs(http_timeout_secs),
            smtp: SmtpConfig {
                host: var("SMTP_HOST").unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
                port: smtp_port,
                credentials: MailCredentials::new(address, app_password),
            },
            log_file: var("JOB_WATCH_LOG_FILE").map(PathBuf::from),
        })
    }
}

fn parse_or<T>(value: Option<String>, name: &'static str, default: T) -> ConfigResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}
