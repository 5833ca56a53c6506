// Entry point for a single watch run

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use job_watch::extractor::{Extractor, ListingSelectors};
use job_watch::{
    logging, Config, HistoryStore, HttpFetcher, LogNotifier, Notifier, Pipeline, RunOutcome,
    SmtpNotifier,
};

#[derive(Parser)]
#[command(name = "job-watch")]
#[command(about = "Email a digest of new and closing job listings", long_about = None)]
struct Cli {
    /// Log the digest instead of emailing it and leave history untouched
    #[arg(long)]
    dry_run: bool,

    /// History file (overrides JOB_WATCH_HISTORY_PATH)
    #[arg(long, value_name = "PATH")]
    history: Option<PathBuf>,

    /// Rotating log file (overrides JOB_WATCH_LOG_FILE)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(path) = cli.history {
        config.history_path = path;
    }
    if let Some(path) = cli.log_file {
        config.log_file = Some(path);
    }

    logging::init(config.log_file.as_deref()).context("Failed to open log file")?;
    tracing::debug!(
        source = %config.source_url,
        history = %config.history_path.display(),
        horizon_days = config.deadline_horizon_days,
        "Configuration loaded"
    );

    if cli.dry_run {
        execute(&config, LogNotifier, false).await
    } else {
        execute(&config, SmtpNotifier::new(config.smtp.clone()), true).await
    }
}

async fn execute<N: Notifier>(config: &Config, notifier: N, persist: bool) -> Result<()> {
    let fetcher = HttpFetcher::new(config.http_timeout).context("Failed to create HTTP client")?;
    let extractor = Extractor::new(&ListingSelectors::default())?;

    let mut pipeline = Pipeline::new(
        fetcher,
        notifier,
        extractor,
        HistoryStore::new(&config.history_path),
        config.source_url.as_str(),
        config.deadline_horizon_days,
    );
    if !persist {
        pipeline = pipeline.without_persistence();
    }

    match pipeline.run().await.context("Watch run failed")? {
        RunOutcome::SourceUnavailable { status } => {
            tracing::info!(status, "Run ended early, source unavailable");
        }
        RunOutcome::NothingNew { fetched } => {
            tracing::info!(fetched, "Run complete, nothing to report");
        }
        RunOutcome::Completed(report) => {
            tracing::info!(
                fetched = report.fetched,
                new_listings = report.new_listings.len(),
                approaching = report.approaching.len(),
                delivered = report.delivery.is_sent(),
                history_written = report.history_written,
                "Run complete"
            );
        }
    }

    Ok(())
}
