//! Email digest rendering and delivery.
//!
//! Delivery failures never abort a run: they are logged and reported back as
//! [`Delivery::Failed`] so the driver can still persist history.

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{error, info};

use crate::config::SmtpConfig;
use crate::error::{NotifyError, NotifyResult};
use crate::types::{Delivery, Digest, JobRecord};

pub const SUBJECT: &str = "New Job Listings";

/// Sink for run digests.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, digest: &Digest) -> Delivery;
}

/// Render the digest as a standalone HTML document.
pub fn render_digest(digest: &Digest) -> String {
    let mut html = String::from(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <title>New Job Listings</title>
  </head>
  <body>
    <h2>New Job Listings</h2>
"#,
    );

    if digest.new_listings.is_empty() {
        html.push_str("    <p>No new listings since the last run.</p>\n");
    } else {
        push_list(&mut html, &digest.new_listings);
    }

    if !digest.approaching.is_empty() {
        html.push_str("    <h2>Approaching Deadlines</h2>\n");
        push_list(&mut html, &digest.approaching);
    }

    html.push_str("  </body>\n</html>\n");
    html
}

fn push_list(html: &mut String, jobs: &[JobRecord]) {
    html.push_str("    <ul>\n");
    for job in jobs {
        html.push_str(&format!(
            "      <li><strong>{}</strong> at {} - Deadline: {}</li>\n",
            escape_html(&job.title),
            escape_html(&job.company),
            escape_html(&job.deadline),
        ));
    }
    html.push_str("    </ul>\n");
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Sends the digest to the configured mailbox over SMTP with STARTTLS.
pub struct SmtpNotifier {
    config: SmtpConfig,
}

impl SmtpNotifier {
    pub fn new(config: SmtpConfig) -> Self {
        Self { config }
    }

    /// Build the self-addressed message for `digest`.
    pub fn build_message(&self, digest: &Digest) -> NotifyResult<Message> {
        let address = &self.config.credentials.address;
        let mailbox: Mailbox = address
            .parse()
            .map_err(|source| NotifyError::InvalidMailbox {
                address: address.clone(),
                source,
            })?;

        let message = Message::builder()
            .from(mailbox.clone())
            .to(mailbox)
            .subject(SUBJECT)
            .multipart(MultiPart::mixed().singlepart(SinglePart::html(render_digest(digest))))?;
        Ok(message)
    }

    async fn send(&self, message: Message) -> NotifyResult<()> {
        let creds = Credentials::new(
            self.config.credentials.address.clone(),
            self.config.credentials.password().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.host)?
            .port(self.config.port)
            .credentials(creds)
            .build();

        mailer.send(message).await?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, digest: &Digest) -> Delivery {
        let result = match self.build_message(digest) {
            Ok(message) => self.send(message).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(()) => {
                info!(
                    new_listings = digest.new_listings.len(),
                    approaching = digest.approaching.len(),
                    "Email sent successfully."
                );
                Delivery::Sent
            }
            Err(e) => {
                error!(error = %e, "Failed to send email");
                if e.is_auth_rejected() {
                    error!("Check your email address and app password.");
                }
                Delivery::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// Logs the rendered digest instead of sending it.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, digest: &Digest) -> Delivery {
        info!(
            new_listings = digest.new_listings.len(),
            approaching = digest.approaching.len(),
            "Dry run, email not sent"
        );
        info!("{}", render_digest(digest));
        Delivery::Skipped
    }
}
