//! Chat webhook notification.
//!
//! Sends a plain-text summary of the latest run with a link to the index
//! page. A missing webhook or summary skips the notification.

use crate::config::Settings;
use crate::error::{PublishError, Result};
use crate::extract::read_summary;
use crate::model::ResultsSummary;
use reqwest::blocking::Client;
use serde::Serialize;
use std::fmt::Write as _;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Webhook payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub text: String,
}

/// What `notify` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifyOutcome {
    Sent,
    SkippedNoWebhook,
    SkippedNoSummary,
}

/// Link to the published index page, if a base URL is configured.
#[must_use]
pub fn report_link(base_url: Option<&str>, index_file: &str) -> Option<String> {
    base_url.map(|base| format!("{}/{index_file}", base.trim_end_matches('/')))
}

/// Build the message text for `summary`.
#[must_use]
pub fn build_message(summary: &ResultsSummary, link: Option<&str>) -> Notification {
    let mut text = String::from("*Test Results*\n");
    let _ = writeln!(text, "Status: {}", summary.status().as_str());
    let _ = writeln!(text, "Passed: {}", summary.passed);
    let _ = writeln!(text, "Failed: {}", summary.failed);
    let _ = writeln!(text, "Timed out: {}", summary.timed_out);
    if summary.skipped > 0 {
        let _ = writeln!(text, "Skipped: {}", summary.skipped);
    }
    if let Some(link) = link {
        let _ = write!(text, "View detailed report: {link}");
    }
    Notification {
        text: text.trim_end().to_string(),
    }
}

/// POST `message` to `webhook_url`.
///
/// # Errors
///
/// Returns `Http` for transport failures and `NotifyFailed` for a non-2xx
/// response.
pub fn send(webhook_url: &str, message: &Notification) -> Result<()> {
    let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
    let response = client.post(webhook_url).json(message).send()?;
    let status = response.status();
    if status.is_success() {
        tracing::info!(status = status.as_u16(), "Notification sent");
        return Ok(());
    }
    let body = response.text().unwrap_or_default();
    Err(PublishError::NotifyFailed {
        status: status.as_u16(),
        body,
    })
}

/// Notify the configured webhook about the persisted summary.
///
/// # Errors
///
/// Returns the errors of [`send`], and `SummaryParse` if the summary file
/// exists but is malformed.
pub fn notify(settings: &Settings) -> Result<NotifyOutcome> {
    let Some(webhook) = settings.webhook_url.as_deref() else {
        tracing::warn!("No webhook URL configured; skipping notification");
        return Ok(NotifyOutcome::SkippedNoWebhook);
    };
    let summary = match read_summary(&settings.summary_file) {
        Ok(summary) => summary,
        Err(PublishError::SummaryMissing { path }) => {
            tracing::warn!(path = %path.display(), "No results summary; skipping notification");
            return Ok(NotifyOutcome::SkippedNoSummary);
        }
        Err(err) => return Err(err),
    };

    let link = report_link(settings.report_base_url.as_deref(), &settings.index_file);
    if link.is_none() {
        tracing::debug!("No report base URL configured; message will carry no link");
    }
    send(webhook, &build_message(&summary, link.as_deref()))?;
    Ok(NotifyOutcome::Sent)
}
