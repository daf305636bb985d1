//! Notify command: post the results summary to the chat webhook.

use crate::cli::NotifyArgs;
use crate::config::{self, CliOverrides};
use crate::error::Result;
use crate::notify::{NotifyOutcome, notify};
use serde_json::json;

/// Execute the notify command.
///
/// # Errors
///
/// Returns an error if the webhook rejects the message or cannot be reached.
pub fn execute(args: &NotifyArgs, json: bool, cli: &CliOverrides) -> Result<()> {
    let cli = CliOverrides {
        webhook_url: args.webhook_url.clone().or_else(|| cli.webhook_url.clone()),
        ..cli.clone()
    };
    let settings = config::load_settings(&cli)?;
    let outcome = notify(&settings)?;
    print_outcome(outcome, json)
}

pub(crate) fn print_outcome(outcome: NotifyOutcome, json: bool) -> Result<()> {
    if json {
        return super::print_json(&json!({ "notification": outcome }));
    }
    match outcome {
        NotifyOutcome::Sent => println!("Notification sent"),
        NotifyOutcome::SkippedNoWebhook => println!("Notification skipped: no webhook configured"),
        NotifyOutcome::SkippedNoSummary => println!("Notification skipped: no results summary"),
    }
    Ok(())
}
