//! Publish command: merge the current run into the index branch.

use crate::cli::PublishArgs;
use crate::config::{self, CliOverrides};
use crate::error::Result;
use crate::model::RunKey;
use crate::publish::{PublishOptions, PublishOutcome, publish};

/// Execute the publish command.
///
/// # Errors
///
/// Returns input errors before the remote is touched, and clone, commit or
/// push errors after the scratch checkout has been removed.
pub fn execute(args: &PublishArgs, json: bool, cli: &CliOverrides) -> Result<()> {
    let cli = CliOverrides {
        repo_url: args.repo_url.clone().or_else(|| cli.repo_url.clone()),
        branch: args.branch.clone().or_else(|| cli.branch.clone()),
        ..cli.clone()
    };
    let settings = config::load_settings(&cli)?;
    let options = PublishOptions {
        key: args.key.as_deref().map(RunKey::new).transpose()?,
    };

    let outcome = publish(&settings, &options)?;
    print_outcome(&outcome, &settings.branch, json)
}

pub(crate) fn print_outcome(outcome: &PublishOutcome, branch: &str, json: bool) -> Result<()> {
    if json {
        return super::print_json(outcome);
    }
    if outcome.committed {
        println!("Published {} to {branch}", outcome.run_dir);
    } else {
        println!("{} already published to {branch}; nothing to commit", outcome.run_dir);
    }
    if outcome.created_branch {
        println!("Created branch {branch}");
    }
    for run in &outcome.backfilled {
        println!("Backfilled {run}");
    }
    println!("History: {} run(s)", outcome.entries);
    Ok(())
}
