//! Pipeline command: every step from key generation to notification.

use crate::cli::PipelineArgs;
use crate::config::{self, CliOverrides};
use crate::error::Result;
use crate::extract::extract_run;
use crate::notify::notify;
use crate::publish::{PublishOptions, publish};
use crate::runner::run_tests;
use crate::store::RunStore;
use crate::util::{current_key, write_key};
use serde_json::json;
use tracing::info;

/// Execute the pipeline command.
///
/// The run directory created by the test step is the one extracted and
/// published, even if another directory was modified later.
///
/// # Errors
///
/// Stops at the first failing step and returns its error.
pub fn execute(args: &PipelineArgs, json: bool, cli: &CliOverrides) -> Result<()> {
    let cli = CliOverrides {
        repo_url: args.repo_url.clone().or_else(|| cli.repo_url.clone()),
        branch: args.branch.clone().or_else(|| cli.branch.clone()),
        ..cli.clone()
    };
    let settings = config::load_settings(&cli)?;

    let key = current_key();
    write_key(&settings.timestamp_file, &key)?;
    info!(%key, "Starting pipeline");

    let run = run_tests(&settings, &args.command)?;

    let store = RunStore::new(
        &settings.artifacts_dir,
        &settings.run_prefix,
        &settings.artifacts_marker,
    );
    let run_dir = store.get(&run.key)?;
    let extraction = extract_run(&settings, &run_dir)?;

    let options = PublishOptions {
        key: Some(run.key.clone()),
    };
    let published = publish(&settings, &options)?;

    let notification = if args.skip_notify {
        info!("Skipping notification");
        None
    } else {
        Some(notify(&settings)?)
    };

    if json {
        return super::print_json(&json!({
            "run": run,
            "extraction": extraction,
            "publish": published,
            "notification": notification,
        }));
    }

    println!(
        "Run {}: {} (tests {})",
        run.key,
        extraction.summary,
        if run.tests_passed { "passed" } else { "failed" }
    );
    super::publish::print_outcome(&published, &settings.branch, false)?;
    if let Some(outcome) = notification {
        super::notify::print_outcome(outcome, false)?;
    }
    Ok(())
}
