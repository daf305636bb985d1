//! List command: local run directories with their summaries.

use crate::cli::ListArgs;
use crate::config::{self, CliOverrides};
use crate::error::Result;
use crate::model::{ResultsSummary, RunKey, RunStatus};
use chrono::{DateTime, Local};
use crossterm::style::Stylize;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct RunListing {
    key: RunKey,
    name: String,
    modified: DateTime<Local>,
    status: RunStatus,
    summary: Option<ResultsSummary>,
}

/// Execute the list command.
///
/// # Errors
///
/// Returns an error if the artifacts root is missing or cannot be read.
pub fn execute(args: &ListArgs, json: bool, cli: &CliOverrides) -> Result<()> {
    let settings = config::load_settings(cli)?;
    let store = crate::store::RunStore::new(
        &settings.artifacts_dir,
        &settings.run_prefix,
        &settings.artifacts_marker,
    );

    let runs: Vec<RunListing> = store
        .scan()?
        .into_iter()
        .take(args.limit.unwrap_or(usize::MAX))
        .map(|run| {
            let summary = run.read_summary(&settings.results_file);
            RunListing {
                status: summary.as_ref().map_or(RunStatus::NoData, ResultsSummary::status),
                modified: DateTime::<Local>::from(run.modified),
                key: run.key,
                name: run.name,
                summary,
            }
        })
        .collect();

    if json {
        return super::print_json(&runs);
    }

    if runs.is_empty() {
        println!("No runs in {}", store.root().display());
        return Ok(());
    }

    let use_color = config::should_use_color(cli);
    for run in &runs {
        let status = render_status(run.status, use_color);
        let summary = run
            .summary
            .map_or_else(|| "no data".to_string(), |s| s.to_string());
        println!(
            "{status} {}  {}  {summary}",
            run.key,
            run.modified.format("%Y-%m-%d %H:%M:%S")
        );
    }
    Ok(())
}

fn render_status(status: RunStatus, use_color: bool) -> String {
    let label = format!("{:<9}", status.as_str());
    if !use_color {
        return label;
    }
    match status {
        RunStatus::Passed => label.green().to_string(),
        RunStatus::Failed => label.red().to_string(),
        RunStatus::TimedOut => label.yellow().to_string(),
        RunStatus::NoData => label.dim().to_string(),
    }
}
