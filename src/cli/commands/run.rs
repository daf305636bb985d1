//! Run command: execute the test suite into the current run directory.

use crate::cli::RunArgs;
use crate::config::{self, CliOverrides};
use crate::error::Result;
use crate::runner::run_tests;

/// Execute the run command.
///
/// A failing test suite still exits 0 so the report can be published.
///
/// # Errors
///
/// Returns an error if no run key exists or the command cannot be spawned.
pub fn execute(args: &RunArgs, json: bool, cli: &CliOverrides) -> Result<()> {
    let settings = config::load_settings(cli)?;
    let outcome = run_tests(&settings, &args.command)?;

    if json {
        super::print_json(&outcome)?;
    } else {
        let verdict = if outcome.tests_passed {
            "passed".to_string()
        } else {
            outcome
                .exit_code
                .map_or_else(|| "killed".to_string(), |code| format!("failed (exit {code})"))
        };
        println!("Run {}: tests {verdict}", outcome.key);
        println!("Report directory: {}", outcome.output_dir.display());
    }
    Ok(())
}
