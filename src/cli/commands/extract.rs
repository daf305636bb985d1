//! Extract command: reduce the latest run to a results summary.

use crate::config::{self, CliOverrides};
use crate::error::Result;
use crate::extract::extract_latest;

/// Execute the extract command.
///
/// # Errors
///
/// Returns an error if the artifacts root is missing or holds no runs, or
/// the summary file cannot be written.
pub fn execute(json: bool, cli: &CliOverrides) -> Result<()> {
    let settings = config::load_settings(cli)?;
    let extraction = extract_latest(&settings)?;

    if json {
        super::print_json(&extraction)?;
    } else {
        println!(
            "{}: {} (from {})",
            extraction.run,
            extraction.summary,
            extraction.strategy.as_str()
        );
    }
    Ok(())
}
