//! Timestamp command: generate or show the persisted run key.

use crate::cli::TimestampArgs;
use crate::config::{self, CliOverrides};
use crate::error::Result;
use crate::util::{current_key, read_key, write_key};
use serde_json::json;
use tracing::info;

/// Execute the timestamp command.
///
/// # Errors
///
/// Returns an error if the key file cannot be written, or with `--show`, if
/// it does not exist.
pub fn execute(args: &TimestampArgs, json: bool, cli: &CliOverrides) -> Result<()> {
    let settings = config::load_settings(cli)?;
    let key = if args.show {
        read_key(&settings.timestamp_file)?
    } else {
        let key = current_key();
        write_key(&settings.timestamp_file, &key)?;
        info!(%key, path = %settings.timestamp_file.display(), "Timestamp created");
        key
    };

    if json {
        super::print_json(&json!({
            "key": key,
            "path": settings.timestamp_file.display().to_string(),
        }))?;
    } else {
        println!("{key}");
    }
    Ok(())
}
