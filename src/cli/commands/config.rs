//! Config command: show the resolved configuration.

use crate::cli::ConfigArgs;
use crate::config::{self, CliOverrides, keys};
use crate::error::{PublishError, Result};
use serde_json::json;

/// Execute the config command.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded, or `--get` names an
/// unknown key.
pub fn execute(args: &ConfigArgs, json: bool, cli: &CliOverrides) -> Result<()> {
    let settings = config::load_settings(cli)?;
    let values = settings.to_display_map();

    if let Some(key) = &args.get {
        let normalized = key.trim().to_lowercase().replace('_', "-");
        let Some(value) = values.get(normalized.as_str()) else {
            return Err(PublishError::Config(format!(
                "Unknown config key '{key}'. Known keys: {}",
                keys::ALL.join(", ")
            )));
        };
        if json {
            return super::print_json(&json!({ "key": normalized, "value": value }));
        }
        println!("{value}");
        return Ok(());
    }

    if json {
        return super::print_json(&json!({
            "root": settings.root.display().to_string(),
            "values": values,
        }));
    }

    let width = values.keys().map(|k| k.len()).max().unwrap_or(0);
    for (key, value) in &values {
        println!("{key:<width$}  {value}");
    }
    Ok(())
}
