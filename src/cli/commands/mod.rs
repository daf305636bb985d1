//! Command implementations.

pub mod completions;
pub mod config;
pub mod extract;
pub mod list;
pub mod notify;
pub mod pipeline;
pub mod publish;
pub mod run;
pub mod schema;
pub mod timestamp;
pub mod version;

use crate::error::Result;
use serde::Serialize;

/// Print `value` as pretty JSON on stdout.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
