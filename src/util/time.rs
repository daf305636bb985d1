//! Run key generation and persistence.
//!
//! A run key is the current local time rounded to the nearest five minutes
//! and formatted as `YYYY-MM-DD_HH-mm`. The key is written to a small text
//! file before the test run so that later steps recover the exact same key.

use crate::error::{PublishError, Result};
use crate::model::RunKey;
use chrono::{Duration, Local, NaiveDateTime, Timelike};
use std::fs;
use std::path::Path;

/// Format of a run key.
pub const RUN_KEY_FORMAT: &str = "%Y-%m-%d_%H-%M";

/// Rounding granularity in minutes.
const ROUND_MINUTES: u32 = 5;

/// Round `at` to the nearest five-minute mark (ties round up) and drop seconds.
///
/// Rounding past :55 carries into the next hour, and past midnight into the
/// next day.
#[must_use]
pub fn round_to_slot(at: NaiveDateTime) -> NaiveDateTime {
    let minute = at.minute();
    // Integer nearest-multiple with ties upward: floor((m + 2.5) / 5) * 5.
    let rounded = ((minute * 2 + ROUND_MINUTES) / (ROUND_MINUTES * 2)) * ROUND_MINUTES;
    let hour_start = at
        .with_minute(0)
        .and_then(|t| t.with_second(0))
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(at);
    hour_start + Duration::minutes(i64::from(rounded))
}

/// Build the run key for a given local time.
#[must_use]
pub fn round_to_key(at: NaiveDateTime) -> RunKey {
    RunKey::from_formatted(round_to_slot(at).format(RUN_KEY_FORMAT).to_string())
}

/// Run key for the current local time.
#[must_use]
pub fn current_key() -> RunKey {
    round_to_key(Local::now().naive_local())
}

/// Persist `key` to `path`, replacing any previous key.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_key(path: &Path, key: &RunKey) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, format!("{key}\n"))?;
    tracing::debug!(path = %path.display(), %key, "Wrote run key");
    Ok(())
}

/// Read back a key written by [`write_key`].
///
/// # Errors
///
/// Returns `TimestampMissing` if the file does not exist and `InvalidRunKey`
/// if its content is not a usable key.
pub fn read_key(path: &Path) -> Result<RunKey> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(PublishError::TimestampMissing {
                path: path.to_path_buf(),
            });
        }
        Err(err) => return Err(err.into()),
    };
    RunKey::new(contents.trim())
}
