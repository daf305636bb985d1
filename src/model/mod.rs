//! Core data types for `reportpub`.
//!
//! This module defines the fundamental types:
//! - `ResultsSummary`: normalized pass/fail/timeout/skip counts for one run
//! - `RunKey`: timestamp-derived identifier of one run
//! - `ReportIndexData`: the full publication history (key -> summary)
//! - `RunStatus`: the overall verdict derived from a summary

use crate::error::{PublishError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Normalized counts for a single test run.
///
/// `skipped` may be absent in older documents and then reads as 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResultsSummary {
    pub passed: u64,
    pub failed: u64,
    pub timed_out: u64,
    #[serde(default)]
    pub skipped: u64,
}

impl ResultsSummary {
    #[must_use]
    pub const fn new(passed: u64, failed: u64, timed_out: u64, skipped: u64) -> Self {
        Self {
            passed,
            failed,
            timed_out,
            skipped,
        }
    }

    /// Sum of all counted tests.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.passed + self.failed + self.timed_out + self.skipped
    }

    /// Overall verdict. Failures dominate timeouts, which dominate passes.
    #[must_use]
    pub const fn status(&self) -> RunStatus {
        if self.failed > 0 {
            RunStatus::Failed
        } else if self.timed_out > 0 {
            RunStatus::TimedOut
        } else if self.passed > 0 {
            RunStatus::Passed
        } else {
            RunStatus::NoData
        }
    }
}

impl fmt::Display for ResultsSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} passed, {} failed, {} timed out, {} skipped",
            self.passed, self.failed, self.timed_out, self.skipped
        )
    }
}

/// Overall verdict of a run, as shown on the index page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Passed,
    Failed,
    TimedOut,
    NoData,
}

impl RunStatus {
    /// CSS class used for this status on the index page.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Passed => "status-passed",
            Self::Failed => "status-failed",
            Self::TimedOut => "status-timeout",
            Self::NoData => "status-nodata",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
            Self::NoData => "no_data",
        }
    }
}

/// Identifier of one test run, normally `YYYY-MM-DD_HH-mm`.
///
/// Keys are compared as strings; the timestamp format makes that order
/// chronological. Keys are also used as directory names, so path separators
/// and dot-only names are rejected.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, JsonSchema)]
#[serde(transparent)]
pub struct RunKey(String);

impl<'de> Deserialize<'de> for RunKey {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

impl RunKey {
    /// Validate and wrap a key.
    ///
    /// # Errors
    ///
    /// Returns `InvalidRunKey` if the key is empty, `.`/`..`, or contains a path separator.
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty()
            || trimmed == "."
            || trimmed == ".."
            || trimmed.contains(['/', '\\'])
        {
            return Err(PublishError::InvalidRunKey { key });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Wrap a timestamp produced by the run key formatter.
    pub(crate) const fn from_formatted(key: String) -> Self {
        Self(key)
    }

    /// Recover the key from a run directory name, if it carries the prefix.
    #[must_use]
    pub fn from_dir_name(name: &str, prefix: &str) -> Option<Self> {
        name.strip_prefix(prefix)
            .and_then(|rest| Self::new(rest).ok())
    }

    /// Directory name used for this run, locally and in the index repository.
    #[must_use]
    pub fn dir_name(&self, prefix: &str) -> String {
        format!("{prefix}{}", self.0)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RunKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Full publication history: one summary per run key.
///
/// Serialized as a plain JSON object. Entries are only ever added or
/// overwritten for the same key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ReportIndexData {
    entries: BTreeMap<RunKey, ResultsSummary>,
}

impl ReportIndexData {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a metadata document.
    ///
    /// # Errors
    ///
    /// Returns a JSON error if the document is not an object of summaries.
    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Serialize as pretty-printed JSON with a trailing newline.
    ///
    /// # Errors
    ///
    /// Returns a JSON error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String> {
        let mut out = serde_json::to_string_pretty(self)?;
        out.push('\n');
        Ok(out)
    }

    /// Insert or overwrite the entry for `key`, returning the previous value.
    pub fn upsert(&mut self, key: RunKey, summary: ResultsSummary) -> Option<ResultsSummary> {
        self.entries.insert(key, summary)
    }

    #[must_use]
    pub fn get(&self, key: &RunKey) -> Option<&ResultsSummary> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &RunKey) -> bool {
        self.entries.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Re-key entries stored under a run directory name (`{prefix}{key}`)
    /// to the bare key. An entry already present under the bare key wins.
    ///
    /// Returns the number of entries re-keyed.
    pub fn strip_dir_prefix(&mut self, prefix: &str) -> usize {
        if prefix.is_empty() {
            return 0;
        }
        let prefixed: Vec<RunKey> = self
            .entries
            .keys()
            .filter(|key| key.as_str().starts_with(prefix))
            .cloned()
            .collect();

        let mut rekeyed = 0;
        for old in prefixed {
            let Some(bare) = RunKey::from_dir_name(old.as_str(), prefix) else {
                continue;
            };
            if let Some(summary) = self.entries.remove(&old) {
                self.entries.entry(bare).or_insert(summary);
                rekeyed += 1;
            }
        }
        rekeyed
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RunKey, &ResultsSummary)> {
        self.entries.iter()
    }
}
