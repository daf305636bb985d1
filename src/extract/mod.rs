//! Results summary extraction.
//!
//! The test runner's output shape is not fixed, so the summary is produced by
//! an ordered list of strategies: the first one that yields a summary wins.

use crate::config::Settings;
use crate::error::{PublishError, Result};
use crate::model::ResultsSummary;
use crate::store::{RunDir, RunStore};
use crate::util::write_atomic;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::Path;

const PASSED_ALIASES: &[&str] = &["passed", "expected", "expectedCount"];
const FAILED_ALIASES: &[&str] = &["failed", "unexpected", "unexpectedCount"];
const TIMED_OUT_ALIASES: &[&str] = &["timedOut", "timeout", "timedOutCount"];
const SKIPPED_ALIASES: &[&str] = &["skipped", "skippedCount"];


/// One way of deriving a summary from a run directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractStrategy {
    /// The structured results document written by the reporter.
    StructuredDocument,
    /// Counts scraped from the rendered report page.
    MarkupScan,
    /// All zeros.
    Default,
}

impl ExtractStrategy {
    /// Strategies in order of preference.
    pub const CHAIN: [Self; 3] = [Self::StructuredDocument, Self::MarkupScan, Self::Default];

    /// Try this strategy against `run_dir`.
    ///
    /// # Errors
    ///
    /// Returns a config error if a markup pattern fails to compile.
    pub fn apply(
        self,
        run_dir: &Path,
        results_file: &str,
        index_file: &str,
    ) -> Result<Option<ResultsSummary>> {
        Ok(match self {
            Self::StructuredDocument => from_structured_file(&run_dir.join(results_file)),
            Self::MarkupScan => from_markup_file(&run_dir.join(index_file))?,
            Self::Default => Some(ResultsSummary::default()),
        })
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StructuredDocument => "structured_document",
            Self::MarkupScan => "markup_scan",
            Self::Default => "default",
        }
    }
}

/// Run the strategy chain; the final `Default` step always succeeds.
///
/// # Errors
///
/// Propagates [`ExtractStrategy::apply`] errors.
pub fn summarize_dir(
    run_dir: &Path,
    results_file: &str,
    index_file: &str,
) -> Result<(ResultsSummary, ExtractStrategy)> {
    for strategy in ExtractStrategy::CHAIN {
        if let Some(summary) = strategy.apply(run_dir, results_file, index_file)? {
            tracing::debug!(strategy = strategy.as_str(), %summary, "Extracted summary");
            return Ok((summary, strategy));
        }
    }
    Ok((ResultsSummary::default(), ExtractStrategy::Default))
}

/// Normalize a parsed results document.
///
/// A nested `stats` object takes precedence over the root. Returns `None`
/// if the document is not an object.
#[must_use]
pub fn summarize_value(raw: &Value) -> Option<ResultsSummary> {
    let root = raw.as_object()?;
    let stats = root
        .get("stats")
        .and_then(Value::as_object)
        .unwrap_or(root);

    let count = |aliases: &[&str]| {
        aliases
            .iter()
            .find_map(|alias| stats.get(*alias).and_then(Value::as_u64))
            .unwrap_or(0)
    };

    Some(ResultsSummary::new(
        count(PASSED_ALIASES),
        count(FAILED_ALIASES),
        count(TIMED_OUT_ALIASES),
        count(SKIPPED_ALIASES),
    ))
}

/// Scrape counts from report markup. `None` when no status word is present.
///
/// # Errors
///
/// Returns a config error if a count pattern fails to compile.
pub fn summarize_markup(html: &str) -> Result<Option<ResultsSummary>> {
    let passed = count_before(html, "passed")?;
    let failed = count_before(html, "failed")?;
    let skipped = count_before(html, "skipped")?;
    if passed.is_none() && failed.is_none() && skipped.is_none() {
        return Ok(None);
    }

    Ok(Some(ResultsSummary::new(
        passed.unwrap_or(0),
        failed.unwrap_or(0),
        0,
        skipped.unwrap_or(0),
    )))
}

/// First `<digits> <word>` count in `html`, matched case-insensitively.
fn count_before(html: &str, word: &str) -> Result<Option<u64>> {
    let pattern = format!(r"(?i)(\d+)\s*{}", regex::escape(word));
    let re = Regex::new(&pattern)
        .map_err(|e| PublishError::Config(format!("Invalid regex pattern: {e}")))?;
    Ok(re
        .captures(html)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok()))
}

fn from_structured_file(path: &Path) -> Option<ResultsSummary> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "No structured results document");
            return None;
        }
    };
    let raw: Value = match serde_json::from_str(&contents) {
        Ok(raw) => raw,
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "Malformed structured results document");
            return None;
        }
    };
    summarize_value(&raw)
}

fn from_markup_file(path: &Path) -> Result<Option<ResultsSummary>> {
    let Ok(html) = fs::read_to_string(path) else {
        return Ok(None);
    };
    summarize_markup(&html)
}

/// Result of one extraction.
#[derive(Debug, Clone, Serialize)]
pub struct Extraction {
    pub run: String,
    pub summary: ResultsSummary,
    pub strategy: ExtractStrategy,
}

/// Extract the latest run's summary and persist it to the summary file.
///
/// # Errors
///
/// Fails if the artifacts root is missing, holds no run directory, or the
/// summary file cannot be written.
pub fn extract_latest(settings: &Settings) -> Result<Extraction> {
    let store = RunStore::new(
        &settings.artifacts_dir,
        &settings.run_prefix,
        &settings.artifacts_marker,
    );
    let run = store.latest()?;
    tracing::info!(run = %run.name, "Using latest report directory");
    extract_run(settings, &run)
}

/// Extract `run`'s summary and persist it to the summary file.
///
/// # Errors
///
/// Fails if the summary file cannot be written.
pub fn extract_run(settings: &Settings, run: &RunDir) -> Result<Extraction> {
    let (summary, strategy) =
        summarize_dir(&run.path, &settings.results_file, &settings.index_file)?;
    write_summary(&settings.summary_file, &summary)?;
    tracing::info!(
        path = %settings.summary_file.display(),
        strategy = strategy.as_str(),
        %summary,
        "Saved results summary"
    );
    Ok(Extraction {
        run: run.name.clone(),
        summary,
        strategy,
    })
}

/// Write `summary` as pretty JSON, replacing any previous file.
///
/// # Errors
///
/// Returns an error if serialization or the write fails.
pub fn write_summary(path: &Path, summary: &ResultsSummary) -> Result<()> {
    let mut json = serde_json::to_string_pretty(summary)?;
    json.push('\n');
    write_atomic(path, json.as_bytes())
}

/// Read the hand-off summary file.
///
/// # Errors
///
/// Returns `SummaryMissing` if the file does not exist and `SummaryParse`
/// if it is not a valid summary.
pub fn read_summary(path: &Path) -> Result<ResultsSummary> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(PublishError::SummaryMissing {
                path: path.to_path_buf(),
            });
        }
        Err(err) => return Err(err.into()),
    };
    serde_json::from_str(&contents).map_err(|err| PublishError::SummaryParse {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}
