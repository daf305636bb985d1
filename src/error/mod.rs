//! Error types and handling for `reportpub`.
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Wraps lower-level errors with ad hoc context (`WithContext`)
//! - Provides recovery hints for user-facing errors
//! - Groups exit codes by failure category (input, remote, runner, notify, config, I/O)
//! - Provides structured JSON output for CI log scrapers

mod context;
mod structured;

pub use context::{OptionExt, ResultExt};
pub use structured::{ErrorCode, StructuredError};

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for `reportpub` operations.
#[derive(Error, Debug)]
pub enum PublishError {
    // === Input Errors ===
    /// The local artifacts root does not exist.
    #[error("Artifacts directory not found at '{path}'")]
    ArtifactsRootMissing { path: PathBuf },

    /// The current-run summary file does not exist.
    #[error("Run summary not found at '{path}'")]
    SummaryMissing { path: PathBuf },

    /// The current-run summary file exists but cannot be parsed.
    #[error("Run summary at '{path}' is invalid: {reason}")]
    SummaryParse { path: PathBuf, reason: String },

    /// The timestamp file has not been written yet.
    #[error("Timestamp file not found at '{path}'")]
    TimestampMissing { path: PathBuf },

    /// A run key is empty or contains path separators.
    #[error("Invalid run key: '{key}'")]
    InvalidRunKey { key: String },

    /// No run directories exist under the artifacts root.
    #[error("No report directories found under '{root}'")]
    NoRunDirectories { root: PathBuf },

    /// An explicitly requested run directory does not exist.
    #[error("Run directory not found: {path}")]
    RunNotFound { path: PathBuf },

    // === Remote Errors ===
    /// Cloning the index repository failed for a reason other than a missing branch.
    #[error("Failed to clone '{url}' (branch '{branch}'): {stderr}")]
    CloneFailed {
        url: String,
        branch: String,
        stderr: String,
    },

    /// A git command inside the publish workspace failed.
    #[error("git {operation} failed: {stderr}")]
    Git { operation: String, stderr: String },

    /// Pushing the index branch failed after a local commit.
    #[error("Failed to push branch '{branch}': {stderr}")]
    PushFailed { branch: String, stderr: String },

    // === Runner Errors ===
    /// The test command could not be started.
    #[error("Failed to run test command '{command}': {reason}")]
    TestCommand { command: String, reason: String },

    // === Notification Errors ===
    /// The chat webhook rejected the message.
    #[error("Notification failed with status {status}: {body}")]
    NotifyFailed { status: u16, body: String },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // === Configuration Errors ===
    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required setting has no value in any layer.
    #[error("Missing required setting '{key}'")]
    MissingSetting { key: String },

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // === Wrapped errors ===
    /// Error with additional context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl PublishError {
    /// Can the user fix this without code changes?
    #[must_use]
    pub const fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ArtifactsRootMissing { .. }
                | Self::SummaryMissing { .. }
                | Self::TimestampMissing { .. }
                | Self::NoRunDirectories { .. }
                | Self::RunNotFound { .. }
                | Self::MissingSetting { .. }
                | Self::InvalidRunKey { .. }
        )
    }

    /// Did the failure happen after the remote may have been touched?
    #[must_use]
    pub const fn is_remote_failure(&self) -> bool {
        matches!(
            self,
            Self::CloneFailed { .. } | Self::Git { .. } | Self::PushFailed { .. }
        )
    }

    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::ArtifactsRootMissing { .. } => Some("Run the test suite first: rpub run"),
            Self::SummaryMissing { .. } => Some("Extract the run summary first: rpub extract"),
            Self::TimestampMissing { .. } => Some("Generate a run key first: rpub timestamp"),
            Self::NoRunDirectories { .. } => {
                Some("Check that the test run wrote its report into the artifacts directory")
            }
            Self::MissingSetting { .. } => {
                Some("Set it in .rpub.yaml, via RPUB_<KEY>, or with the matching CLI flag")
            }
            Self::PushFailed { .. } => {
                Some("The local commit was discarded; re-run 'rpub publish' (it is idempotent)")
            }
            Self::CloneFailed { .. } => Some("Check the repository URL and your git credentials"),
            _ => None,
        }
    }

    /// Create a git failure for the given operation.
    #[must_use]
    pub fn git(operation: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::Git {
            operation: operation.into(),
            stderr: stderr.into(),
        }
    }

    /// Get the exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        StructuredError::from_error(self).code.exit_code()
    }
}

/// Result type using `PublishError`.
pub type Result<T> = std::result::Result<T, PublishError>;
