//! Structured error output for CI logs and wrapping scripts.
//!
//! Provides machine-parseable error information with:
//! - Error codes for categorization
//! - Hints for self-correction
//! - Retryability flags
//! - Context for debugging

#![allow(clippy::option_if_let_else)]

use crate::error::PublishError;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Machine-readable error codes.
///
/// These codes are stable and can be used for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // === Input Errors (exit code 2) ===
    /// Artifacts root directory missing
    ArtifactsRootMissing,
    /// Current-run summary missing
    SummaryMissing,
    /// Current-run summary unparsable
    SummaryInvalid,
    /// Timestamp file missing
    TimestampMissing,
    /// Run key empty or malformed
    InvalidRunKey,
    /// No run directories found
    NoRunDirectories,
    /// Requested run directory missing
    RunNotFound,

    // === Remote Errors (exit code 3) ===
    /// Clone of the index repository failed
    CloneFailed,
    /// Git operation failed
    GitError,
    /// Push of the index branch failed
    PushFailed,

    // === Runner Errors (exit code 4) ===
    /// Test command could not be started
    TestCommandFailed,

    // === Notification Errors (exit code 5) ===
    /// Webhook rejected the notification
    NotifyFailed,
    /// HTTP transport failure
    HttpError,

    // === Config Errors (exit code 7) ===
    /// Configuration error
    ConfigError,
    /// Required setting missing
    MissingSetting,

    // === I/O Errors (exit code 8) ===
    /// File I/O error
    IoError,
    /// JSON serialization error
    JsonError,
    /// YAML parsing error
    YamlError,

    // === Internal Errors (exit code 1) ===
    /// Unexpected internal error
    InternalError,
}

impl ErrorCode {
    /// Get the string representation for JSON output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ArtifactsRootMissing => "ARTIFACTS_ROOT_MISSING",
            Self::SummaryMissing => "SUMMARY_MISSING",
            Self::SummaryInvalid => "SUMMARY_INVALID",
            Self::TimestampMissing => "TIMESTAMP_MISSING",
            Self::InvalidRunKey => "INVALID_RUN_KEY",
            Self::NoRunDirectories => "NO_RUN_DIRECTORIES",
            Self::RunNotFound => "RUN_NOT_FOUND",
            Self::CloneFailed => "CLONE_FAILED",
            Self::GitError => "GIT_ERROR",
            Self::PushFailed => "PUSH_FAILED",
            Self::TestCommandFailed => "TEST_COMMAND_FAILED",
            Self::NotifyFailed => "NOTIFY_FAILED",
            Self::HttpError => "HTTP_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
            Self::MissingSetting => "MISSING_SETTING",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::YamlError => "YAML_ERROR",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Whether re-running the same command might succeed without changes.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::CloneFailed | Self::PushFailed | Self::HttpError | Self::NotifyFailed
        )
    }

    /// Get the exit code for this error category.
    ///
    /// - 1: Internal/unknown errors
    /// - 2: Input errors (nothing was published)
    /// - 3: Remote errors
    /// - 4: Test runner errors
    /// - 5: Notification errors
    /// - 7: Config errors
    /// - 8: I/O errors
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::ArtifactsRootMissing
            | Self::SummaryMissing
            | Self::SummaryInvalid
            | Self::TimestampMissing
            | Self::InvalidRunKey
            | Self::NoRunDirectories
            | Self::RunNotFound => 2,
            Self::CloneFailed | Self::GitError | Self::PushFailed => 3,
            Self::TestCommandFailed => 4,
            Self::NotifyFailed | Self::HttpError => 5,
            Self::ConfigError | Self::MissingSetting => 7,
            Self::IoError | Self::JsonError | Self::YamlError => 8,
            Self::InternalError => 1,
        }
    }
}

/// Structured error for machine-parseable output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Machine-readable error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional hint for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether the operation can be retried
    pub retryable: bool,
    /// Additional context data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl StructuredError {
    /// Create a new structured error from a `PublishError`.
    #[must_use]
    pub fn from_error(err: &PublishError) -> Self {
        let (code, context) = Self::extract_code_and_context(err);
        let hint = err.suggestion().map(str::to_string);

        Self {
            code,
            message: err.to_string(),
            hint,
            retryable: code.is_retryable(),
            context,
        }
    }

    /// Serialize to JSON value.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "error": {
                "code": self.code.as_str(),
                "message": self.message,
                "hint": self.hint,
                "retryable": self.retryable,
                "context": self.context,
            }
        })
    }

    /// Format for human-readable output.
    #[must_use]
    pub fn to_human(&self, color: bool) -> String {
        let mut output = String::new();

        if color {
            output.push_str("\x1b[31mError:\x1b[0m ");
        } else {
            output.push_str("Error: ");
        }

        output.push_str(&self.message);

        if let Some(hint) = &self.hint {
            output.push('\n');
            if color {
                output.push_str("\x1b[33mHint:\x1b[0m ");
            } else {
                output.push_str("Hint: ");
            }
            output.push_str(hint);
        }

        output
    }

    fn extract_code_and_context(err: &PublishError) -> (ErrorCode, Option<Value>) {
        match err {
            PublishError::ArtifactsRootMissing { path } => (
                ErrorCode::ArtifactsRootMissing,
                Some(json!({"path": path.display().to_string()})),
            ),
            PublishError::SummaryMissing { path } => (
                ErrorCode::SummaryMissing,
                Some(json!({"path": path.display().to_string()})),
            ),
            PublishError::SummaryParse { path, reason } => (
                ErrorCode::SummaryInvalid,
                Some(json!({"path": path.display().to_string(), "reason": reason})),
            ),
            PublishError::TimestampMissing { path } => (
                ErrorCode::TimestampMissing,
                Some(json!({"path": path.display().to_string()})),
            ),
            PublishError::InvalidRunKey { key } => {
                (ErrorCode::InvalidRunKey, Some(json!({"key": key})))
            }
            PublishError::NoRunDirectories { root } => (
                ErrorCode::NoRunDirectories,
                Some(json!({"root": root.display().to_string()})),
            ),
            PublishError::RunNotFound { path } => (
                ErrorCode::RunNotFound,
                Some(json!({"path": path.display().to_string()})),
            ),
            PublishError::CloneFailed { url, branch, .. } => (
                ErrorCode::CloneFailed,
                Some(json!({"url": url, "branch": branch})),
            ),
            PublishError::Git { operation, .. } => {
                (ErrorCode::GitError, Some(json!({"operation": operation})))
            }
            PublishError::PushFailed { branch, .. } => {
                (ErrorCode::PushFailed, Some(json!({"branch": branch})))
            }
            PublishError::TestCommand { command, .. } => (
                ErrorCode::TestCommandFailed,
                Some(json!({"command": command})),
            ),
            PublishError::NotifyFailed { status, .. } => {
                (ErrorCode::NotifyFailed, Some(json!({"status": status})))
            }
            PublishError::Http(_) => (ErrorCode::HttpError, None),
            PublishError::Config(_) => (ErrorCode::ConfigError, None),
            PublishError::MissingSetting { key } => {
                (ErrorCode::MissingSetting, Some(json!({"key": key})))
            }
            PublishError::Io(_) => (ErrorCode::IoError, None),
            PublishError::Json(_) => (ErrorCode::JsonError, None),
            PublishError::Yaml(_) => (ErrorCode::YamlError, None),
            PublishError::WithContext { context, .. } => {
                (ErrorCode::InternalError, Some(json!({"context": context})))
            }
        }
    }
}
