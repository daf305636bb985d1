//! Context helpers for attaching a description to lower-level failures.

use super::{PublishError, Result};

/// Attach context to any `Result` whose error is a standard error.
pub trait ResultExt<T> {
    /// Wrap the error with a static or computed context message.
    ///
    /// # Errors
    ///
    /// Returns `PublishError::WithContext` if `self` is an error.
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|source| PublishError::WithContext {
            context: f().into(),
            source: Box::new(source),
        })
    }
}

/// Convert an `Option` into a `Result` with a configuration error.
pub trait OptionExt<T> {
    /// Return the value or a `MissingSetting` error for `key`.
    ///
    /// # Errors
    ///
    /// Returns `PublishError::MissingSetting` if `self` is `None`.
    fn required(self, key: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn required(self, key: &str) -> Result<T> {
        self.ok_or_else(|| PublishError::MissingSetting {
            key: key.to_string(),
        })
    }
}
