//! Run directory discovery.
//!
//! A run directory lives directly under an artifacts root and is named
//! `<prefix><key>`. Sidecar directories produced by the test framework carry
//! a marker (default `-artifacts`) in their name and are never runs.

use crate::error::{PublishError, Result};
use crate::model::{ResultsSummary, RunKey};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// One run directory found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunDir {
    pub key: RunKey,
    pub name: String,
    pub path: PathBuf,
    pub modified: SystemTime,
}

impl RunDir {
    /// Parse the run's summary file, if present and valid.
    ///
    /// Unreadable or malformed files read as `None`.
    #[must_use]
    pub fn read_summary(&self, results_file: &str) -> Option<ResultsSummary> {
        read_summary_file(&self.path.join(results_file))
    }
}

/// Parse a summary file, treating any failure as absent.
#[must_use]
pub fn read_summary_file(path: &Path) -> Option<ResultsSummary> {
    let contents = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&contents) {
        Ok(summary) => Some(summary),
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "Ignoring malformed summary");
            None
        }
    }
}

/// Enumerates run directories under one root.
#[derive(Debug, Clone)]
pub struct RunStore {
    root: PathBuf,
    prefix: String,
    marker: String,
}

impl RunStore {
    pub fn new(root: impl Into<PathBuf>, prefix: impl Into<String>, marker: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.into(),
            marker: marker.into(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether a directory name denotes a publishable run.
    #[must_use]
    pub fn is_run_name(&self, name: &str) -> bool {
        name.starts_with(&self.prefix)
            && (self.marker.is_empty() || !name.contains(&self.marker))
            && RunKey::from_dir_name(name, &self.prefix).is_some()
    }

    /// Path of the directory for `key` under this root.
    #[must_use]
    pub fn dir_for(&self, key: &RunKey) -> PathBuf {
        self.root.join(key.dir_name(&self.prefix))
    }

    /// Look up the directory for `key`.
    ///
    /// # Errors
    ///
    /// Returns `RunNotFound` if no such directory exists.
    pub fn get(&self, key: &RunKey) -> Result<RunDir> {
        let path = self.dir_for(key);
        let metadata = fs::metadata(&path)
            .ok()
            .filter(fs::Metadata::is_dir)
            .ok_or_else(|| PublishError::RunNotFound { path: path.clone() })?;
        Ok(RunDir {
            key: key.clone(),
            name: key.dir_name(&self.prefix),
            modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
            path,
        })
    }

    /// All run directories, newest first.
    ///
    /// Ordered by modification time descending; equal times fall back to
    /// name descending so the order is the same on every call.
    ///
    /// # Errors
    ///
    /// Returns `ArtifactsRootMissing` if the root is not a directory, or an
    /// I/O error if it cannot be listed.
    pub fn scan(&self) -> Result<Vec<RunDir>> {
        if !self.root.is_dir() {
            return Err(PublishError::ArtifactsRootMissing {
                path: self.root.clone(),
            });
        }

        let mut runs = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if !self.is_run_name(&name) {
                continue;
            }
            let metadata = match entry.metadata() {
                Ok(metadata) if metadata.is_dir() => metadata,
                Ok(_) => continue,
                Err(err) => {
                    tracing::warn!(name = %name, error = %err, "Skipping unreadable entry");
                    continue;
                }
            };
            let Some(key) = RunKey::from_dir_name(&name, &self.prefix) else {
                continue;
            };
            runs.push(RunDir {
                key,
                path: entry.path(),
                modified: metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH),
                name,
            });
        }

        runs.sort_by(|a, b| {
            b.modified
                .cmp(&a.modified)
                .then_with(|| b.name.cmp(&a.name))
        });
        tracing::debug!(root = %self.root.display(), count = runs.len(), "Scanned run directories");
        Ok(runs)
    }

    /// The most recently modified run directory.
    ///
    /// # Errors
    ///
    /// Returns `NoRunDirectories` if the root holds no run, plus the errors
    /// of [`RunStore::scan`].
    pub fn latest(&self) -> Result<RunDir> {
        self.scan()?
            .into_iter()
            .next()
            .ok_or_else(|| PublishError::NoRunDirectories {
                root: self.root.clone(),
            })
    }
}
