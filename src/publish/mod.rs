//! Index aggregation and publication.
//!
//! One publish clones the index branch into a scratch directory, merges the
//! current run into the history document, copies run directories across,
//! regenerates the index page, then commits and pushes. The scratch directory
//! is removed on every exit path.
//!
//! At most one publisher may run against a branch at a time; concurrent
//! publishes race on the push.

pub mod git;

use crate::config::Settings;
use crate::error::{PublishError, Result};
use crate::extract::{read_summary, write_summary};
use crate::model::{ReportIndexData, ResultsSummary, RunKey};
use crate::render::{IndexEntry, render_index};
use crate::store::{RunDir, RunStore, read_summary_file};
use crate::util::progress::{create_progress_bar, should_show_progress, with_spinner};
use crate::util::{copy_dir_all, write_atomic};
use git::{CloneKind, GitRepo};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Steps of a publish, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ValidateInputs,
    CloneOrInitRemote,
    LoadMetadata,
    SelectLatestLocalRun,
    Merge,
    BackfillMissingArtifacts,
    CopyLatest,
    RenderIndex,
    WriteFiles,
    Commit,
    Push,
    Cleanup,
}

impl Stage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidateInputs => "validate_inputs",
            Self::CloneOrInitRemote => "clone_or_init_remote",
            Self::LoadMetadata => "load_metadata",
            Self::SelectLatestLocalRun => "select_latest_local_run",
            Self::Merge => "merge",
            Self::BackfillMissingArtifacts => "backfill_missing_artifacts",
            Self::CopyLatest => "copy_latest",
            Self::RenderIndex => "render_index",
            Self::WriteFiles => "write_files",
            Self::Commit => "commit",
            Self::Push => "push",
            Self::Cleanup => "cleanup",
        }
    }

    fn enter(self) {
        tracing::debug!(stage = self.as_str(), "Entering publish stage");
    }
}

/// Per-invocation publish options.
#[derive(Debug, Clone, Default)]
pub struct PublishOptions {
    /// Publish this run instead of the most recently modified one.
    pub key: Option<RunKey>,
}

/// What a publish did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishOutcome {
    pub key: RunKey,
    pub run_dir: String,
    pub summary: ResultsSummary,
    /// Entries in the history document after the merge.
    pub entries: usize,
    /// Runs other than the current one that were copied to the index.
    pub backfilled: Vec<String>,
    /// Whether the index branch had to be created.
    pub created_branch: bool,
    /// False when nothing changed and the commit and push were skipped.
    pub committed: bool,
}

/// Owns the scratch checkout and removes it when dropped.
#[derive(Debug)]
pub struct ScratchGuard {
    path: PathBuf,
}

impl ScratchGuard {
    /// Claim `path`, removing anything left behind by an earlier run.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if a stale directory cannot be removed.
    pub fn claim(path: &Path) -> Result<Self> {
        if path.exists() {
            tracing::info!(path = %path.display(), "Removing stale scratch directory");
            fs::remove_dir_all(path)?;
        }
        Ok(Self {
            path: path.to_path_buf(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ScratchGuard {
    fn drop(&mut self) {
        Stage::Cleanup.enter();
        if self.path.exists() {
            if let Err(err) = fs::remove_dir_all(&self.path) {
                tracing::warn!(path = %self.path.display(), error = %err, "Failed to remove scratch directory");
            }
        }
    }
}

/// Load the history document from the checkout.
///
/// A missing document yields an empty history. An unparsable one is logged
/// and also replaced by an empty history, so its entries are lost. Entries
/// recorded under their directory name (`{run_prefix}{key}`) are re-keyed to
/// the bare key.
#[must_use]
pub fn load_metadata(path: &Path, run_prefix: &str) -> ReportIndexData {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "No history document yet; starting empty");
            return ReportIndexData::new();
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "Unreadable history document; starting empty");
            return ReportIndexData::new();
        }
    };
    match ReportIndexData::from_json(&contents) {
        Ok(mut data) => {
            let rekeyed = data.strip_dir_prefix(run_prefix);
            if rekeyed > 0 {
                tracing::info!(rekeyed, "Re-keyed history entries recorded by directory name");
            }
            tracing::debug!(entries = data.len(), "Loaded history document");
            data
        }
        Err(err) => {
            tracing::warn!(
                path = %path.display(),
                error = %err,
                "Discarding unparsable history document; previous entries will be dropped"
            );
            ReportIndexData::new()
        }
    }
}

/// Index rows: every key in the history plus every run directory present in
/// the checkout, newest first.
///
/// # Errors
///
/// Returns an I/O error if the checkout cannot be listed.
pub fn collect_entries(
    checkout: &RunStore,
    index: &ReportIndexData,
    results_file: &str,
) -> Result<Vec<IndexEntry>> {
    let mut rows: BTreeMap<RunKey, Option<ResultsSummary>> = index
        .iter()
        .map(|(key, summary)| (key.clone(), Some(*summary)))
        .collect();

    for run in checkout.scan()? {
        rows.entry(run.key.clone())
            .or_insert_with(|| run.read_summary(results_file));
    }

    Ok(rows
        .into_iter()
        .rev()
        .map(|(key, summary)| IndexEntry {
            dir_name: key.dir_name(checkout.prefix()),
            key,
            summary,
        })
        .collect())
}

/// Publish the current run to the index branch.
///
/// # Errors
///
/// Input errors are returned before the remote is touched. Clone, commit and
/// push failures are returned after the scratch checkout has been removed.
pub fn publish(settings: &Settings, options: &PublishOptions) -> Result<PublishOutcome> {
    Stage::ValidateInputs.enter();
    if !settings.artifacts_dir.is_dir() {
        return Err(PublishError::ArtifactsRootMissing {
            path: settings.artifacts_dir.clone(),
        });
    }
    let summary = read_summary(&settings.summary_file)?;
    let url = settings.require_repo_url()?;
    settings.check_scratch_dir()?;
    let local = RunStore::new(
        &settings.artifacts_dir,
        &settings.run_prefix,
        &settings.artifacts_marker,
    );

    Stage::CloneOrInitRemote.enter();
    let scratch = ScratchGuard::claim(&settings.scratch_dir)?;
    let (repo, kind) = with_spinner(&format!("Cloning {url} ({})", settings.branch), || {
        git::clone_or_init(url, &settings.branch, scratch.path())
    })?;
    let remote = RunStore::new(repo.dir(), &settings.run_prefix, &settings.artifacts_marker);

    Stage::LoadMetadata.enter();
    let metadata_path = repo.dir().join(&settings.metadata_file);
    let mut index = load_metadata(&metadata_path, &settings.run_prefix);

    Stage::SelectLatestLocalRun.enter();
    let current = match &options.key {
        Some(key) => local.get(key)?,
        None => local.latest()?,
    };
    tracing::info!(run = %current.name, "Publishing run");

    Stage::Merge.enter();
    if let Some(previous) = index.upsert(current.key.clone(), summary) {
        tracing::info!(key = %current.key, %previous, "Replacing existing history entry");
    }

    Stage::BackfillMissingArtifacts.enter();
    let backfilled = backfill(&local, &remote, &index, &current, &settings.results_file)?;

    Stage::CopyLatest.enter();
    let dest = remote.dir_for(&current.key);
    let stats = copy_dir_all(&current.path, &dest)?;
    write_summary(&dest.join(&settings.results_file), &summary)?;
    tracing::debug!(files = stats.files, bytes = stats.bytes, "Copied current run");

    Stage::RenderIndex.enter();
    let entries = collect_entries(&remote, &index, &settings.results_file)?;
    let html = render_index(&entries, &settings.index_file);

    Stage::WriteFiles.enter();
    write_atomic(&scratch.path().join(&settings.index_file), html.as_bytes())?;
    write_atomic(&metadata_path, index.to_json_pretty()?.as_bytes())?;

    Stage::Commit.enter();
    let committed = commit_and_push(&repo, settings, &current.name)?;

    Ok(PublishOutcome {
        key: current.key,
        run_dir: current.name,
        summary,
        entries: index.len(),
        backfilled,
        created_branch: kind == CloneKind::Created,
        committed,
    })
}

fn backfill(
    local: &RunStore,
    remote: &RunStore,
    index: &ReportIndexData,
    current: &RunDir,
    results_file: &str,
) -> Result<Vec<String>> {
    let missing: Vec<RunDir> = local
        .scan()?
        .into_iter()
        .filter(|run| run.key != current.key && !remote.dir_for(&run.key).exists())
        .collect();
    if missing.is_empty() {
        return Ok(Vec::new());
    }

    let progress = create_progress_bar(missing.len() as u64, "Backfilling runs", should_show_progress());
    let mut copied = Vec::with_capacity(missing.len());
    for run in missing {
        let dest = remote.dir_for(&run.key);
        copy_dir_all(&run.path, &dest)?;

        let summary_path = dest.join(results_file);
        if read_summary_file(&summary_path).is_none() {
            match index.get(&run.key) {
                Some(summary) => write_summary(&summary_path, summary)?,
                None => {
                    tracing::warn!(run = %run.name, "Backfilled run has no summary; it will show no data");
                }
            }
        }
        tracing::info!(run = %run.name, "Backfilled missing run");
        copied.push(run.name);
        progress.inc(1);
    }
    progress.finish_and_clear();
    Ok(copied)
}

fn commit_and_push(repo: &GitRepo, settings: &Settings, run_dir: &str) -> Result<bool> {
    if let Err(err) = repo.set_identity(&settings.author_name, &settings.author_email) {
        tracing::warn!(error = %err, "Could not set commit identity; using existing configuration");
    }
    repo.add_all()?;
    if !repo.has_changes()? {
        tracing::info!("Index is already up to date; nothing to commit");
        return Ok(false);
    }
    repo.commit(&format!("Publish report {run_dir} and update index"))?;

    Stage::Push.enter();
    with_spinner(&format!("Pushing to {}", settings.branch), || {
        repo.push(&settings.branch)
    })?;
    tracing::info!(branch = %settings.branch, "Published report");
    Ok(true)
}
