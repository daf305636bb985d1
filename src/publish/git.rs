//! Thin wrapper around the `git` command line.
//!
//! Every call blocks until the subprocess exits; stderr is captured and
//! carried in the returned error.

use crate::error::{PublishError, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// How the index branch was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloneKind {
    /// The branch existed and was cloned.
    Existing,
    /// The branch did not exist; a fresh one was started locally.
    Created,
}

fn git_command() -> Command {
    let mut cmd = Command::new("git");
    cmd.env("GIT_TERMINAL_PROMPT", "0");
    cmd
}

fn run_git<I, S>(cwd: Option<&Path>, args: I, operation: &str) -> Result<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let mut cmd = git_command();
    if let Some(dir) = cwd {
        cmd.arg("-C").arg(dir);
    }
    cmd.args(args);
    tracing::trace!(?cmd, "Running git");

    let output = cmd
        .output()
        .map_err(|e| PublishError::git(operation, format!("failed to run git: {e}")))?;
    if output.status.success() {
        Ok(output)
    } else {
        Err(PublishError::git(operation, stderr_of(&output)))
    }
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

/// Shallow single-branch clone of `branch`.
///
/// # Errors
///
/// Returns a `Git` error with git's stderr if the clone fails.
pub fn clone_branch(url: &str, branch: &str, dest: &Path) -> Result<GitRepo> {
    run_git(
        None,
        [
            OsStr::new("clone"),
            OsStr::new("--quiet"),
            OsStr::new("--branch"),
            OsStr::new(branch),
            OsStr::new("--depth"),
            OsStr::new("1"),
            OsStr::new("--single-branch"),
            OsStr::new(url),
            dest.as_os_str(),
        ],
        "clone",
    )?;
    Ok(GitRepo::new(dest))
}

/// Whether `branch` exists on the remote.
///
/// # Errors
///
/// Returns a `Git` error if the remote cannot be queried at all.
pub fn remote_has_branch(url: &str, branch: &str) -> Result<bool> {
    let output = run_git(
        None,
        ["ls-remote", "--heads", url, branch],
        "ls-remote",
    )?;
    let wanted = format!("refs/heads/{branch}");
    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .any(|reference| reference == wanted))
}

/// Clone the remote's default branch and switch to a new, empty `branch`.
///
/// # Errors
///
/// Returns a `Git` error if the clone or branch setup fails.
pub fn clone_fresh_branch(url: &str, branch: &str, dest: &Path) -> Result<GitRepo> {
    run_git(
        None,
        [
            OsStr::new("clone"),
            OsStr::new("--quiet"),
            OsStr::new("--depth"),
            OsStr::new("1"),
            OsStr::new(url),
            dest.as_os_str(),
        ],
        "clone",
    )?;
    let repo = GitRepo::new(dest);
    let head = format!("refs/heads/{branch}");
    repo.run(["symbolic-ref", "HEAD", head.as_str()], "symbolic-ref")?;
    // Start from an empty tree, not the default branch's files.
    repo.run(["rm", "-r", "-q", "-f", "--ignore-unmatch", "--", "."], "rm")?;
    Ok(repo)
}

/// Clone `branch`, or start it fresh if the remote does not have it yet.
///
/// # Errors
///
/// Returns `CloneFailed` for any failure other than the branch being absent.
pub fn clone_or_init(url: &str, branch: &str, dest: &Path) -> Result<(GitRepo, CloneKind)> {
    let clone_failed = |stderr: String| PublishError::CloneFailed {
        url: url.to_string(),
        branch: branch.to_string(),
        stderr,
    };

    match clone_branch(url, branch, dest) {
        Ok(repo) => return Ok((repo, CloneKind::Existing)),
        Err(PublishError::Git { stderr, .. }) => {
            tracing::debug!(branch, stderr = %stderr, "Branch clone failed, checking remote");
            let _ = std::fs::remove_dir_all(dest);
            match remote_has_branch(url, branch) {
                Ok(false) => {}
                Ok(true) => return Err(clone_failed(stderr)),
                Err(PublishError::Git { stderr, .. }) => return Err(clone_failed(stderr)),
                Err(other) => return Err(other),
            }
        }
        Err(other) => return Err(other),
    }

    tracing::warn!(branch, "Index branch does not exist yet; creating it");
    match clone_fresh_branch(url, branch, dest) {
        Ok(repo) => Ok((repo, CloneKind::Created)),
        Err(PublishError::Git { stderr, .. }) => Err(clone_failed(stderr)),
        Err(other) => Err(other),
    }
}

/// A local working copy.
#[derive(Debug, Clone)]
pub struct GitRepo {
    dir: PathBuf,
}

impl GitRepo {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Run a git subcommand inside this working copy.
    ///
    /// # Errors
    ///
    /// Returns a `Git` error tagged with `operation` on failure.
    pub fn run<I, S>(&self, args: I, operation: &str) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let output = run_git(Some(&self.dir), args, operation)?;
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    /// Set the commit identity for this working copy.
    ///
    /// # Errors
    ///
    /// Returns a `Git` error if either setting cannot be written.
    pub fn set_identity(&self, name: &str, email: &str) -> Result<()> {
        self.run(["config", "user.name", name], "config")?;
        self.run(["config", "user.email", email], "config")?;
        Ok(())
    }

    /// Stage every change, including deletions.
    ///
    /// # Errors
    ///
    /// Returns a `Git` error if staging fails.
    pub fn add_all(&self) -> Result<()> {
        self.run(["add", "-A"], "add").map(|_| ())
    }

    /// Whether the working copy differs from `HEAD` (or has any file, on an
    /// unborn branch).
    ///
    /// # Errors
    ///
    /// Returns a `Git` error if the status cannot be read.
    pub fn has_changes(&self) -> Result<bool> {
        let status = self.run(["status", "--porcelain"], "status")?;
        Ok(!status.trim().is_empty())
    }

    /// Commit staged changes.
    ///
    /// # Errors
    ///
    /// Returns a `Git` error if the commit fails.
    pub fn commit(&self, message: &str) -> Result<()> {
        self.run(
            ["-c", "commit.gpgsign=false", "commit", "--quiet", "-m", message],
            "commit",
        )
        .map(|_| ())
    }

    /// Push `HEAD` to `branch` on `origin`.
    ///
    /// # Errors
    ///
    /// Returns `PushFailed` with git's stderr if the push is rejected.
    pub fn push(&self, branch: &str) -> Result<()> {
        let refspec = format!("HEAD:refs/heads/{branch}");
        match self.run(["push", "--quiet", "origin", refspec.as_str()], "push") {
            Ok(_) => Ok(()),
            Err(PublishError::Git { stderr, .. }) => Err(PublishError::PushFailed {
                branch: branch.to_string(),
                stderr,
            }),
            Err(other) => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn init_bare(path: &Path) {
        run_git(
            None,
            [
                OsStr::new("init"),
                OsStr::new("--bare"),
                OsStr::new("-q"),
                path.as_os_str(),
            ],
            "init",
        )
        .expect("git init --bare");
    }

    #[test]
    fn missing_branch_on_empty_remote_is_created() {
        let temp = TempDir::new().unwrap();
        let remote = temp.path().join("remote.git");
        init_bare(&remote);
        let url = remote.to_string_lossy().to_string();

        assert!(!remote_has_branch(&url, "gh-pages").unwrap());

        let dest = temp.path().join("scratch");
        let (repo, kind) = clone_or_init(&url, "gh-pages", &dest).unwrap();
        assert_eq!(kind, CloneKind::Created);
        assert_eq!(
            repo.run(["symbolic-ref", "HEAD"], "symbolic-ref").unwrap().trim(),
            "refs/heads/gh-pages"
        );
    }

    #[test]
    fn unreachable_remote_is_clone_failure() {
        let temp = TempDir::new().unwrap();
        let url = temp.path().join("does-not-exist.git");
        let err = clone_or_init(&url.to_string_lossy(), "gh-pages", &temp.path().join("scratch"))
            .unwrap_err();
        assert!(matches!(err, PublishError::CloneFailed { .. }));
    }

    #[test]
    fn commit_and_push_round_trip() {
        let temp = TempDir::new().unwrap();
        let remote = temp.path().join("remote.git");
        init_bare(&remote);
        let url = remote.to_string_lossy().to_string();

        let (repo, _) = clone_or_init(&url, "gh-pages", &temp.path().join("one")).unwrap();
        repo.set_identity("tester", "tester@example.com").unwrap();
        fs::write(repo.dir().join("index.html"), "<html></html>").unwrap();
        repo.add_all().unwrap();
        assert!(repo.has_changes().unwrap());
        repo.commit("first").unwrap();
        assert!(!repo.has_changes().unwrap());
        repo.push("gh-pages").unwrap();

        assert!(remote_has_branch(&url, "gh-pages").unwrap());
        let (again, kind) = clone_or_init(&url, "gh-pages", &temp.path().join("two")).unwrap();
        assert_eq!(kind, CloneKind::Existing);
        assert!(again.dir().join("index.html").is_file());
    }
}
