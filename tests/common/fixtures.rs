#![allow(dead_code)]

use reportpub::config::Settings;
use reportpub::extract::write_summary;
use reportpub::model::ResultsSummary;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;
use walkdir::WalkDir;

/// Run git with a fixed identity; panics with stderr on failure.
pub fn git(cwd: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .arg("-C")
        .arg(cwd)
        .args([
            "-c",
            "user.name=fixture",
            "-c",
            "user.email=fixture@example.com",
            "-c",
            "commit.gpgsign=false",
        ])
        .args(args)
        .output()
        .expect("run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// A workspace with a local artifacts root and a bare index repository.
pub struct ReportWorkspace {
    pub temp_dir: TempDir,
    pub root: PathBuf,
    pub remote: PathBuf,
}

impl ReportWorkspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir");
        let root = temp_dir.path().join("work");
        let remote = temp_dir.path().join("remote.git");
        fs::create_dir_all(&root).expect("work dir");
        let output = Command::new("git")
            .args(["init", "--bare", "-q"])
            .arg(&remote)
            .output()
            .expect("git init");
        assert!(output.status.success(), "git init --bare failed");
        Self {
            temp_dir,
            root,
            remote,
        }
    }

    pub fn remote_url(&self) -> String {
        self.remote.to_string_lossy().to_string()
    }

    pub fn settings(&self) -> Settings {
        let mut settings = Settings::defaults(&self.root).expect("default settings");
        settings.repo_url = Some(self.remote_url());
        settings
    }

    pub fn artifacts_dir(&self) -> PathBuf {
        self.root.join("playwright-report")
    }

    /// Create a local run directory `report-<key>` modified `age_secs` ago.
    pub fn add_run(&self, key: &str, age_secs: u64, results: Option<ResultsSummary>) -> PathBuf {
        let dir = self.artifacts_dir().join(format!("report-{key}"));
        fs::create_dir_all(dir.join("data")).expect("run dir");
        fs::write(
            dir.join("index.html"),
            format!("<html><body>report {key}</body></html>"),
        )
        .expect("run index");
        fs::write(dir.join("data").join("trace.zip"), key.as_bytes()).expect("run data");
        if let Some(summary) = results {
            write_summary(&dir.join("results.json"), &summary).expect("run results");
        }
        set_age(&dir, age_secs);
        dir
    }

    pub fn write_current_summary(&self, summary: ResultsSummary) {
        write_summary(&self.root.join("run_results.json"), &summary).expect("summary file");
    }

    /// Commit `files` to `branch` on the remote, creating it if needed.
    pub fn seed_remote(&self, branch: &str, files: &[(&str, &str)]) {
        let seed = self.temp_dir.path().join(format!("seed-{branch}"));
        if seed.exists() {
            fs::remove_dir_all(&seed).expect("clear seed");
        }
        git(self.temp_dir.path(), &["init", "-q", seed.to_str().expect("utf8 path")]);
        git(&seed, &["checkout", "-q", "-b", branch]);
        for (path, contents) in files {
            let target = seed.join(path);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).expect("seed parent");
            }
            fs::write(target, contents).expect("seed file");
        }
        git(&seed, &["add", "-A"]);
        git(&seed, &["commit", "-q", "-m", "seed"]);
        git(
            &seed,
            &[
                "push",
                "-q",
                self.remote.to_str().expect("utf8 path"),
                &format!("HEAD:refs/heads/{branch}"),
            ],
        );
        fs::remove_dir_all(&seed).expect("remove seed");
    }

    /// Point the remote's HEAD (its default branch) at `branch`.
    pub fn set_default_branch(&self, branch: &str) {
        let head = format!("refs/heads/{branch}");
        let output = Command::new("git")
            .arg("--git-dir")
            .arg(&self.remote)
            .args(["symbolic-ref", "HEAD", head.as_str()])
            .output()
            .expect("git symbolic-ref");
        assert!(output.status.success(), "symbolic-ref failed");
    }

    pub fn remote_file(&self, branch: &str, path: &str) -> Option<String> {
        let object = format!("{branch}:{path}");
        let output = Command::new("git")
            .arg("--git-dir")
            .arg(&self.remote)
            .args(["show", object.as_str()])
            .output()
            .expect("git show");
        output
            .status
            .success()
            .then(|| String::from_utf8_lossy(&output.stdout).to_string())
    }

    pub fn remote_paths(&self, branch: &str) -> Vec<String> {
        let output = Command::new("git")
            .arg("--git-dir")
            .arg(&self.remote)
            .args(["ls-tree", "-r", "--name-only", branch])
            .output()
            .expect("git ls-tree");
        String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// Top-level run directories on the remote branch.
    pub fn remote_run_dirs(&self, branch: &str) -> Vec<String> {
        let mut dirs: Vec<String> = self
            .remote_paths(branch)
            .into_iter()
            .filter_map(|p| p.split_once('/').map(|(dir, _)| dir.to_string()))
            .filter(|dir| dir.starts_with("report-"))
            .collect();
        dirs.sort();
        dirs.dedup();
        dirs
    }

    pub fn remote_commit_count(&self, branch: &str) -> usize {
        let output = Command::new("git")
            .arg("--git-dir")
            .arg(&self.remote)
            .args(["rev-list", "--count", branch])
            .output()
            .expect("git rev-list");
        String::from_utf8_lossy(&output.stdout)
            .trim()
            .parse()
            .unwrap_or(0)
    }

    /// Make every push to the remote fail.
    #[cfg(unix)]
    pub fn reject_pushes(&self) {
        use std::os::unix::fs::PermissionsExt;
        let hook = self.remote.join("hooks").join("pre-receive");
        fs::create_dir_all(hook.parent().expect("hooks dir")).expect("hooks dir");
        fs::write(&hook, "#!/bin/sh\necho 'pushes are frozen' >&2\nexit 1\n").expect("hook");
        fs::set_permissions(&hook, fs::Permissions::from_mode(0o755)).expect("hook mode");
    }
}

/// Set a directory's modification time to `age_secs` in the past.
pub fn set_age(path: &Path, age_secs: u64) {
    let when = SystemTime::now() - Duration::from_secs(age_secs);
    File::open(path)
        .expect("open dir")
        .set_modified(when)
        .expect("set mtime");
}

/// Content hash over relative paths and file bytes.
pub fn hash_dir(path: &Path) -> String {
    let mut files: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();

    let mut hasher = Sha256::new();
    for file in files {
        let relative = file.strip_prefix(path).expect("relative path");
        hasher.update(relative.to_string_lossy().as_bytes());
        hasher.update(fs::read(&file).expect("read file"));
    }
    format!("{:x}", hasher.finalize())
}
