//! Shared utilities for `reportpub`.
//!
//! - Run key rounding and persistence
//! - Recursive directory copy and atomic writes
//! - Progress indicators (for clone/copy/push)

pub mod fs;
pub mod progress;
pub mod time;

pub use fs::{CopyStats, copy_dir_all, write_atomic};
pub use time::{current_key, read_key, round_to_key, write_key};

use std::path::{Component, Path, PathBuf};

/// Resolve `path` against `root` unless it is already absolute.
#[must_use]
pub fn resolve_against(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Lexically normalize `path`: drop `.` components and fold `..` into the
/// preceding component. The filesystem is not consulted.
#[must_use]
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
