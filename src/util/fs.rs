//! Filesystem helpers: recursive copy and atomic writes.

use crate::error::{Result, ResultExt};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Statistics from a recursive copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    pub files: usize,
    pub bytes: u64,
}

/// Recursively copy `src` into `dst`, creating `dst` if needed.
///
/// Existing files in `dst` are overwritten; files only present in `dst` are
/// left alone. Symlinks are followed.
///
/// # Errors
///
/// Returns an error if `src` cannot be walked or any file fails to copy.
pub fn copy_dir_all(src: &Path, dst: &Path) -> Result<CopyStats> {
    let mut stats = CopyStats::default();
    fs::create_dir_all(dst)?;

    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.with_context(|| format!("walking {}", src.display()))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .with_context(|| format!("relativizing {}", entry.path().display()))?;
        if relative.as_os_str().is_empty() {
            continue;
        }
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            stats.bytes += fs::copy(entry.path(), &target)?;
            stats.files += 1;
        }
    }

    Ok(stats)
}

/// Write `contents` to `path` through a sibling temp file and a rename.
///
/// # Errors
///
/// Returns an error if the temp file cannot be written or renamed.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let temp_path = path.with_file_name(format!(".{file_name}.tmp"));
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(&temp_path, contents)?;
    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(err.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_dir_all_copies_nested_tree() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        fs::create_dir_all(src.join("data").join("trace")).unwrap();
        fs::write(src.join("index.html"), "<html></html>").unwrap();
        fs::write(src.join("data").join("trace").join("a.zip"), "zip").unwrap();

        let dst = temp.path().join("dst");
        let stats = copy_dir_all(&src, &dst).unwrap();

        assert_eq!(stats.files, 2);
        assert_eq!(stats.bytes, 16);
        assert_eq!(
            fs::read_to_string(dst.join("index.html")).unwrap(),
            "<html></html>"
        );
        assert!(dst.join("data").join("trace").join("a.zip").is_file());
        assert!(src.join("index.html").is_file(), "source must be kept");
    }

    #[test]
    fn test_copy_dir_all_overwrites_existing_files() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        let dst = temp.path().join("dst");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(&dst).unwrap();
        fs::write(src.join("index.html"), "new").unwrap();
        fs::write(dst.join("index.html"), "old").unwrap();
        fs::write(dst.join("keep.txt"), "keep").unwrap();

        copy_dir_all(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(dst.join("index.html")).unwrap(), "new");
        assert!(dst.join("keep.txt").is_file());
    }

    #[test]
    fn test_copy_dir_all_missing_source_fails() {
        let temp = TempDir::new().unwrap();
        assert!(copy_dir_all(&temp.path().join("nope"), &temp.path().join("dst")).is_err());
    }

    #[test]
    fn test_write_atomic_replaces_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("out.json");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "second");
        assert!(!temp.path().join("nested").join(".out.json.tmp").exists());
    }
}
