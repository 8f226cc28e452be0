use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};

/// Rename `src` to `dst`, creating missing parent directories of `dst` first.
pub fn rename(src: &Path, dst: &Path) -> Result<()> {
    if let Some(parent) = dst.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(Error::io("create directory", parent))?;
    }
    std::fs::rename(src, dst).map_err(Error::io("rename", src))?;
    debug!(src = %src.display(), dst = %dst.display(), "renamed");
    Ok(())
}

/// Whether anything, including a dangling symlink, is at `path`.
pub fn path_exists(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok()
}

/// Unique temporary sibling of `path` used to vacate a contested name.
pub fn intermediate_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(format!("-{}", uuid::Uuid::new_v4()));
    PathBuf::from(name)
}

/// Check if two paths are on the same filesystem.
#[cfg(unix)]
fn same_filesystem(src: &Path, dst_dir: &Path) -> Result<bool> {
    use std::os::unix::fs::MetadataExt;
    let src_meta = std::fs::symlink_metadata(src).map_err(Error::io("stat", src))?;
    let dst_meta = std::fs::metadata(dst_dir).map_err(Error::io("stat", dst_dir))?;
    Ok(src_meta.dev() == dst_meta.dev())
}

#[cfg(not(unix))]
fn same_filesystem(_src: &Path, _dst_dir: &Path) -> Result<bool> {
    // Let rename try first; copy+delete only runs when it fails.
    Ok(true)
}

/// Permanently remove a file or directory tree.
pub fn remove(path: &Path) -> Result<()> {
    let meta = std::fs::symlink_metadata(path).map_err(Error::io("stat", path))?;
    if meta.is_dir() {
        std::fs::remove_dir_all(path).map_err(Error::io("remove", path))?;
    } else {
        std::fs::remove_file(path).map_err(Error::io("remove", path))?;
    }
    Ok(())
}

/// Move `src` into `trash_dir` under a unique name, returning where it landed.
///
/// Falls back to copy+delete when the trash lives on another device.
pub fn trash(src: &Path, trash_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(trash_dir).map_err(Error::io("create directory", trash_dir))?;
    let name = src
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let dst = trash_dir.join(format!("{}-{}", uuid::Uuid::new_v4(), name));

    let moved = if same_filesystem(src, trash_dir)? {
        std::fs::rename(src, &dst).is_ok()
    } else {
        false
    };
    if !moved {
        copy_recursive(src, &dst)?;
        remove(src)?;
    }
    debug!(src = %src.display(), dst = %dst.display(), "moved to trash");
    Ok(dst)
}

fn copy_recursive(src: &Path, dst: &Path) -> Result<()> {
    let meta = std::fs::symlink_metadata(src).map_err(Error::io("stat", src))?;
    if !meta.is_dir() {
        std::fs::copy(src, dst).map_err(Error::io("copy", src))?;
        return Ok(());
    }
    for entry in walkdir::WalkDir::new(src) {
        let entry = entry.map_err(|e| {
            let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| src.to_path_buf());
            Error::io("walk", path)(e.into())
        })?;
        let rel = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target).map_err(Error::io("create directory", &target))?;
        } else {
            std::fs::copy(entry.path(), &target).map_err(Error::io("copy", entry.path()))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rename_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("abcd");
        std::fs::write(&src, "x").unwrap();
        let dst = dir.path().join("ab/cd");
        rename(&src, &dst).unwrap();
        assert!(!src.exists());
        assert_eq!(std::fs::read_to_string(dst).unwrap(), "x");
    }

    #[test]
    fn intermediate_paths_are_unique_siblings() {
        let a = intermediate_path(Path::new("/x/file"));
        let b = intermediate_path(Path::new("/x/file"));
        assert_ne!(a, b);
        assert_eq!(a.parent(), Some(Path::new("/x")));
        assert!(a.to_string_lossy().starts_with("/x/file-"));
    }

    #[test]
    fn trash_moves_file_and_directory() {
        let dir = tempfile::tempdir().unwrap();
        let trash_dir = dir.path().join("trash");

        let file = dir.path().join("file");
        std::fs::write(&file, "content").unwrap();
        let landed = trash(&file, &trash_dir).unwrap();
        assert!(!file.exists());
        assert_eq!(std::fs::read_to_string(landed).unwrap(), "content");

        let sub = dir.path().join("sub");
        std::fs::create_dir(&sub).unwrap();
        std::fs::write(sub.join("inner"), "i").unwrap();
        let landed = trash(&sub, &trash_dir).unwrap();
        assert!(!sub.exists());
        assert!(landed.join("inner").exists());
    }

    #[test]
    fn copy_recursive_copies_tree() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src");
        std::fs::create_dir_all(src.join("a/b")).unwrap();
        std::fs::write(src.join("a/b/f"), "f").unwrap();
        copy_recursive(&src, &dir.path().join("dst")).unwrap();
        assert_eq!(std::fs::read_to_string(dir.path().join("dst/a/b/f")).unwrap(), "f");
    }

    #[test]
    fn remove_handles_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(remove(&dir.path().join("missing")).is_err());
    }
}
