use path_absolutize::Absolutize;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Make a path absolute and lexically clean (`.` and `..` removed) without
/// touching the filesystem, so paths that no longer exist still normalize.
pub fn normalize_path(path: &Path) -> Result<PathBuf> {
    let absolute = path
        .absolutize()
        .map_err(Error::io("absolutize", path))?;
    Ok(absolute.into_owned())
}

/// Final component of `path` as text, or the whole path when it has none.
pub fn base_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => path.to_string_lossy().into_owned(),
    }
}

/// Destination of renaming `old_path` to `new_name` inside its own directory.
pub fn sibling_path(old_path: &Path, new_name: &str) -> PathBuf {
    match old_path.parent() {
        Some(dir) => dir.join(new_name),
        None => PathBuf::from(new_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_removes_dot_segments() {
        let dir = tempfile::tempdir().unwrap();
        let messy = dir.path().join("a/./b/../c");
        assert_eq!(normalize_path(&messy).unwrap(), dir.path().join("a/c"));
    }

    #[test]
    fn normalize_makes_relative_paths_absolute() {
        let normalized = normalize_path(Path::new("some/file")).unwrap();
        assert!(normalized.is_absolute());
        assert!(normalized.ends_with("some/file"));
    }

    #[test]
    fn normalize_does_not_require_existence() {
        let normalized = normalize_path(Path::new("/does/not/exist/../file")).unwrap();
        assert_eq!(normalized, PathBuf::from("/does/not/file"));
    }

    #[test]
    fn base_name_keeps_whitespace() {
        assert_eq!(base_name(Path::new("dir/ ijkl\t ")), " ijkl\t ");
        assert_eq!(base_name(Path::new("abcd")), "abcd");
    }

    #[test]
    fn sibling_path_stays_in_directory() {
        assert_eq!(sibling_path(Path::new("/x/two"), "newname"), PathBuf::from("/x/newname"));
        assert_eq!(sibling_path(Path::new("two"), "newname"), PathBuf::from("newname"));
        assert_eq!(sibling_path(Path::new("/x/abcd"), "ab/cd"), PathBuf::from("/x/ab/cd"));
    }
}
