use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::fsops;

/// How deleted files are disposed of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletePolicy {
    /// Move into the given trash directory.
    Trash { trash_dir: PathBuf },
    /// Remove permanently.
    Permanent,
}

impl DeletePolicy {
    /// Delete `path`, returning the trash location when it was trashed.
    pub fn dispatch(&self, path: &Path) -> Result<Option<PathBuf>> {
        match self {
            DeletePolicy::Trash { trash_dir } => fsops::trash(path, trash_dir).map(Some),
            DeletePolicy::Permanent => fsops::remove(path).map(|()| None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permanent_delete_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f");
        std::fs::write(&file, "x").unwrap();
        assert_eq!(DeletePolicy::Permanent.dispatch(&file).unwrap(), None);
        assert!(!file.exists());
    }

    #[test]
    fn trash_delete_keeps_content() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f");
        std::fs::write(&file, "x").unwrap();
        let policy = DeletePolicy::Trash {
            trash_dir: dir.path().join("trash"),
        };
        let landed = policy.dispatch(&file).unwrap().unwrap();
        assert!(!file.exists());
        assert!(landed.starts_with(dir.path().join("trash")));
    }
}
