use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::normalize;

/// A single operation derived from the edited listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum FileAction {
    /// Rename a file within its own directory.
    Rename {
        /// Path of the file when the listing was generated.
        old_path: PathBuf,
        /// New name, relative to the directory of `old_path`.
        new_path: String,
        /// Temporary name used while resolving conflicting renames.
        #[serde(skip)]
        intermediate_path: Option<PathBuf>,
    },
    /// Delete (or trash) a file.
    Delete {
        /// Path of the file when the listing was generated.
        old_path: PathBuf,
    },
}

impl FileAction {
    pub fn rename(old_path: impl Into<PathBuf>, new_path: impl Into<String>) -> Self {
        FileAction::Rename {
            old_path: old_path.into(),
            new_path: new_path.into(),
            intermediate_path: None,
        }
    }

    pub fn delete(old_path: impl Into<PathBuf>) -> Self {
        FileAction::Delete {
            old_path: old_path.into(),
        }
    }

    pub fn old_path(&self) -> &Path {
        match self {
            FileAction::Rename { old_path, .. } | FileAction::Delete { old_path } => old_path,
        }
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, FileAction::Delete { .. })
    }

    /// Resolved destination of a rename: `dirname(old_path) / new_path`.
    pub fn destination(&self) -> Option<PathBuf> {
        match self {
            FileAction::Rename {
                old_path, new_path, ..
            } => Some(normalize::sibling_path(old_path, new_path)),
            FileAction::Delete { .. } => None,
        }
    }
}

/// A persisted record of one completed rename.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    /// Insertion-ordered identifier.
    pub id: u64,
    /// Normalized absolute path before the rename.
    pub source: PathBuf,
    /// Normalized absolute path after the rename.
    pub dest: PathBuf,
    /// Unix seconds at which the rename was recorded.
    pub timestamp: i64,
}
