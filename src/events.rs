use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Structured event emitted while applying or undoing a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Dry run: a rename that would be performed.
    RenamePlanned { src: PathBuf, dst: PathBuf },
    /// Dry run: a delete that would be performed.
    DeletePlanned { path: PathBuf },
    Renamed {
        src: PathBuf,
        dst: PathBuf,
        /// Went through an intermediate name.
        staged: bool,
    },
    Deleted {
        path: PathBuf,
        trashed_to: Option<PathBuf>,
    },
    /// Dry run: an undo that would be performed.
    RestorePlanned { src: PathBuf, dst: PathBuf },
    Restored { src: PathBuf, dst: PathBuf },
    Failed { error: String },
    Completed { renamed: usize, deleted: usize },
    NoChanges,
}
