//! Error types for massren.

use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while planning, applying or undoing a batch.
#[derive(Debug, Error)]
pub enum Error {
    /// The edited listing does not contain one line per original file.
    #[error(
        "number of files in list ({found}) does not match original number of files ({expected})"
    )]
    CountMismatch { expected: usize, found: usize },

    /// Two or more renames resolve to the same destination.
    #[error("there are duplicate filenames in the list: {}", .0.display())]
    DuplicateDestination(PathBuf),

    /// A rename targets a path that exists and is not vacated by the batch.
    #[error("destination already exists: {}", .0.display())]
    DestinationExists(PathBuf),

    /// A new name is absolute or climbs out of the file's directory.
    #[error("new name must stay in the same directory: {0}")]
    NameEscapesDirectory(String),

    /// A file enumerated at plan time disappeared before apply.
    #[error(
        "{} has been changed, deleted or moved while the list was being edited",
        .0.display()
    )]
    SourceMissing(PathBuf),

    /// The renamed file recorded in history is no longer where it was left.
    #[error("cannot undo: {} no longer exists", .0.display())]
    UndoSourceMissing(PathBuf),

    /// Undo would overwrite a file now living at the original name.
    #[error("cannot undo: {} is occupied by another file", .0.display())]
    UndoTargetOccupied(PathBuf),

    /// A filesystem call failed.
    #[error("{op} failed for {}: {source}", path.display())]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Some actions completed before a later one failed.
    #[error("{completed} action(s) completed before failure: {source}")]
    Partial {
        completed: usize,
        #[source]
        source: Box<Error>,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// History file is malformed.
    #[error("history file is corrupt at line {line}: {reason}")]
    CorruptHistory { line: usize, reason: String },

    /// A configuration value failed validation.
    #[error("invalid value for config key '{key}': {reason}")]
    InvalidConfig { key: String, reason: String },

    /// The editor command could not be parsed or run.
    #[error("editor error: {0}")]
    Editor(String),

    /// Worker pool could not be created.
    #[error("could not start delete workers: {0}")]
    Workers(String),

    /// Home directory not found.
    #[error("could not determine the profile directory")]
    ProfileDirNotFound,
}

impl Error {
    /// Returns a closure that wraps an `io::Error` with the failing operation and path.
    pub fn io(op: &'static str, path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Error {
        let path = path.into();
        move |source| Error::Io { op, path, source }
    }

    /// Plan errors are detected before any mutation and fixed by re-editing the list.
    pub fn is_plan_error(&self) -> bool {
        matches!(
            self,
            Error::CountMismatch { .. }
                | Error::DuplicateDestination(_)
                | Error::DestinationExists(_)
                | Error::NameEscapesDirectory(_)
        )
    }
}

/// Result type for massren operations.
pub type Result<T> = std::result::Result<T, Error>;
