//! Two-phase moves through intermediate names.
//!
//! A batch of renames may contain chains (`0 -> 1`, `1 -> 2`) and cycles
//! (`0 -> 1`, `1 -> 0`). Moves whose destination is still occupied are
//! deferred; once every direct move is done, all deferred sources are first
//! staged to unique intermediate names, which vacates every contested
//! destination, and only then committed. No live file is ever overwritten.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::fsops;
use crate::model::FileAction;

/// A move that can be routed through an intermediate path.
pub trait Stageable {
    fn source(&self) -> &Path;
    fn target(&self) -> PathBuf;
    fn intermediate_path(&self) -> Option<&Path>;
    fn set_intermediate_path(&mut self, path: PathBuf);
}

/// Performs the two halves of a staged move.
pub trait StagedMover {
    /// Move the source to its intermediate path.
    fn stage<S: Stageable>(&self, item: &S) -> Result<()>;
    /// Move the intermediate path to the final target.
    fn commit<S: Stageable>(&self, item: &S) -> Result<()>;
}

/// `StagedMover` backed by real filesystem renames.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsMover;

impl StagedMover for FsMover {
    fn stage<S: Stageable>(&self, item: &S) -> Result<()> {
        let intermediate = staged_path(item)?;
        fsops::rename(item.source(), intermediate)
    }

    fn commit<S: Stageable>(&self, item: &S) -> Result<()> {
        let intermediate = staged_path(item)?;
        fsops::rename(intermediate, &item.target())
    }
}

fn staged_path<S: Stageable>(item: &S) -> Result<&Path> {
    item.intermediate_path().ok_or_else(|| Error::Io {
        op: "stage",
        path: item.source().to_path_buf(),
        source: std::io::Error::other("no intermediate path assigned"),
    })
}

/// Give `item` a fresh intermediate name next to its target.
pub fn assign_intermediate<S: Stageable>(item: &mut S) {
    let path = fsops::intermediate_path(&item.target());
    item.set_intermediate_path(path);
}

/// Progress of a `resolve_deferred` run.
#[derive(Debug, Default)]
pub struct Resolution {
    /// Items moved to their intermediate path.
    pub staged: usize,
    /// Items moved on to their target. Always a prefix of the staged ones.
    pub committed: usize,
    pub error: Option<Error>,
}

/// Stage every deferred item, then commit every one of them.
///
/// Stops at the first failure. Items in `committed..staged` are left under
/// their intermediate name.
pub fn resolve_deferred<M: StagedMover, S: Stageable>(mover: &M, items: &[S]) -> Resolution {
    let mut resolution = Resolution::default();
    for item in items {
        if let Err(e) = mover.stage(item) {
            resolution.error = Some(e);
            return resolution;
        }
        resolution.staged += 1;
    }
    for item in items {
        if let Err(e) = mover.commit(item) {
            resolution.error = Some(e);
            return resolution;
        }
        resolution.committed += 1;
    }
    resolution
}

impl Stageable for FileAction {
    fn source(&self) -> &Path {
        self.old_path()
    }

    fn target(&self) -> PathBuf {
        self.destination()
            .unwrap_or_else(|| self.old_path().to_path_buf())
    }

    fn intermediate_path(&self) -> Option<&Path> {
        match self {
            FileAction::Rename {
                intermediate_path, ..
            } => intermediate_path.as_deref(),
            FileAction::Delete { .. } => None,
        }
    }

    fn set_intermediate_path(&mut self, path: PathBuf) {
        if let FileAction::Rename {
            intermediate_path, ..
        } = self
        {
            *intermediate_path = Some(path);
        }
    }
}
