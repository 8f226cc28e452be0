//! Reverses recorded renames, newest record per requested destination.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};
use crate::events::Event;
use crate::fsops;
use crate::model::HistoryItem;
use crate::session::Session;
use crate::staging::{self, FsMover, Stageable};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UndoOutcome {
    pub restored: usize,
    /// Restores that went through an intermediate name.
    pub staged: usize,
}

/// Moving a renamed file back from `item.dest` to `item.source`.
#[derive(Debug, Clone)]
struct Reversal {
    item: HistoryItem,
    intermediate_path: Option<PathBuf>,
}

impl Stageable for Reversal {
    fn source(&self) -> &Path {
        &self.item.dest
    }

    fn target(&self) -> PathBuf {
        self.item.source.clone()
    }

    fn intermediate_path(&self) -> Option<&Path> {
        self.intermediate_path.as_deref()
    }

    fn set_intermediate_path(&mut self, path: PathBuf) {
        self.intermediate_path = Some(path);
    }
}

/// Undo the latest rename recorded for each of `targets`.
///
/// History rows are only removed once every reversal succeeded, so a failed
/// undo can be retried.
pub fn undo(targets: &[PathBuf], session: &mut Session) -> Result<UndoOutcome> {
    let items = session.history.latest_by_destinations(targets)?;
    debug!(requested = targets.len(), found = items.len(), "looked up history");
    if items.is_empty() {
        session.reporter.record(Event::NoChanges);
        return Ok(UndoOutcome::default());
    }

    if session.dry_run {
        for item in &items {
            session.reporter.record(Event::RestorePlanned {
                src: item.dest.clone(),
                dst: item.source.clone(),
            });
        }
        session.reporter.print_plan();
        return Ok(UndoOutcome::default());
    }

    check_reversible(&items)?;

    let mut outcome = UndoOutcome::default();
    let mut deferred = Vec::new();
    for item in &items {
        let mut reversal = Reversal {
            item: item.clone(),
            intermediate_path: None,
        };
        if fsops::path_exists(&item.source) {
            staging::assign_intermediate(&mut reversal);
            deferred.push(reversal);
            continue;
        }
        fsops::rename(&item.dest, &item.source).map_err(|e| partial(outcome, e))?;
        outcome.restored += 1;
        session.reporter.record(Event::Restored {
            src: item.dest.clone(),
            dst: item.source.clone(),
        });
    }

    let resolution = staging::resolve_deferred(&FsMover, &deferred);
    for reversal in deferred.iter().take(resolution.committed) {
        outcome.restored += 1;
        outcome.staged += 1;
        session.reporter.record(Event::Restored {
            src: reversal.item.dest.clone(),
            dst: reversal.item.source.clone(),
        });
    }
    if let Some(e) = resolution.error {
        return Err(partial(outcome, e));
    }

    session.history.delete(&items)?;
    Ok(outcome)
}

/// Every renamed file must still be in place, and each original name must be
/// free or vacated by another reversal of the same call.
fn check_reversible(items: &[HistoryItem]) -> Result<()> {
    let vacated: HashSet<&Path> = items.iter().map(|i| i.dest.as_path()).collect();
    let mut claimed = HashSet::new();
    for item in items {
        if !fsops::path_exists(&item.dest) {
            return Err(Error::UndoSourceMissing(item.dest.clone()));
        }
        let occupied =
            fsops::path_exists(&item.source) && !vacated.contains(item.source.as_path());
        if occupied || !claimed.insert(item.source.as_path()) {
            return Err(Error::UndoTargetOccupied(item.source.clone()));
        }
    }
    Ok(())
}

fn partial(outcome: UndoOutcome, error: Error) -> Error {
    if outcome.restored == 0 {
        error
    } else {
        Error::Partial {
            completed: outcome.restored,
            source: Box::new(error),
        }
    }
}
