//! Executes a batch of actions without ever overwriting a live file.
//!
//! Order of work:
//! 1. every source is checked to still exist;
//! 2. deletes run on a bounded worker pool and are all joined;
//! 3. renames whose destination is free happen directly, the rest are deferred;
//! 4. deferred renames are staged to intermediate names, then committed.
//!
//! A failure stops the batch. Work already done is kept and its renames are
//! still written to history, so it can be undone.

use rayon::prelude::*;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::events::Event;
use crate::fsops;
use crate::model::FileAction;
use crate::policy::DeletePolicy;
use crate::session::Session;
use crate::staging::{self, FsMover, Stageable};

/// Counts of what a call to `apply` did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ApplyOutcome {
    pub renamed: usize,
    pub deleted: usize,
    /// Renames that went through an intermediate name.
    pub staged: usize,
}

/// Apply `actions`, or only report them when the session is a dry run.
pub fn apply(actions: Vec<FileAction>, session: &mut Session) -> Result<ApplyOutcome> {
    let (deletes, renames): (Vec<_>, Vec<_>) =
        actions.into_iter().partition(FileAction::is_delete);

    if deletes.is_empty() && renames.is_empty() {
        session.reporter.record(Event::NoChanges);
        return Ok(ApplyOutcome::default());
    }

    if session.dry_run {
        report_plan(&deletes, &renames, session);
        return Ok(ApplyOutcome::default());
    }

    for action in deletes.iter().chain(renames.iter()) {
        if !fsops::path_exists(action.old_path()) {
            return Err(Error::SourceMissing(action.old_path().to_path_buf()));
        }
    }

    let mut outcome = ApplyOutcome::default();

    let policy = session.delete_policy();
    let results = run_deletes(&deletes, &policy, session.settings.delete_workers)?;
    let mut failure = None;
    for (action, result) in deletes.iter().zip(results) {
        match result {
            Ok(trashed_to) => {
                outcome.deleted += 1;
                session.reporter.record(Event::Deleted {
                    path: action.old_path().to_path_buf(),
                    trashed_to,
                });
            }
            Err(e) => {
                if failure.is_none() {
                    failure = Some(e);
                }
            }
        }
    }
    if let Some(e) = failure {
        return Err(partial(outcome, e));
    }

    let (completed, failure) = run_renames(renames, session, &mut outcome);

    if let Err(e) = session.history.record_batch(&completed) {
        if failure.is_none() {
            return Err(partial(outcome, e));
        }
        warn!(error = %e, "could not record completed renames in history");
    }

    match failure {
        Some(e) => Err(partial(outcome, e)),
        None => {
            session.reporter.record(Event::Completed {
                renamed: outcome.renamed,
                deleted: outcome.deleted,
            });
            Ok(outcome)
        }
    }
}

fn report_plan(deletes: &[FileAction], renames: &[FileAction], session: &mut Session) {
    for action in deletes {
        session.reporter.record(Event::DeletePlanned {
            path: action.old_path().to_path_buf(),
        });
    }
    for action in renames {
        session.reporter.record(Event::RenamePlanned {
            src: action.old_path().to_path_buf(),
            dst: action.target(),
        });
    }
    session.reporter.print_plan();
}

/// Dispatch every delete on a pool of at most `workers` threads and wait for all.
fn run_deletes(
    deletes: &[FileAction],
    policy: &DeletePolicy,
    workers: usize,
) -> Result<Vec<Result<Option<PathBuf>>>> {
    if deletes.is_empty() {
        return Ok(Vec::new());
    }
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.clamp(1, deletes.len()))
        .thread_name(|i| format!("massren-delete-{i}"))
        .build()
        .map_err(|e| Error::Workers(e.to_string()))?;
    debug!(count = deletes.len(), workers, "dispatching deletes");
    Ok(pool.install(|| {
        deletes
            .par_iter()
            .map(|action| policy.dispatch(action.old_path()))
            .collect()
    }))
}

/// Perform renames, returning those that completed and the first failure.
fn run_renames(
    renames: Vec<FileAction>,
    session: &mut Session,
    outcome: &mut ApplyOutcome,
) -> (Vec<FileAction>, Option<Error>) {
    let mut completed = Vec::new();
    let mut deferred = Vec::new();

    for mut action in renames {
        let target = action.target();
        if fsops::path_exists(&target) {
            staging::assign_intermediate(&mut action);
            debug!(
                src = %action.old_path().display(),
                dst = %target.display(),
                "destination occupied, deferring"
            );
            deferred.push(action);
            continue;
        }
        if let Err(e) = fsops::rename(action.old_path(), &target) {
            return (completed, Some(e));
        }
        outcome.renamed += 1;
        session.reporter.record(Event::Renamed {
            src: action.old_path().to_path_buf(),
            dst: target,
            staged: false,
        });
        completed.push(action);
    }

    let resolution = staging::resolve_deferred(&FsMover, &deferred);
    for action in &deferred[resolution.committed..resolution.staged] {
        if let Some(intermediate) = action.intermediate_path() {
            warn!(
                src = %action.old_path().display(),
                left_at = %intermediate.display(),
                "file left under its intermediate name"
            );
        }
    }
    for action in deferred.into_iter().take(resolution.committed) {
        outcome.renamed += 1;
        outcome.staged += 1;
        session.reporter.record(Event::Renamed {
            src: action.old_path().to_path_buf(),
            dst: action.target(),
            staged: true,
        });
        completed.push(action);
    }
    (completed, resolution.error)
}

fn partial(outcome: ApplyOutcome, error: Error) -> Error {
    let completed = outcome.renamed + outcome.deleted;
    if completed == 0 {
        error
    } else {
        Error::Partial {
            completed,
            source: Box::new(error),
        }
    }
}
