use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::apply;
use crate::cli::{ConfigArgs, HistoryArgs, RenameArgs, UndoArgs};
use crate::config::{ConfigStore, Settings};
use crate::diff;
use crate::editor;
use crate::error::Error;
use crate::events::Event;
use crate::exit_codes::{self, exit};
use crate::history::{HistoryStore, cutoff_for};
use crate::listing;
use crate::profile::{LISTING_SUFFIX, Profile};
use crate::reporter::{ARROW, two_column_table};
use crate::session::Session;
use crate::undo;

pub fn rename(profile: &Profile, args: RenameArgs) -> Result<i32> {
    let mut session = Session::open(profile.clone(), args.dry_run, args.json)
        .context("failed to load configuration")?;

    let paths = listing::file_paths_from_args(&args.patterns, args.include_dirs)?;
    if paths.is_empty() {
        info!("No files to process.");
        return Ok(exit::SUCCESS);
    }

    if let Err(e) = profile.clean_temp() {
        warn!(error = %e, "could not clean temp directory");
    }
    let list_path = profile
        .temp_dir()
        .join(format!("{}{LISTING_SUFFIX}", uuid::Uuid::new_v4()));
    std::fs::write(&list_path, listing::render_listing(&paths, session.newline))
        .with_context(|| format!("failed to write {}", list_path.display()))?;
    let listing_file = ListingFile::new(list_path);
    install_interrupt_handler(listing_file.slot.clone());

    let changed = editor::edit_and_wait(&session.editor_command(), listing_file.path())?;
    if !changed {
        session.reporter.record(Event::NoChanges);
        return Ok(exit::SUCCESS);
    }
    let edited = std::fs::read_to_string(listing_file.path())
        .with_context(|| format!("failed to read {}", listing_file.path().display()))?;
    debug!(
        listed = paths.len(),
        edited = listing::file_paths_from_string(&edited, session.newline).len(),
        "read edited listing"
    );

    Ok(reconcile(&paths, &edited, &mut session))
}

/// Check that the listed files are still there, derive the actions implied by
/// `edited` and apply them. Returns the exit code.
pub fn reconcile(paths: &[PathBuf], edited: &str, session: &mut Session) -> i32 {
    let result = check_sources(paths)
        .and_then(|()| diff::derive_actions(paths, edited, session.newline))
        .and_then(|actions| apply::apply(actions, session));
    match result {
        Ok(_) => {
            debug!("{}", session.reporter.summary());
            exit::SUCCESS
        }
        Err(e) => report_failure(session, e),
    }
}

fn check_sources(paths: &[PathBuf]) -> crate::error::Result<()> {
    match paths.iter().find(|p| std::fs::symlink_metadata(p).is_err()) {
        Some(missing) => Err(Error::SourceMissing(missing.clone())),
        None => Ok(()),
    }
}

fn report_failure(session: &mut Session, error: Error) -> i32 {
    let code = exit_codes::for_error(&error);
    let mut message = error.to_string();
    if code == exit::PLAN_FAILURE || matches!(error, Error::SourceMissing(_)) {
        message.push_str(
            ". To avoid any data loss, the operation has been aborted. \
             You may resume it by running the same command.",
        );
    }
    session.reporter.record(Event::Failed { error: message });
    code
}

pub fn undo(profile: &Profile, args: UndoArgs) -> Result<i32> {
    let mut session = Session::open(profile.clone(), args.dry_run, args.json)
        .context("failed to load configuration")?;
    let targets = undo_targets(&args.patterns)?;
    match undo::undo(&targets, &mut session) {
        Ok(_) => {
            debug!("{}", session.reporter.summary());
            Ok(exit::SUCCESS)
        }
        Err(e) => Ok(report_failure(&mut session, e)),
    }
}

/// Expand patterns; a pattern matching nothing is taken as a literal path so
/// that a missing renamed file is reported rather than silently skipped.
fn undo_targets(patterns: &[String]) -> Result<Vec<PathBuf>> {
    if patterns.is_empty() {
        return Ok(listing::file_paths_from_args(&[], true)?);
    }
    let mut targets = Vec::new();
    for pattern in patterns {
        let matches = listing::file_paths_from_args(std::slice::from_ref(pattern), true)?;
        if matches.is_empty() {
            targets.push(PathBuf::from(pattern));
        } else {
            targets.extend(matches);
        }
    }
    Ok(targets)
}

pub fn config(profile: &Profile, args: ConfigArgs) -> Result<i32> {
    let mut store = ConfigStore::load(profile.config_path())?;
    match (args.name, args.value) {
        (None, _) => {
            let rows: Vec<_> = store
                .all()
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            print!("{}", two_column_table(&rows, " = "));
        }
        (Some(name), None) => {
            if store.delete(&name)? {
                info!("Config has been changed: deleted key \"{}\"", name);
            } else {
                info!("Config key \"{}\" was not set", name);
            }
        }
        (Some(name), Some(value)) => {
            store.set(&name, &value)?;
            debug!(path = %store.path().display(), "saved configuration");
            info!("Config has been changed: \"{}\" = \"{}\"", name, value);
        }
    }
    Ok(exit::SUCCESS)
}

pub fn history(profile: &Profile, args: HistoryArgs) -> Result<i32> {
    let store = HistoryStore::open(profile.history_path())?;
    if args.clear {
        store.clear()?;
        info!("History has been cleared");
        return Ok(exit::SUCCESS);
    }
    let rows: Vec<_> = store
        .all()?
        .into_iter()
        .map(|item| {
            let when = chrono::DateTime::from_timestamp(item.timestamp, 0)
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| item.timestamp.to_string());
            (
                format!("{when}  {}", item.source.display()),
                item.dest.display().to_string(),
            )
        })
        .collect();
    print!("{}", two_column_table(&rows, ARROW));
    Ok(exit::SUCCESS)
}

/// Drop history older than the configured retention. Never fails.
pub fn prune_history(profile: &Profile) {
    let settings = ConfigStore::load(profile.config_path())
        .and_then(|store| Settings::from_store(&store))
        .unwrap_or_else(|e| {
            warn!(error = %e, "could not read configuration, using defaults");
            Settings::default()
        });
    match HistoryStore::open(profile.history_path()) {
        Ok(store) => {
            store.prune_older_than(cutoff_for(settings.history_max_age));
        }
        Err(e) => warn!(error = %e, "could not open history"),
    }
}

/// The listing handed to the editor; removed when dropped or on interrupt.
struct ListingFile {
    slot: Arc<Mutex<Option<PathBuf>>>,
    path: PathBuf,
}

impl ListingFile {
    fn new(path: PathBuf) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(path.clone()))),
            path,
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ListingFile {
    fn drop(&mut self) {
        if let Ok(mut slot) = self.slot.lock() {
            slot.take();
        }
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "could not remove listing file");
        }
    }
}

fn install_interrupt_handler(slot: Arc<Mutex<Option<PathBuf>>>) {
    let result = ctrlc::set_handler(move || {
        if let Ok(mut slot) = slot.lock()
            && let Some(path) = slot.take()
        {
            let _ = std::fs::remove_file(path);
        }
        eprintln!("\nOperation has been aborted.");
        std::process::exit(exit::INTERRUPTED);
    });
    if let Err(e) = result {
        warn!(error = %e, "could not install interrupt handler");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn session(dir: &tempfile::TempDir) -> Session {
        let profile = Profile::open(Some(dir.path().join("profile"))).unwrap();
        Session::with_settings(profile, Settings::default(), false, false).unwrap()
    }

    #[test]
    fn reconcile_renames_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(&dir);
        let paths: Vec<_> = ["one", "two", "three"]
            .iter()
            .map(|n| dir.path().join(n))
            .collect();
        for p in &paths {
            fs::write(p, p.file_name().unwrap().to_string_lossy().as_bytes()).unwrap();
        }
        let code = reconcile(&paths, "one\nnewname\nthree\n", &mut session);
        assert_eq!(code, exit::SUCCESS);
        assert!(!dir.path().join("two").exists());
        assert_eq!(fs::read_to_string(dir.path().join("newname")).unwrap(), "two");
        assert_eq!(session.history.all().unwrap().len(), 1);
    }

    #[test]
    fn reconcile_rejects_duplicates_without_mutation() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(&dir);
        let paths = vec![dir.path().join("a"), dir.path().join("b")];
        for p in &paths {
            fs::write(p, "x").unwrap();
        }
        let code = reconcile(&paths, "dup\ndup\n", &mut session);
        assert_eq!(code, exit::PLAN_FAILURE);
        assert!(paths.iter().all(|p| p.exists()));
        assert!(!dir.path().join("dup").exists());
        assert!(session.history.all().unwrap().is_empty());
        assert!(matches!(
            session.reporter.events().last(),
            Some(Event::Failed { .. })
        ));
    }

    #[test]
    fn reconcile_aborts_when_file_vanished() {
        let dir = tempfile::tempdir().unwrap();
        let mut session = session(&dir);
        let paths = vec![dir.path().join("a"), dir.path().join("b")];
        fs::write(&paths[0], "x").unwrap();
        let code = reconcile(&paths, "a2\nb2\n", &mut session);
        assert_eq!(code, exit::OPERATIONAL_FAILURE);
        assert!(paths[0].exists());
    }

    #[test]
    fn undo_targets_keep_unmatched_patterns() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing").display().to_string();
        let targets = undo_targets(&[missing.clone()]).unwrap();
        assert_eq!(targets, vec![PathBuf::from(missing)]);
    }

    #[test]
    fn listing_file_is_removed_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.files.txt");
        fs::write(&path, "x").unwrap();
        drop(ListingFile::new(path.clone()));
        assert!(!path.exists());
    }

    #[test]
    fn prune_history_uses_retention() {
        let dir = tempfile::tempdir().unwrap();
        let profile = Profile::open(Some(dir.path().to_path_buf())).unwrap();
        let store = HistoryStore::open(profile.history_path()).unwrap();
        store.append(vec![("/a".into(), "/b".into())], 1000).unwrap();
        store.record(Path::new("/c"), Path::new("/d")).unwrap();
        prune_history(&profile);
        let left = store.all().unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].dest, PathBuf::from("/d"));
    }
}
