//! Turns an edited listing into a list of rename and delete actions.
//!
//! Derivation happens in two steps: `parse_actions` walks the edited text
//! against the original paths without touching the filesystem, then
//! `validate_actions` checks the result against what is on disk. Neither step
//! mutates anything.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};
use crate::listing::{COMMENT_PREFIX, strip_bom};
use crate::model::FileAction;
use crate::normalize::{base_name, normalize_path};

/// Derive and validate the actions implied by `edited_text`.
pub fn derive_actions(
    original_paths: &[PathBuf],
    edited_text: &str,
    newline: &str,
) -> Result<Vec<FileAction>> {
    let actions = parse_actions(original_paths, edited_text, newline)?;
    validate_actions(&actions)?;
    debug!(count = actions.len(), "derived actions from edited list");
    Ok(actions)
}

/// Match edited lines to `original_paths` in order.
///
/// Blank lines are skipped. A `//` line deletes the file at the cursor when
/// the rest of the line names it, and is an ordinary comment otherwise. Any
/// other line is the new name of the file at the cursor.
pub fn parse_actions(
    original_paths: &[PathBuf],
    edited_text: &str,
    newline: &str,
) -> Result<Vec<FileAction>> {
    let mut actions = Vec::new();
    let mut cursor = 0;

    for raw_line in strip_bom(edited_text).split(newline) {
        if cursor >= original_paths.len() {
            break;
        }
        let line = if newline == "\n" {
            raw_line.strip_suffix('\r').unwrap_or(raw_line)
        } else {
            raw_line
        };
        if line.trim().is_empty() {
            continue;
        }

        let old_path = &original_paths[cursor];
        let old_name = base_name(old_path);

        if let Some(rest) = line.strip_prefix(COMMENT_PREFIX) {
            let marked = rest.trim();
            if !marked.is_empty() && marked == old_name.trim() {
                actions.push(FileAction::delete(old_path.clone()));
                cursor += 1;
            }
            continue;
        }

        if line != old_name {
            check_stays_in_directory(line)?;
            actions.push(FileAction::rename(old_path.clone(), line));
        }
        cursor += 1;
    }

    if cursor < original_paths.len() {
        return Err(Error::CountMismatch {
            expected: original_paths.len(),
            found: cursor,
        });
    }
    Ok(actions)
}

/// A new name may add subdirectories but never leave the original directory.
fn check_stays_in_directory(name: &str) -> Result<()> {
    let escapes = Path::new(name).components().any(|c| {
        matches!(
            c,
            Component::RootDir | Component::Prefix(_) | Component::ParentDir
        )
    });
    if escapes {
        return Err(Error::NameEscapesDirectory(name.to_string()));
    }
    Ok(())
}

/// Reject duplicate destinations and destinations that exist on disk without
/// being vacated by another action of the same batch.
pub fn validate_actions(actions: &[FileAction]) -> Result<()> {
    let mut vacated = HashSet::new();
    for action in actions {
        vacated.insert(normalize_path(action.old_path())?);
    }

    let mut seen = HashSet::new();
    for action in actions {
        let Some(dest) = action.destination() else {
            continue;
        };
        let dest = normalize_path(&dest)?;
        if !seen.insert(dest.clone()) {
            return Err(Error::DuplicateDestination(dest));
        }
        if std::fs::symlink_metadata(&dest).is_ok() && !vacated.contains(&dest) {
            return Err(Error::DestinationExists(dest));
        }
    }
    Ok(())
}
