//! Persistent record of completed renames, used by undo.
//!
//! Rows are stored as NDJSON, one `HistoryItem` per line. Every mutation
//! rewrites the whole file through a temporary sibling that is renamed into
//! place, so a batch insert is either fully visible or not at all.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::{FileAction, HistoryItem};
use crate::normalize::normalize_path;

/// Default retention for history rows.
pub const DEFAULT_MAX_AGE: std::time::Duration = std::time::Duration::from_secs(7 * 24 * 60 * 60);

/// Handle on the history file of a profile.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    /// Open the store at `path`, creating its directory if needed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(Error::io("create directory", parent))?;
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record a single rename.
    pub fn record(&self, source: &Path, dest: &Path) -> Result<HistoryItem> {
        let pair = (normalize_path(source)?, normalize_path(dest)?);
        let mut items = self.append(vec![pair], now())?;
        Ok(items.remove(0))
    }

    /// Record every rename of `actions` in one write. Deletes are skipped.
    pub fn record_batch(&self, actions: &[FileAction]) -> Result<Vec<HistoryItem>> {
        let mut pairs = Vec::new();
        for action in actions {
            if let Some(dest) = action.destination() {
                pairs.push((normalize_path(action.old_path())?, normalize_path(&dest)?));
            }
        }
        if pairs.is_empty() {
            return Ok(Vec::new());
        }
        self.append(pairs, now())
    }

    pub(crate) fn append(
        &self,
        pairs: Vec<(PathBuf, PathBuf)>,
        timestamp: i64,
    ) -> Result<Vec<HistoryItem>> {
        let mut items = self.all()?;
        let mut next_id = items.iter().map(|i| i.id).max().unwrap_or(0) + 1;
        let mut added = Vec::with_capacity(pairs.len());
        for (source, dest) in pairs {
            added.push(HistoryItem {
                id: next_id,
                source,
                dest,
                timestamp,
            });
            next_id += 1;
        }
        items.extend(added.iter().cloned());
        self.write_all(&items)?;
        debug!(count = added.len(), "recorded history items");
        Ok(added)
    }

    /// Most recent item for each requested destination.
    ///
    /// Returns at most one item per destination, in request order. Ties on
    /// timestamp go to the highest id.
    pub fn latest_by_destinations(&self, paths: &[PathBuf]) -> Result<Vec<HistoryItem>> {
        let mut latest: HashMap<PathBuf, HistoryItem> = HashMap::new();
        let mut wanted = Vec::new();
        for path in paths {
            let normalized = normalize_path(path)?;
            if !wanted.contains(&normalized) {
                wanted.push(normalized);
            }
        }

        for item in self.all()? {
            if !wanted.contains(&item.dest) {
                continue;
            }
            let newer = match latest.get(&item.dest) {
                Some(current) => (item.timestamp, item.id) > (current.timestamp, current.id),
                None => true,
            };
            if newer {
                latest.insert(item.dest.clone(), item);
            }
        }

        Ok(wanted
            .into_iter()
            .filter_map(|dest| latest.remove(&dest))
            .collect())
    }

    /// Remove exactly the given items (matched by id).
    pub fn delete(&self, items: &[HistoryItem]) -> Result<usize> {
        if items.is_empty() {
            return Ok(0);
        }
        let current = self.all()?;
        let before = current.len();
        let kept: Vec<_> = current
            .into_iter()
            .filter(|item| !items.iter().any(|d| d.id == item.id))
            .collect();
        let removed = before - kept.len();
        self.write_all(&kept)?;
        Ok(removed)
    }

    /// Drop rows older than `cutoff` (unix seconds). Failures are only logged.
    pub fn prune_older_than(&self, cutoff: i64) -> usize {
        let result = self.all().and_then(|items| {
            let before = items.len();
            let kept: Vec<_> = items.into_iter().filter(|i| i.timestamp >= cutoff).collect();
            let removed = before - kept.len();
            if removed > 0 {
                self.write_all(&kept)?;
            }
            Ok(removed)
        });
        match result {
            Ok(removed) => {
                if removed > 0 {
                    debug!(removed, "pruned old history items");
                }
                removed
            }
            Err(e) => {
                warn!(error = %e, "could not prune history");
                0
            }
        }
    }

    /// Remove every row.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::io("remove", &self.path)(e)),
        }
    }

    /// Every row, in insertion order.
    pub fn all(&self) -> Result<Vec<HistoryItem>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::io("read", &self.path)(e)),
        };
        content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(n, line)| {
                serde_json::from_str(line).map_err(|e| Error::CorruptHistory {
                    line: n + 1,
                    reason: e.to_string(),
                })
            })
            .collect()
    }

    fn write_all(&self, items: &[HistoryItem]) -> Result<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp =
            tempfile::NamedTempFile::new_in(dir).map_err(Error::io("create temp file", dir))?;
        for item in items {
            let line = serde_json::to_string(item)?;
            writeln!(tmp, "{}", line).map_err(Error::io("write", tmp.path().to_path_buf()))?;
        }
        tmp.as_file()
            .sync_all()
            .map_err(Error::io("sync", tmp.path().to_path_buf()))?;
        tmp.persist(&self.path)
            .map_err(|e| Error::io("persist", &self.path)(e.error))?;
        Ok(())
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Unix timestamp `max_age` before now.
pub fn cutoff_for(max_age: std::time::Duration) -> i64 {
    let age = chrono::Duration::from_std(max_age).unwrap_or(chrono::Duration::MAX);
    chrono::Utc::now()
        .checked_sub_signed(age)
        .map(|t| t.timestamp())
        .unwrap_or(i64::MIN)
}
