//! Persisted key/value configuration and the typed settings read from it.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::history::DEFAULT_MAX_AGE;

pub const KEY_EDITOR: &str = "editor";
pub const KEY_USE_TRASH: &str = "use_trash";
pub const KEY_HISTORY_MAX_AGE: &str = "history_max_age";
pub const KEY_DELETE_WORKERS: &str = "delete_workers";

pub const DEFAULT_DELETE_WORKERS: usize = 4;

/// String key/value pairs stored as a JSON object.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl ConfigStore {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(Error::io("read", &path)(e)),
        };
        Ok(Self { path, values })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn all(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    /// Validate and store `value` under `key`.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        validate(key, value)?;
        self.values.insert(key.to_string(), value.to_string());
        self.save()
    }

    /// Remove `key`, returning whether it was present.
    pub fn delete(&mut self, key: &str) -> Result<bool> {
        let existed = self.values.remove(key).is_some();
        if existed {
            self.save()?;
        }
        Ok(existed)
    }

    fn save(&self) -> Result<()> {
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp =
            tempfile::NamedTempFile::new_in(dir).map_err(Error::io("create temp file", dir))?;
        serde_json::to_writer_pretty(&mut tmp, &self.values)?;
        writeln!(tmp).map_err(Error::io("write", &self.path))?;
        tmp.persist(&self.path)
            .map_err(|e| Error::io("persist", &self.path)(e.error))?;
        Ok(())
    }
}

fn validate(key: &str, value: &str) -> Result<()> {
    let invalid = |reason: String| Error::InvalidConfig {
        key: key.to_string(),
        reason,
    };
    match key {
        KEY_USE_TRASH => parse_bool(value).map(|_| ()).ok_or_else(|| {
            invalid(format!("expected true or false, got '{value}'"))
        }),
        KEY_HISTORY_MAX_AGE => humantime::parse_duration(value)
            .map(|_| ())
            .map_err(|e| invalid(e.to_string())),
        KEY_DELETE_WORKERS => match value.parse::<usize>() {
            Ok(n) if n > 0 => Ok(()),
            _ => Err(invalid(format!("expected a positive integer, got '{value}'"))),
        },
        KEY_EDITOR => crate::editor::parse_editor_command(value).map(|_| ()),
        _ => Ok(()),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Typed view over the configuration, with defaults filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Editor command line; `None` means pick from the environment.
    pub editor: Option<String>,
    pub use_trash: bool,
    pub history_max_age: Duration,
    pub delete_workers: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            editor: None,
            use_trash: true,
            history_max_age: DEFAULT_MAX_AGE,
            delete_workers: DEFAULT_DELETE_WORKERS,
        }
    }
}

impl Settings {
    pub fn from_store(store: &ConfigStore) -> Result<Self> {
        let mut settings = Settings::default();
        if let Some(editor) = store.get(KEY_EDITOR) {
            settings.editor = Some(editor.to_string());
        }
        if let Some(value) = store.get(KEY_USE_TRASH) {
            validate(KEY_USE_TRASH, value)?;
            settings.use_trash = parse_bool(value).unwrap_or(true);
        }
        if let Some(value) = store.get(KEY_HISTORY_MAX_AGE) {
            settings.history_max_age =
                humantime::parse_duration(value).map_err(|e| Error::InvalidConfig {
                    key: KEY_HISTORY_MAX_AGE.to_string(),
                    reason: e.to_string(),
                })?;
        }
        if let Some(value) = store.get(KEY_DELETE_WORKERS) {
            validate(KEY_DELETE_WORKERS, value)?;
            settings.delete_workers = value.parse().unwrap_or(DEFAULT_DELETE_WORKERS);
        }
        Ok(settings)
    }
}
