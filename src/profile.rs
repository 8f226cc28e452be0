//! Per-user profile directory holding configuration, history and scratch files.
//!
//! Resolution order: explicit directory, then `MASSREN_PROFILE_DIR`, then the
//! platform config directory (`~/.config/massren` on Linux).

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{Error, Result};

pub const APP_NAME: &str = "massren";
pub const PROFILE_DIR_ENV: &str = "MASSREN_PROFILE_DIR";

const CONFIG_FILE: &str = "config.json";
const HISTORY_FILE: &str = "history.jsonl";
const TEMP_DIR: &str = "temp";
const TRASH_DIR: &str = "trash";
/// Suffix of the listing files written to `temp/`.
pub const LISTING_SUFFIX: &str = ".files.txt";

#[derive(Debug, Clone)]
pub struct Profile {
    root: PathBuf,
}

impl Profile {
    /// Open (and create) the profile directory.
    pub fn open(explicit: Option<PathBuf>) -> Result<Self> {
        let root = match explicit {
            Some(dir) => dir,
            None => default_profile_dir()?,
        };
        let profile = Self { root };
        profile.ensure_dirs()?;
        debug!(root = %profile.root.display(), "profile opened");
        Ok(profile)
    }

    fn ensure_dirs(&self) -> Result<()> {
        for dir in [self.root.clone(), self.temp_dir()] {
            std::fs::create_dir_all(&dir).map_err(Error::io("create directory", &dir))?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let perms = std::fs::Permissions::from_mode(0o700);
                std::fs::set_permissions(&dir, perms).map_err(Error::io("chmod", &dir))?;
            }
        }
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> PathBuf {
        self.root.join(CONFIG_FILE)
    }

    pub fn history_path(&self) -> PathBuf {
        self.root.join(HISTORY_FILE)
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.root.join(TEMP_DIR)
    }

    pub fn trash_dir(&self) -> PathBuf {
        self.root.join(TRASH_DIR)
    }

    /// Remove listing files left in `temp/` by runs that were killed.
    pub fn clean_temp(&self) -> Result<usize> {
        let dir = self.temp_dir();
        let mut removed = 0;
        for entry in std::fs::read_dir(&dir).map_err(Error::io("read directory", &dir))? {
            let path = entry.map_err(Error::io("read directory", &dir))?.path();
            let is_listing = path
                .file_name()
                .is_some_and(|n| n.to_string_lossy().ends_with(LISTING_SUFFIX));
            if is_listing && path.is_file() {
                std::fs::remove_file(&path).map_err(Error::io("remove", &path))?;
                removed += 1;
            }
        }
        if removed > 0 {
            debug!(removed, "removed stale listing files");
        }
        Ok(removed)
    }
}

fn default_profile_dir() -> Result<PathBuf> {
    if let Ok(val) = std::env::var(PROFILE_DIR_ENV)
        && !val.is_empty()
    {
        let path = PathBuf::from(val);
        debug!(path = %path.display(), "Using MASSREN_PROFILE_DIR override");
        return Ok(path);
    }
    let base = dirs::config_dir().ok_or(Error::ProfileDirNotFound)?;
    Ok(base.join(APP_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_temp_removes_only_listings() {
        let dir = tempfile::tempdir().unwrap();
        let profile = Profile::open(Some(dir.path().to_path_buf())).unwrap();
        let temp = profile.temp_dir();
        std::fs::write(temp.join(format!("stale{LISTING_SUFFIX}")), "x").unwrap();
        std::fs::write(temp.join("keep.txt"), "x").unwrap();
        assert_eq!(profile.clean_temp().unwrap(), 1);
        assert_eq!(profile.clean_temp().unwrap(), 0);
        assert!(temp.join("keep.txt").exists());
    }

    #[test]
    fn explicit_profile_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let profile = Profile::open(Some(dir.path().join("p"))).unwrap();
        assert!(profile.root().is_dir());
        assert!(profile.temp_dir().is_dir());
        assert!(profile.history_path().ends_with(HISTORY_FILE));
        assert!(profile.config_path().starts_with(profile.root()));
    }
}
