use crate::config::{ConfigStore, Settings};
use crate::error::Result;
use crate::history::HistoryStore;
use crate::listing::platform_newline;
use crate::policy::DeletePolicy;
use crate::profile::Profile;
use crate::reporter::Reporter;

/// Everything one run needs, built once and passed by reference.
#[derive(Debug)]
pub struct Session {
    pub profile: Profile,
    pub settings: Settings,
    pub history: HistoryStore,
    pub reporter: Reporter,
    pub newline: &'static str,
    pub dry_run: bool,
}

impl Session {
    /// Load settings and open the history of `profile`.
    pub fn open(profile: Profile, dry_run: bool, json: bool) -> Result<Self> {
        let store = ConfigStore::load(profile.config_path())?;
        let settings = Settings::from_store(&store)?;
        Self::with_settings(profile, settings, dry_run, json)
    }

    pub fn with_settings(
        profile: Profile,
        settings: Settings,
        dry_run: bool,
        json: bool,
    ) -> Result<Self> {
        let history = HistoryStore::open(profile.history_path())?;
        Ok(Self {
            profile,
            settings,
            history,
            reporter: Reporter::new(json),
            newline: platform_newline(),
            dry_run,
        })
    }

    pub fn delete_policy(&self) -> DeletePolicy {
        if self.settings.use_trash {
            DeletePolicy::Trash {
                trash_dir: self.profile.trash_dir(),
            }
        } else {
            DeletePolicy::Permanent
        }
    }

    /// Command used to open the listing.
    pub fn editor_command(&self) -> String {
        self.settings
            .editor
            .clone()
            .unwrap_or_else(crate::editor::default_editor_command)
    }
}
