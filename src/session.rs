//! Per-run state: the resolved Steam directory.
//!
//! A [`Session`] is built once at the start of a command and handed to
//! whatever needs the target. There is no global state.

use crate::config::{ConfigStore, ImporterConfig};
use crate::prompt::{Confirmer, FolderPicker};
use crate::reconcile::{ImportError, ImportPlan, plan_import};
use crate::target::{Destinations, TargetRoot};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const STEAM_FOLDER_PROMPT: &str = "Select your Steam installation folder";
const RETRY_QUESTION: &str = "The folder you chose does not contain the required Steam \
     subfolders (config/stplug-in and config/depotcache). Try again?";

pub struct Session {
    target: TargetRoot,
}

impl Session {
    /// Resolves the Steam directory, prompting when the stored one is
    /// missing or no longer valid.
    ///
    /// The user gets two attempts. After an invalid or cancelled first pick
    /// the prompt asks whether to try again. A valid pick is saved.
    ///
    /// # Errors
    ///
    /// `ImportError::ConfigurationMissing` when no valid directory was chosen.
    pub fn resolve<S, P>(store: &S, prompt: &mut P) -> Result<Self, ImportError>
    where
        S: ConfigStore,
        P: FolderPicker + Confirmer + ?Sized,
    {
        if let Some(target) = stored_target(store) {
            return Ok(Self { target });
        }

        let mut target = pick_target(prompt);
        if target.is_none() && prompt.confirm(RETRY_QUESTION) {
            target = pick_target(prompt);
        }

        let target = target.ok_or(ImportError::ConfigurationMissing)?;
        Ok(Self::remember(store, target))
    }

    /// Validates `dir` and stores it as the Steam directory.
    ///
    /// # Errors
    ///
    /// `ImportError::ConfigurationMissing` if `dir` is not a valid target.
    pub fn configure<S: ConfigStore>(store: &S, dir: &Path) -> Result<Self, ImportError> {
        let target = TargetRoot::new(dir).ok_or(ImportError::ConfigurationMissing)?;
        Ok(Self::remember(store, target))
    }

    fn remember<S: ConfigStore>(store: &S, target: TargetRoot) -> Self {
        let config = ImporterConfig {
            steam_dir: Some(target.path().to_path_buf()),
        };
        match store.save(&config) {
            Ok(()) => info!(steam_dir = %target.path().display(), "Steam directory saved"),
            // The session still works; the user is asked again next run.
            Err(e) => warn!(error = %e, "could not save configuration"),
        }
        Self { target }
    }

    pub fn target(&self) -> &TargetRoot {
        &self.target
    }

    pub fn destinations(&self) -> Destinations {
        self.target.destinations()
    }

    /// Re-validates the target, then classifies `source_dir` against it.
    ///
    /// # Errors
    ///
    /// `ImportError::ConfigurationMissing` if the Steam directory lost its
    /// required subfolders since the session was created, or
    /// `ImportError::SourceUnreadable` if the source cannot be listed.
    pub fn plan(&self, source_dir: &Path) -> Result<ImportPlan, ImportError> {
        if !self.target.is_still_valid() {
            warn!(steam_dir = %self.target.path().display(), "Steam directory is no longer valid");
            return Err(ImportError::ConfigurationMissing);
        }
        plan_import(source_dir, &self.destinations())
    }
}

/// The stored Steam directory, valid or not. Unreadable configuration counts
/// as absent.
pub fn stored_steam_dir<S: ConfigStore + ?Sized>(store: &S) -> Option<PathBuf> {
    match store.load() {
        Ok(config) => config?.steam_dir,
        Err(e) => {
            warn!(error = %e, "ignoring unreadable configuration");
            None
        }
    }
}

fn stored_target<S: ConfigStore>(store: &S) -> Option<TargetRoot> {
    let steam_dir = stored_steam_dir(store)?;
    let target = TargetRoot::new(&steam_dir);
    if target.is_none() {
        warn!(steam_dir = %steam_dir.display(), "stored Steam directory is no longer valid");
    }
    target
}

fn pick_target<P: FolderPicker + ?Sized>(picker: &mut P) -> Option<TargetRoot> {
    let chosen = picker.pick_folder(STEAM_FOLDER_PROMPT)?;
    let target = TargetRoot::new(&chosen);
    if target.is_none() {
        warn!(path = %chosen.display(), "chosen folder is not a Steam installation");
    }
    target
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[derive(Default)]
    struct MemoryStore {
        config: RefCell<Option<ImporterConfig>>,
        fail_load: bool,
    }

    impl ConfigStore for MemoryStore {
        fn load(&self) -> Result<Option<ImporterConfig>, ConfigError> {
            if self.fail_load {
                return Err(ConfigError::NoConfigDir);
            }
            Ok(self.config.borrow().clone())
        }

        fn save(&self, config: &ImporterConfig) -> Result<(), ConfigError> {
            *self.config.borrow_mut() = Some(config.clone());
            Ok(())
        }
    }

    struct Scripted {
        folders: VecDeque<Option<PathBuf>>,
        retry: bool,
    }

    impl Scripted {
        fn new(folders: impl IntoIterator<Item = Option<PathBuf>>, retry: bool) -> Self {
            Self {
                folders: folders.into_iter().collect(),
                retry,
            }
        }
    }

    impl FolderPicker for Scripted {
        fn pick_folder(&mut self, _title: &str) -> Option<PathBuf> {
            self.folders.pop_front().flatten()
        }
    }

    impl Confirmer for Scripted {
        fn confirm(&mut self, _question: &str) -> bool {
            self.retry
        }
    }

    fn steam_root() -> TempDir {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        fs::create_dir_all(temp_dir.path().join("config/stplug-in")).unwrap();
        fs::create_dir_all(temp_dir.path().join("config/depotcache")).unwrap();
        temp_dir
    }

    fn store_with(dir: &Path) -> MemoryStore {
        MemoryStore {
            config: RefCell::new(Some(ImporterConfig {
                steam_dir: Some(dir.to_path_buf()),
            })),
            fail_load: false,
        }
    }

    #[test]
    fn test_stored_valid_directory_needs_no_prompt() {
        let steam = steam_root();
        let mut prompt = Scripted::new([], false);
        let session =
            Session::resolve(&store_with(steam.path()), &mut prompt).expect("resolve failed");
        assert_eq!(session.target().path(), steam.path());
    }

    #[test]
    fn test_first_pick_is_saved() {
        let steam = steam_root();
        let mut prompt = Scripted::new([Some(steam.path().to_path_buf())], false);

        let store = MemoryStore::default();
        Session::resolve(&store, &mut prompt).expect("resolve failed");
        let saved = store.load().unwrap().and_then(|c| c.steam_dir);
        assert_eq!(saved.as_deref(), Some(steam.path()));
    }

    #[test]
    fn test_retry_after_invalid_pick() {
        let steam = steam_root();
        let not_steam = TempDir::new().unwrap();
        let mut prompt = Scripted::new(
            [
                Some(not_steam.path().to_path_buf()),
                Some(steam.path().to_path_buf()),
            ],
            true,
        );

        let session =
            Session::resolve(&MemoryStore::default(), &mut prompt).expect("resolve failed");
        assert_eq!(session.target().path(), steam.path());
    }

    #[test]
    fn test_declined_retry_is_configuration_missing() {
        let steam = steam_root();
        let mut prompt = Scripted::new([None, Some(steam.path().to_path_buf())], false);

        let result = Session::resolve(&MemoryStore::default(), &mut prompt);
        assert!(matches!(result, Err(ImportError::ConfigurationMissing)));
    }

    #[test]
    fn test_two_invalid_picks_give_up() {
        let not_steam = TempDir::new().unwrap();
        let mut prompt = Scripted::new(
            [
                Some(not_steam.path().to_path_buf()),
                Some(not_steam.path().to_path_buf()),
                Some(steam_root().path().to_path_buf()),
            ],
            true,
        );

        let result = Session::resolve(&MemoryStore::default(), &mut prompt);
        assert!(matches!(result, Err(ImportError::ConfigurationMissing)));
        assert_eq!(prompt.folders.len(), 1, "only two attempts are made");
    }

    #[test]
    fn test_stale_stored_directory_prompts_again() {
        let stale = TempDir::new().unwrap();
        let steam = steam_root();
        let mut prompt = Scripted::new([Some(steam.path().to_path_buf())], false);

        let session =
            Session::resolve(&store_with(stale.path()), &mut prompt).expect("resolve failed");
        assert_eq!(session.target().path(), steam.path());
    }

    #[test]
    fn test_unreadable_config_counts_as_absent() {
        let steam = steam_root();
        let store = MemoryStore {
            fail_load: true,
            ..Default::default()
        };
        assert_eq!(stored_steam_dir(&store), None);

        let mut prompt = Scripted::new([Some(steam.path().to_path_buf())], false);
        let session = Session::resolve(&store, &mut prompt).expect("resolve failed");
        assert_eq!(session.target().path(), steam.path());
    }

    #[test]
    fn test_configure_rejects_invalid_directory() {
        let not_steam = TempDir::new().unwrap();
        let result = Session::configure(&MemoryStore::default(), not_steam.path());
        assert!(matches!(result, Err(ImportError::ConfigurationMissing)));
    }

    #[test]
    fn test_plan_revalidates_target() {
        let steam = steam_root();
        let source = TempDir::new().unwrap();
        fs::write(source.path().join("a.lua"), "x").unwrap();

        let mut prompt = Scripted::new([], false);
        let session = Session::resolve(&store_with(steam.path()), &mut prompt).expect("session");
        fs::remove_dir(steam.path().join("config/stplug-in")).unwrap();

        let result = session.plan(source.path());
        assert!(matches!(result, Err(ImportError::ConfigurationMissing)));
        assert!(source.path().join("a.lua").exists());
    }

    #[test]
    fn test_plan_targets_session_directories() {
        let steam = steam_root();
        let source = TempDir::new().unwrap();
        fs::write(source.path().join("a.lua"), "x").unwrap();

        let mut prompt = Scripted::new([], false);
        let session = Session::resolve(&store_with(steam.path()), &mut prompt).expect("session");
        let plan = session.plan(source.path()).expect("plan failed");
        let result = plan.execute(true);

        assert_eq!(result.plugin_files, 1);
        assert!(steam.path().join("config/stplug-in/a.lua").is_file());
    }
}
