//! Steam installation directory validation.
//!
//! A directory is accepted as the import target when it contains both
//! `config/stplug-in` and `config/depotcache`. Only existence is checked;
//! writability shows up later as per-file move failures.

use crate::file_category::{DestinationDir, FileClass};
use std::path::{Path, PathBuf};

const CONFIG_DIR: &str = "config";
const PLUGIN_DIR: &str = "stplug-in";
const DEPOT_DIR: &str = "depotcache";

/// Returns true iff `root` contains both required destination directories.
///
/// Never fails: a missing or unreadable path is simply not a valid target.
///
/// # Examples
///
/// ```
/// use steam_importer::target::is_valid_target;
/// use std::path::Path;
///
/// assert!(!is_valid_target(Path::new("/definitely/not/steam")));
/// ```
pub fn is_valid_target(root: &Path) -> bool {
    let destinations = Destinations::under(root);
    destinations.plugin.is_dir() && destinations.depot.is_dir()
}

/// The two directories files are moved into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destinations {
    /// Receives `.lua` and `.st` files.
    pub plugin: PathBuf,
    /// Receives `.manifest` files.
    pub depot: PathBuf,
}

impl Destinations {
    /// Builds the fixed destination layout below a Steam root.
    pub fn under(root: &Path) -> Self {
        let config = root.join(CONFIG_DIR);
        Self {
            plugin: config.join(PLUGIN_DIR),
            depot: config.join(DEPOT_DIR),
        }
    }

    pub fn dir(&self, which: DestinationDir) -> &Path {
        match which {
            DestinationDir::Plugin => &self.plugin,
            DestinationDir::Depot => &self.depot,
        }
    }

    /// Destination directory for a file class, `None` for ignored files.
    pub fn for_class(&self, class: FileClass) -> Option<&Path> {
        class.destination().map(|which| self.dir(which))
    }
}

/// A Steam installation root that passed [`is_valid_target`].
///
/// Validity was checked at construction. The filesystem can change
/// afterwards, so callers re-check with [`TargetRoot::is_still_valid`]
/// before every import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetRoot {
    root: PathBuf,
}

impl TargetRoot {
    /// Validates `root` and wraps it, or returns `None`.
    pub fn new(root: impl Into<PathBuf>) -> Option<Self> {
        let root = root.into();
        is_valid_target(&root).then_some(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn destinations(&self) -> Destinations {
        Destinations::under(&self.root)
    }

    pub fn is_still_valid(&self) -> bool {
        is_valid_target(&self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn make_steam_root(with_plugin: bool, with_depot: bool) -> TempDir {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        if with_plugin {
            fs::create_dir_all(temp_dir.path().join("config/stplug-in"))
                .expect("Failed to create plugin dir");
        }
        if with_depot {
            fs::create_dir_all(temp_dir.path().join("config/depotcache"))
                .expect("Failed to create depot dir");
        }
        temp_dir
    }

    #[test]
    fn test_valid_when_both_subdirectories_exist() {
        let root = make_steam_root(true, true);
        assert!(is_valid_target(root.path()));
    }

    #[test]
    fn test_invalid_when_either_subdirectory_missing() {
        assert!(!is_valid_target(make_steam_root(true, false).path()));
        assert!(!is_valid_target(make_steam_root(false, true).path()));
        assert!(!is_valid_target(make_steam_root(false, false).path()));
    }

    #[test]
    fn test_invalid_when_subdirectory_is_a_file() {
        let root = make_steam_root(true, false);
        fs::write(root.path().join("config/depotcache"), "not a dir")
            .expect("Failed to write file");
        assert!(!is_valid_target(root.path()));
    }

    #[test]
    fn test_invalid_for_nonexistent_root() {
        assert!(!is_valid_target(Path::new("/non/existent/steam")));
    }

    #[test]
    fn test_destination_layout() {
        let destinations = Destinations::under(Path::new("/steam"));
        assert_eq!(destinations.plugin, PathBuf::from("/steam/config/stplug-in"));
        assert_eq!(destinations.depot, PathBuf::from("/steam/config/depotcache"));
        assert_eq!(
            destinations.for_class(FileClass::Supplemental),
            Some(Path::new("/steam/config/stplug-in"))
        );
        assert_eq!(
            destinations.for_class(FileClass::Depot),
            Some(Path::new("/steam/config/depotcache"))
        );
        assert_eq!(destinations.for_class(FileClass::Ignored), None);
    }

    #[test]
    fn test_target_root_revalidates() {
        let root = make_steam_root(true, true);
        let target = TargetRoot::new(root.path()).expect("root should be valid");
        assert!(target.is_still_valid());

        fs::remove_dir(root.path().join("config/depotcache")).expect("Failed to remove dir");
        assert!(!target.is_still_valid());
        assert!(TargetRoot::new(root.path()).is_none());
    }
}
