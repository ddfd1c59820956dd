//! File classification by filename suffix.
//!
//! Every entry of a source directory gets exactly one [`FileClass`]. The
//! decision looks at the name only, never at the file contents, and the
//! suffix comparison is case-sensitive.
//!
//! # Examples
//!
//! ```
//! use steam_importer::file_category::FileClass;
//!
//! assert_eq!(FileClass::from_file_name("123.lua"), FileClass::Plugin);
//! assert_eq!(FileClass::from_file_name("123_456.manifest"), FileClass::Depot);
//! assert_eq!(FileClass::from_file_name("123.st"), FileClass::Supplemental);
//! assert_eq!(FileClass::from_file_name("readme.txt"), FileClass::Ignored);
//! ```

use serde::Serialize;
use std::ffi::OsStr;

/// Which of the two Steam destination directories a file belongs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DestinationDir {
    /// `config/stplug-in`
    Plugin,
    /// `config/depotcache`
    Depot,
}

/// Classification of a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileClass {
    /// Lua unlock scripts (`.lua`).
    Plugin,
    /// Depot manifests (`.manifest`).
    Depot,
    /// Supplemental `.st` files, stored next to the Lua scripts.
    Supplemental,
    /// Anything else. Never moved.
    Ignored,
}

/// Suffix table, checked in order.
const SUFFIXES: [(&str, FileClass); 3] = [
    (".lua", FileClass::Plugin),
    (".manifest", FileClass::Depot),
    (".st", FileClass::Supplemental),
];

impl FileClass {
    /// The three classes that get imported, in reporting order.
    pub const IMPORTABLE: [FileClass; 3] =
        [FileClass::Plugin, FileClass::Depot, FileClass::Supplemental];

    /// Classifies a UTF-8 filename by its suffix.
    pub fn from_file_name(name: &str) -> Self {
        SUFFIXES
            .iter()
            .find(|(suffix, _)| name.ends_with(suffix))
            .map(|&(_, class)| class)
            .unwrap_or(FileClass::Ignored)
    }

    /// Classifies an OS filename. Names that are not valid UTF-8 are ignored.
    pub fn from_os_name(name: &OsStr) -> Self {
        name.to_str()
            .map(Self::from_file_name)
            .unwrap_or(FileClass::Ignored)
    }

    /// Returns the destination directory for this class.
    ///
    /// `Plugin` and `Supplemental` share the plugin directory.
    pub fn destination(&self) -> Option<DestinationDir> {
        match self {
            FileClass::Plugin | FileClass::Supplemental => Some(DestinationDir::Plugin),
            FileClass::Depot => Some(DestinationDir::Depot),
            FileClass::Ignored => None,
        }
    }

    /// Human-readable label used in summaries.
    pub fn label(&self) -> &'static str {
        match self {
            FileClass::Plugin => "lua",
            FileClass::Depot => "manifest",
            FileClass::Supplemental => ".st",
            FileClass::Ignored => "ignored",
        }
    }
}
