//! steam-importer - move Steam unlock files into place
//!
//! This library validates a Steam installation directory, classifies
//! `.lua`, `.manifest` and `.st` files by suffix, detects which of them would
//! replace existing files, and moves them into `config/stplug-in` and
//! `config/depotcache` behind a single overwrite decision.

pub mod cli;
pub mod config;
pub mod file_category;
pub mod output;
pub mod prompt;
pub mod reconcile;
pub mod session;
pub mod target;

pub use config::{ConfigError, ConfigStore, FileConfigStore, ImporterConfig};
pub use file_category::FileClass;
pub use reconcile::{
    ConflictSet, ImportError, ImportPlan, ImportResult, MoveFailure, plan_import, reconcile,
};
pub use session::Session;
pub use target::{Destinations, TargetRoot, is_valid_target};

pub use cli::{ImportCommand, run_cli};
