//! Import reconciliation: classify, detect conflicts, decide once, move.
//!
//! An import runs in two phases. [`plan_import`] lists the source directory,
//! classifies every file and records which ones would replace an existing
//! destination file. Nothing is touched during planning. [`ImportPlan::execute`]
//! then renames each planned file, skipping conflicting ones unless the batch
//! was allowed to overwrite.
//!
//! [`reconcile`] chains both phases around a single overwrite decision.
//!
//! A failed rename does not abort the batch: the remaining files are still
//! processed and the failure is reported in [`ImportResult::failures`].
//! Moves that already happened are never rolled back.

use crate::file_category::FileClass;
use crate::target::Destinations;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Whole-operation failures. Both are raised before any file is moved.
#[derive(Debug, Error)]
pub enum ImportError {
    /// No valid Steam directory is available.
    #[error("Steam directory not configured or missing config/stplug-in and config/depotcache")]
    ConfigurationMissing,
    /// The source directory could not be listed.
    #[error("Cannot read source directory {}: {source}", .path.display())]
    SourceUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A file that will be renamed into a destination directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    pub file_name: String,
    pub class: FileClass,
    pub from: PathBuf,
    pub to: PathBuf,
    /// A same-named entry already existed in the destination at planning time.
    pub conflicting: bool,
}

/// Names of source files that would replace an existing destination entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictSet {
    names: BTreeSet<String>,
}

impl ConflictSet {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, file_name: &str) -> bool {
        self.names.contains(file_name)
    }

    /// Iterates names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<'a> FromIterator<&'a PlannedMove> for ConflictSet {
    fn from_iter<I: IntoIterator<Item = &'a PlannedMove>>(iter: I) -> Self {
        Self {
            names: iter
                .into_iter()
                .filter(|planned| planned.conflicting)
                .map(|planned| planned.file_name.clone())
                .collect(),
        }
    }
}

/// The fully classified contents of a source directory.
#[derive(Debug, Clone)]
pub struct ImportPlan {
    pub source_dir: PathBuf,
    /// Importable files, sorted by name.
    pub moves: Vec<PlannedMove>,
    /// Regular files whose suffix is not recognized, sorted by name.
    pub ignored: Vec<String>,
    conflicts: ConflictSet,
}

/// What happened to a single planned move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    /// Destination existed and overwriting was declined.
    Skipped,
    Failed(String),
}

/// A rename that failed during execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveFailure {
    pub file_name: String,
    pub class: FileClass,
    pub from: PathBuf,
    pub to: PathBuf,
    pub reason: String,
}

/// Per-class counts of files actually moved, plus what was not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportResult {
    pub plugin_files: usize,
    pub depot_files: usize,
    pub supplemental_files: usize,
    /// Files left in the source because overwriting was declined.
    pub skipped: Vec<String>,
    pub failures: Vec<MoveFailure>,
}

impl ImportResult {
    pub fn count(&self, class: FileClass) -> usize {
        match class {
            FileClass::Plugin => self.plugin_files,
            FileClass::Depot => self.depot_files,
            FileClass::Supplemental => self.supplemental_files,
            FileClass::Ignored => 0,
        }
    }

    /// Files that landed in `config/stplug-in` (`.lua` and `.st`).
    pub fn moved_to_plugin_dir(&self) -> usize {
        self.plugin_files + self.supplemental_files
    }

    /// Files that landed in `config/depotcache`.
    pub fn moved_to_depot_dir(&self) -> usize {
        self.depot_files
    }

    pub fn total_moved(&self) -> usize {
        self.moved_to_plugin_dir() + self.moved_to_depot_dir()
    }

    pub fn is_complete_success(&self) -> bool {
        self.failures.is_empty()
    }

    fn record_move(&mut self, class: FileClass) {
        match class {
            FileClass::Plugin => self.plugin_files += 1,
            FileClass::Depot => self.depot_files += 1,
            FileClass::Supplemental => self.supplemental_files += 1,
            FileClass::Ignored => {}
        }
    }
}

/// Lists and classifies `source_dir` and detects conflicts against the
/// current state of `destinations`. Performs no mutation.
///
/// Only immediate entries that are regular files are considered.
///
/// # Errors
///
/// Returns [`ImportError::SourceUnreadable`] if the directory, or any entry
/// of it, cannot be read.
pub fn plan_import(
    source_dir: &Path,
    destinations: &Destinations,
) -> Result<ImportPlan, ImportError> {
    let unreadable = |source| ImportError::SourceUnreadable {
        path: source_dir.to_path_buf(),
        source,
    };

    let mut moves = Vec::new();
    let mut ignored = Vec::new();

    for entry in fs::read_dir(source_dir).map_err(unreadable)? {
        let entry = entry.map_err(unreadable)?;
        let from = entry.path();
        if !from.is_file() {
            debug!(path = %from.display(), "skipping non-file entry");
            continue;
        }

        let name = entry.file_name();
        let class = FileClass::from_os_name(&name);
        let Some(dest_dir) = destinations.for_class(class) else {
            ignored.push(name.to_string_lossy().into_owned());
            continue;
        };

        let to = dest_dir.join(&name);
        let conflicting = occupied(&to);
        moves.push(PlannedMove {
            file_name: name.to_string_lossy().into_owned(),
            class,
            from,
            to,
            conflicting,
        });
    }

    moves.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    ignored.sort();
    let conflicts = moves.iter().collect::<ConflictSet>();

    debug!(
        source = %source_dir.display(),
        importable = moves.len(),
        ignored = ignored.len(),
        conflicts = conflicts.len(),
        "planned import"
    );

    Ok(ImportPlan {
        source_dir: source_dir.to_path_buf(),
        moves,
        ignored,
        conflicts,
    })
}

impl ImportPlan {
    pub fn conflicts(&self) -> &ConflictSet {
        &self.conflicts
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    /// Number of planned files of the given class.
    pub fn count(&self, class: FileClass) -> usize {
        self.moves.iter().filter(|m| m.class == class).count()
    }

    /// Resolves the single overwrite decision for the batch.
    ///
    /// `confirm` runs only when there is at least one conflict. With no
    /// conflicts there is nothing to decide and the answer is `true`.
    pub fn decide_overwrite<F>(&self, confirm: F) -> bool
    where
        F: FnOnce(&ConflictSet) -> bool,
    {
        if self.conflicts.is_empty() {
            true
        } else {
            confirm(&self.conflicts)
        }
    }

    /// Moves every planned file. See [`ImportPlan::execute_with_progress`].
    pub fn execute(&self, overwrite: bool) -> ImportResult {
        self.execute_with_progress(overwrite, |_, _| {})
    }

    /// Moves every planned file, reporting each outcome to `on_outcome`.
    ///
    /// A file is renamed iff its destination does not exist or `overwrite`
    /// is true. Existence is checked again at move time.
    pub fn execute_with_progress<F>(&self, overwrite: bool, mut on_outcome: F) -> ImportResult
    where
        F: FnMut(&PlannedMove, &MoveOutcome),
    {
        let mut result = ImportResult::default();

        for planned in &self.moves {
            let outcome = if !overwrite && occupied(&planned.to) {
                MoveOutcome::Skipped
            } else {
                match fs::rename(&planned.from, &planned.to) {
                    Ok(()) => MoveOutcome::Moved,
                    Err(e) => MoveOutcome::Failed(e.to_string()),
                }
            };

            match &outcome {
                MoveOutcome::Moved => {
                    debug!(file = %planned.file_name, to = %planned.to.display(), "moved");
                    result.record_move(planned.class);
                }
                MoveOutcome::Skipped => {
                    debug!(file = %planned.file_name, "destination exists, skipped");
                    result.skipped.push(planned.file_name.clone());
                }
                MoveOutcome::Failed(reason) => {
                    warn!(
                        file = %planned.file_name,
                        to = %planned.to.display(),
                        %reason,
                        "move failed"
                    );
                    result.failures.push(MoveFailure {
                        file_name: planned.file_name.clone(),
                        class: planned.class,
                        from: planned.from.clone(),
                        to: planned.to.clone(),
                        reason: reason.clone(),
                    });
                }
            }
            on_outcome(planned, &outcome);
        }

        info!(
            moved = result.total_moved(),
            skipped = result.skipped.len(),
            failed = result.failures.len(),
            "import finished"
        );
        result
    }
}

/// Whether anything has this name, including a dangling symlink.
fn occupied(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Imports the recognized files of `source_dir` into `destinations`.
///
/// Classification and conflict detection complete before `confirm_overwrite`
/// is called, and it is called at most once, only when a conflict exists.
///
/// # Examples
///
/// ```no_run
/// use steam_importer::reconcile::reconcile;
/// use steam_importer::target::Destinations;
/// use std::path::Path;
///
/// let destinations = Destinations::under(Path::new("/opt/steam"));
/// let result = reconcile(Path::new("/home/me/Downloads/game"), &destinations, |conflicts| {
///     println!("{} file(s) already exist", conflicts.len());
///     false
/// });
/// match result {
///     Ok(result) => println!("Moved {} file(s)", result.total_moved()),
///     Err(e) => eprintln!("Import failed: {}", e),
/// }
/// ```
pub fn reconcile<F>(
    source_dir: &Path,
    destinations: &Destinations,
    confirm_overwrite: F,
) -> Result<ImportResult, ImportError>
where
    F: FnOnce(&ConflictSet) -> bool,
{
    let plan = plan_import(source_dir, destinations)?;
    let overwrite = plan.decide_overwrite(confirm_overwrite);
    Ok(plan.execute(overwrite))
}
