//! Command-line interface module for steam-importer.
//!
//! This module handles all CLI-related functionality including:
//! - Argument parsing
//! - Steam directory setup and status
//! - Import orchestration, dry runs and report output

use crate::config::{ConfigError, ConfigStore, FileConfigStore};
use crate::output::OutputFormatter;
use crate::prompt::{Confirmer, FolderPicker};
use crate::reconcile::{ConflictSet, ImportError, ImportPlan, ImportResult};
use crate::session::{Session, stored_steam_dir};
use crate::target::is_valid_target;
use chrono::{DateTime, Utc};
use clap::{ArgAction, Args, Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const SOURCE_FOLDER_PROMPT: &str = "Select folder with .lua, .manifest, and .st files";

/// Move Steam .lua, .manifest and .st files into place
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file to use instead of the default location
    #[arg(long, global = true, env = "STEAM_IMPORTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: ImportCommand,
}

/// Represents a CLI command to execute.
#[derive(Subcommand, Debug, Clone)]
pub enum ImportCommand {
    /// Validate and save the Steam installation directory
    Setup {
        /// Steam root containing config/stplug-in and config/depotcache.
        /// Prompts when omitted.
        steam_dir: Option<PathBuf>,
    },
    /// Move .lua, .manifest and .st files from a folder into Steam
    Import(ImportOptions),
    /// Show the configured Steam directory
    Status,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ImportOptions {
    /// Folder to import from. Prompts when omitted.
    pub source: Option<PathBuf>,

    /// Replace existing files without asking
    #[arg(long, conflicts_with = "no")]
    pub yes: bool,

    /// Keep existing files without asking
    #[arg(long)]
    pub no: bool,

    /// Show what would be moved without moving anything
    #[arg(long)]
    pub dry_run: bool,

    /// Print the report as JSON
    #[arg(long, conflicts_with = "dry_run")]
    pub json: bool,
}

/// How the batch overwrite question gets answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwritePolicy {
    Ask,
    Always,
    Never,
}

impl ImportOptions {
    pub fn overwrite_policy(&self) -> OverwritePolicy {
        match (self.yes, self.no) {
            (true, _) => OverwritePolicy::Always,
            (false, true) => OverwritePolicy::Never,
            (false, false) => OverwritePolicy::Ask,
        }
    }
}

impl OverwritePolicy {
    pub fn decide<C: Confirmer + ?Sized>(self, conflicts: &ConflictSet, confirmer: &mut C) -> bool {
        match self {
            OverwritePolicy::Always => true,
            OverwritePolicy::Never => false,
            OverwritePolicy::Ask => confirmer.confirm(&format!(
                "{} file(s) already exist in Steam directories ({}). Replace them?",
                conflicts.len(),
                conflicts.iter().collect::<Vec<_>>().join(", ")
            )),
        }
    }
}

/// Errors surfaced to the user by the CLI.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Could not write report: {0}")]
    Report(#[from] serde_json::Error),
}

/// What an import did, as printed with `--json`.
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    pub steam_dir: PathBuf,
    pub source_dir: PathBuf,
    #[serde(flatten)]
    pub result: ImportResult,
    pub finished_at: DateTime<Utc>,
}

/// Runs the CLI application with the given command.
///
/// The configuration file is located from `config_path` or the default
/// location, and questions go through `prompt`.
///
/// # Examples
///
/// ```no_run
/// use steam_importer::cli::{run_cli, ImportCommand};
/// use steam_importer::prompt::TerminalPrompt;
///
/// let result = run_cli(ImportCommand::Status, None, &mut TerminalPrompt::stdio());
/// if let Err(e) = result {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run_cli<P>(
    command: ImportCommand,
    config_path: Option<&Path>,
    prompt: &mut P,
) -> Result<(), CliError>
where
    P: FolderPicker + Confirmer + ?Sized,
{
    let store = FileConfigStore::locate(config_path)?;
    run_cli_with_store(command, store, prompt)
}

/// Runs a command against an explicit configuration store.
pub fn run_cli_with_store<S, P>(
    command: ImportCommand,
    store: S,
    prompt: &mut P,
) -> Result<(), CliError>
where
    S: ConfigStore,
    P: FolderPicker + Confirmer + ?Sized,
{
    match command {
        ImportCommand::Setup { steam_dir } => setup(&store, steam_dir.as_deref(), prompt),
        ImportCommand::Import(options) => import(store, &options, prompt).map(|_| ()),
        ImportCommand::Status => status(&store),
    }
}

/// Validates and saves the Steam directory.
fn setup<S, P>(store: &S, steam_dir: Option<&Path>, prompt: &mut P) -> Result<(), CliError>
where
    S: ConfigStore,
    P: FolderPicker + Confirmer + ?Sized,
{
    let session = match steam_dir {
        Some(dir) => Session::configure(store, dir)?,
        None => Session::resolve(store, prompt)?,
    };
    OutputFormatter::success(&format!(
        "Steam directory set to {}",
        session.target().path().display()
    ));
    Ok(())
}

/// Unreadable configuration is reported the same as none.
fn status<S: ConfigStore>(store: &S) -> Result<(), CliError> {
    match stored_steam_dir(store) {
        Some(dir) if is_valid_target(&dir) => {
            OutputFormatter::success(&format!("Steam directory: {}", dir.display()))
        }
        Some(dir) => OutputFormatter::warning(&format!(
            "Steam directory {} is missing config/stplug-in or config/depotcache. \
             Run 'steam-importer setup'.",
            dir.display()
        )),
        None => {
            OutputFormatter::warning("No Steam directory configured. Run 'steam-importer setup'.")
        }
    }
    Ok(())
}

/// Resolves the session and source folder, then imports.
///
/// Returns `Ok(None)` when the source pick was cancelled or for a dry run.
///
/// This function:
/// 1. Resolves the Steam directory (prompting if needed)
/// 2. Obtains the source folder
/// 3. Classifies its files and detects conflicts
/// 4. Asks the single overwrite question if anything conflicts
/// 5. Moves the files and prints the report
pub fn import<S, P>(
    store: S,
    options: &ImportOptions,
    prompt: &mut P,
) -> Result<Option<ImportReport>, CliError>
where
    S: ConfigStore,
    P: FolderPicker + Confirmer + ?Sized,
{
    let session = Session::resolve(&store, prompt)?;

    let source = match options.source.clone() {
        Some(source) => source,
        None => match prompt.pick_folder(SOURCE_FOLDER_PROMPT) {
            Some(source) => source,
            None => {
                OutputFormatter::info("No folder selected. Nothing was imported.");
                return Ok(None);
            }
        },
    };

    let plan = session.plan(&source)?;

    if options.dry_run {
        print_dry_run(&plan);
        return Ok(None);
    }

    if plan.is_empty() && !options.json {
        OutputFormatter::info(&format!(
            "No .lua, .manifest or .st files found in {}",
            source.display()
        ));
    }

    let policy = options.overwrite_policy();
    let overwrite = plan.decide_overwrite(|conflicts| policy.decide(conflicts, prompt));
    let result = execute_with_progress_bar(&plan, overwrite, !options.json);

    let report = ImportReport {
        steam_dir: session.target().path().to_path_buf(),
        source_dir: source,
        result,
        finished_at: Utc::now(),
    };
    info!(
        source = %report.source_dir.display(),
        moved = report.result.total_moved(),
        "import complete"
    );

    if options.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if !plan.is_empty() {
        print_summary(&report);
    }

    Ok(Some(report))
}

fn execute_with_progress_bar(
    plan: &ImportPlan,
    overwrite: bool,
    show_progress: bool,
) -> ImportResult {
    let pb = if show_progress {
        OutputFormatter::create_progress_bar(plan.moves.len() as u64)
    } else {
        indicatif::ProgressBar::hidden()
    };

    // Failures are listed once, in the summary after the bar clears
    let result = plan.execute_with_progress(overwrite, |planned, _| {
        pb.set_message(planned.file_name.clone());
        pb.inc(1);
    });

    pb.finish_and_clear();
    result
}

fn print_dry_run(plan: &ImportPlan) {
    if plan.is_empty() {
        OutputFormatter::dry_run_notice("No .lua, .manifest or .st files found.");
        return;
    }

    OutputFormatter::plan_listing(plan);
    let conflicts = plan.conflicts();
    if !conflicts.is_empty() {
        OutputFormatter::warning(&format!(
            "{} file(s) already exist and would need confirmation to replace",
            conflicts.len()
        ));
    }
    OutputFormatter::dry_run_notice(&format!(
        "{} file(s) would be moved. No files were modified.",
        plan.moves.len()
    ));
}

fn print_summary(report: &ImportReport) {
    OutputFormatter::summary_table(&report.result);
    if report.result.total_moved() > 0 {
        OutputFormatter::info("Restart Steam for the changes to take effect.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Always(bool);

    impl Confirmer for Always {
        fn confirm(&mut self, _question: &str) -> bool {
            self.0
        }
    }

    #[test]
    fn test_parse_import_flags() {
        let cli =
            Cli::try_parse_from(["steam-importer", "import", "/tmp/src", "--yes", "--json"])
                .expect("parse failed");
        let ImportCommand::Import(options) = cli.command else {
            panic!("expected import command");
        };
        assert_eq!(options.source, Some(PathBuf::from("/tmp/src")));
        assert_eq!(options.overwrite_policy(), OverwritePolicy::Always);
        assert!(options.json);
        assert!(!options.dry_run);
    }

    #[test]
    fn test_yes_and_no_conflict() {
        let result = Cli::try_parse_from(["steam-importer", "import", "--yes", "--no"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_json_and_dry_run_conflict() {
        let result = Cli::try_parse_from(["steam-importer", "import", "--dry-run", "--json"]);
        assert!(result.is_err());

        let cli =
            Cli::try_parse_from(["steam-importer", "import", "--dry-run"]).expect("parse failed");
        assert!(matches!(cli.command, ImportCommand::Import(ref o) if o.dry_run && !o.json));
    }

    #[test]
    fn test_parse_setup_and_global_flags() {
        let cli = Cli::try_parse_from([
            "steam-importer",
            "setup",
            "/opt/steam",
            "-vv",
            "--config",
            "/tmp/c.toml",
        ])
        .expect("parse failed");
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
        assert!(matches!(
            cli.command,
            ImportCommand::Setup { steam_dir: Some(ref dir) } if dir == Path::new("/opt/steam")
        ));
    }

    #[test]
    fn test_default_policy_asks() {
        assert_eq!(ImportOptions::default().overwrite_policy(), OverwritePolicy::Ask);
        let options = ImportOptions {
            no: true,
            ..Default::default()
        };
        assert_eq!(options.overwrite_policy(), OverwritePolicy::Never);
    }

    #[test]
    fn test_policy_only_asks_when_set_to_ask() {
        let conflicts = ConflictSet::default();
        assert!(OverwritePolicy::Always.decide(&conflicts, &mut Always(false)));
        assert!(!OverwritePolicy::Never.decide(&conflicts, &mut Always(true)));
        assert!(OverwritePolicy::Ask.decide(&conflicts, &mut Always(true)));
        assert!(!OverwritePolicy::Ask.decide(&conflicts, &mut Always(false)));
    }
}
