//! Output formatting and styling module.
//!
//! Centralizes everything the CLI prints for the user: colored status lines,
//! the move progress bar, the import plan and the summary table. Diagnostic
//! logging goes through `tracing` instead.

use crate::file_category::FileClass;
use crate::reconcile::{ImportPlan, ImportResult};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use steam_importer::output::OutputFormatter;
    /// OutputFormatter::success("Steam directory saved");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates a progress bar for file moves.
    ///
    /// Falls back to the default bar style if the template is rejected.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style.progress_chars("█▓░"));
        pb
    }

    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Prints every importable file with its destination, marking conflicts.
    pub fn plan_listing(plan: &ImportPlan) {
        Self::header(&format!("Files in {}", plan.source_dir.display()));
        for planned in &plan.moves {
            let marker = if planned.conflicting {
                " (replaces existing)".yellow().to_string()
            } else {
                String::new()
            };
            println!(
                " - {} {} {}{}",
                planned.file_name,
                "→".green(),
                planned.to.display(),
                marker
            );
        }
        if !plan.ignored.is_empty() {
            println!(
                "{}",
                format!("   {} other file(s) ignored", plan.ignored.len()).dimmed()
            );
        }
    }

    /// Prints the per-class summary table of an import.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use steam_importer::output::OutputFormatter;
    /// use steam_importer::reconcile::ImportResult;
    ///
    /// let result = ImportResult { plugin_files: 2, depot_files: 1, ..Default::default() };
    /// OutputFormatter::summary_table(&result);
    /// ```
    pub fn summary_table(result: &ImportResult) {
        Self::header("IMPORTED");

        let width = FileClass::IMPORTABLE
            .iter()
            .map(|class| class.label().len())
            .max()
            .unwrap_or(0)
            .max(8);

        println!("{:<width$} | {}", "Type".bold(), "Files".bold(), width = width);
        println!("{}", "-".repeat(width + 10));

        for class in FileClass::IMPORTABLE {
            let count = result.count(class);
            println!(
                "{:<width$} | {} {}",
                class.label(),
                count.to_string().green(),
                plural(count),
                width = width
            );
        }

        println!("{}", "-".repeat(width + 10));
        let total = result.total_moved();
        println!(
            "{:<width$} | {} {}",
            "Total".bold(),
            total.to_string().green().bold(),
            plural(total),
            width = width
        );

        if !result.skipped.is_empty() {
            Self::warning(&format!(
                "{} existing file(s) kept, not replaced: {}",
                result.skipped.len(),
                result.skipped.join(", ")
            ));
        }
        for failure in &result.failures {
            Self::error(&format!(
                "Could not move {} to {}: {}",
                failure.file_name,
                failure.to.display(),
                failure.reason
            ));
        }
    }
}

fn plural(count: usize) -> &'static str {
    if count == 1 { "file" } else { "files" }
}
