//! Interactive questions asked during setup and import.
//!
//! The import logic never talks to the terminal directly. It asks through
//! [`FolderPicker`] and [`Confirmer`], so tests can answer with scripted
//! values.

use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::warn;

/// Chooses a directory. `None` means the user cancelled.
pub trait FolderPicker {
    fn pick_folder(&mut self, title: &str) -> Option<PathBuf>;
}

/// Asks a yes/no question.
pub trait Confirmer {
    fn confirm(&mut self, question: &str) -> bool;
}

/// Line-based prompts over any reader/writer pair.
///
/// An empty line or end of input cancels a folder pick. Only `y` or `yes`
/// (any case) confirms a question.
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompt<io::StdinLock<'static>, io::Stderr> {
    /// Reads from stdin and writes questions to stderr, keeping stdout clean
    /// for reports.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, question: &str) -> Option<String> {
        let asked = write!(self.output, "{} ", question.magenta())
            .and_then(|()| self.output.flush());
        if let Err(e) = asked {
            warn!(error = %e, "could not write prompt");
        }

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim().to_string()),
            Err(e) => {
                warn!(error = %e, "could not read answer");
                None
            }
        }
    }
}

impl<R: BufRead, W: Write> FolderPicker for TerminalPrompt<R, W> {
    fn pick_folder(&mut self, title: &str) -> Option<PathBuf> {
        self.ask(&format!("{title} (empty to cancel):"))
            .filter(|answer| !answer.is_empty())
            .map(PathBuf::from)
    }
}

impl<R: BufRead, W: Write> Confirmer for TerminalPrompt<R, W> {
    fn confirm(&mut self, question: &str) -> bool {
        self.ask(&format!("{question} (y/n):"))
            .is_some_and(|answer| {
                answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
            })
    }
}
