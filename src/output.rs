//! Terminal output and machine-readable reports.

use std::io::Write;
use std::path::Path;

use crate::error::{Result, ToolboxError};
use crate::worker::FileTaskResult;

const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// Formats worker events for the terminal.
///
/// `quiet` drops everything except errors and the final summary;
/// `verbose` additionally prints log lines. Color is applied only when
/// stderr is a terminal.
#[derive(Debug, Clone)]
pub struct OutputFormatter {
    quiet: bool,
    verbose: bool,
    color: bool,
}

impl OutputFormatter {
    /// A formatter honoring the given verbosity flags.
    pub fn new(quiet: bool, verbose: bool) -> Self {
        OutputFormatter {
            quiet,
            verbose,
            color: std::io::IsTerminal::is_terminal(&std::io::stderr()),
        }
    }

    #[cfg(test)]
    fn plain(quiet: bool, verbose: bool) -> Self {
        OutputFormatter {
            quiet,
            verbose,
            color: false,
        }
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.color {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    /// A `[current/total]` progress line.
    pub fn progress(&self, current: usize, total: usize, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = self.paint(DIM, &format!("[{current}/{total}]"));
        eprintln!("{prefix} {message}");
    }

    /// A per-file completion line. The message already carries its own
    /// glyph; color just reinforces it.
    pub fn file_completed(&self, success: bool, message: &str) {
        if self.quiet {
            return;
        }
        let color = if success { GREEN } else { RED };
        eprintln!("{}", self.paint(color, message));
    }

    /// A log line, shown only in verbose mode.
    pub fn log(&self, message: &str) {
        if self.verbose && !self.quiet {
            eprintln!("{}", self.paint(DIM, message));
        }
    }

    /// The final run summary. Printed even in quiet mode.
    pub fn finished(&self, success: bool, summary: &str) {
        let color = if success { GREEN } else { RED };
        eprintln!("{}", self.paint(color, summary));
    }

    /// An error that ended the run. Printed even in quiet mode.
    pub fn error(&self, err: &ToolboxError) {
        eprintln!("{}", self.error_line(err));
    }

    fn error_line(&self, err: &ToolboxError) -> String {
        self.paint(RED, &format!("error: {err}"))
    }
}

/// Write the per-file results as a JSON report.
///
/// # Errors
///
/// Returns an error if the file cannot be created or serialization
/// fails.
pub fn write_json_report(path: &Path, results: &[FileTaskResult]) -> Result<()> {
    let file = std::fs::File::create(path).map_err(|e| ToolboxError::FailedToWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, results)
        .map_err(|e| ToolboxError::other(format!("failed to serialize report: {e}")))?;
    writer.flush().map_err(|e| ToolboxError::FailedToWrite {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}
