//! CLI argument parsing for pdftool.
//!
//! This module defines the command-line interface structure using `clap`.
//! Each subcommand maps onto one batch operation; shared concerns
//! (input expansion, verbosity, report output) live on the top level.
//!
//! # Examples
//!
//! ```no_run
//! use pdf_toolbox::cli::Cli;
//! use clap::Parser;
//!
//! let cli = Cli::parse();
//! println!("quiet: {}", cli.quiet);
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::{Result, ToolboxError};

/// Batch toolbox for PDF files.
///
/// pdftool unlocks, merges, splits, rotates, watermarks, compresses,
/// reorders, protects and rasterizes PDF files, processing whole
/// batches with per-file error reporting.
#[derive(Parser, Debug)]
#[command(name = "pdftool")]
#[command(version)]
#[command(about = "Batch toolbox for PDF files", long_about = None)]
#[command(author)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// The operation to run.
    #[command(subcommand)]
    pub command: Command,

    /// Suppress all non-error output
    ///
    /// Only the final summary and errors are printed.
    /// Useful for scripts and automation.
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Verbose output - also print worker log lines
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write a JSON report of per-file results to this path
    #[arg(long, global = true, value_name = "FILE")]
    pub report: Option<PathBuf>,
}

/// One subcommand per operation.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Remove passwords and restrictions, repairing damaged files
    ///
    /// Tries a chain of engines in order (rebuild, sanitize, resave,
    /// ghostscript when installed, raw copy) and keeps the first
    /// verified output. Writes <stem>_unlocked.pdf next to each input.
    Unlock {
        /// Input PDF files or glob patterns
        #[arg(required = true, value_name = "FILE")]
        inputs: Vec<String>,

        /// Password for encrypted inputs
        #[arg(short, long, value_name = "TEXT")]
        password: Option<String>,

        /// Directory for output files (defaults to each input's directory)
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Merge all inputs into a single document, in argument order
    Merge {
        /// Input PDF files or glob patterns (at least two)
        #[arg(required = true, value_name = "FILE")]
        inputs: Vec<String>,

        /// Output PDF file path
        ///
        /// An existing file is never overwritten; a numbered
        /// variant is chosen instead.
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,

        /// Password for encrypted inputs
        #[arg(short, long, value_name = "TEXT")]
        password: Option<String>,
    },

    /// Split each input into smaller documents
    Split {
        /// Input PDF files or glob patterns
        #[arg(required = true, value_name = "FILE")]
        inputs: Vec<String>,

        /// 1-based page ranges, one output per range (e.g. "1-3,5,7-10")
        #[arg(short = 'r', long, value_name = "RANGES", group = "mode")]
        pages: Option<String>,

        /// Split into chunks of N pages
        #[arg(short, long, value_name = "N", group = "mode")]
        every: Option<usize>,

        /// Extract the listed 1-based pages into one document (e.g. "1,3,5")
        #[arg(short = 'x', long, value_name = "PAGES", group = "mode")]
        extract: Option<String>,

        /// Directory for output files
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Password for encrypted inputs
        #[arg(short, long, value_name = "TEXT")]
        password: Option<String>,
    },

    /// Rotate pages clockwise
    Rotate {
        /// Input PDF files or glob patterns
        #[arg(required = true, value_name = "FILE")]
        inputs: Vec<String>,

        /// Rotation in degrees: 90, 180 or 270
        #[arg(short, long, value_name = "DEGREES")]
        degrees: i64,

        /// Only rotate these 1-based pages (e.g. "1,3,5"); default is all
        #[arg(long, value_name = "PAGES")]
        pages: Option<String>,

        /// Directory for output files
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Password for encrypted inputs
        #[arg(short, long, value_name = "TEXT")]
        password: Option<String>,
    },

    /// Stamp a text watermark across pages
    Watermark {
        /// Input PDF files or glob patterns
        #[arg(required = true, value_name = "FILE")]
        inputs: Vec<String>,

        /// The text to stamp
        #[arg(short, long, value_name = "TEXT")]
        text: String,

        /// Font size in points
        #[arg(long, value_name = "PT", default_value_t = 48.0)]
        font_size: f32,

        /// Opacity between 0 and 1
        #[arg(long, value_name = "ALPHA", default_value_t = 0.3)]
        opacity: f32,

        /// Counter-clockwise rotation of the stamp in degrees
        #[arg(long, value_name = "DEGREES", default_value_t = 45.0)]
        angle: f32,

        /// Only stamp these 1-based pages; default is all
        #[arg(long, value_name = "PAGES")]
        pages: Option<String>,

        /// Directory for output files
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Password for encrypted inputs
        #[arg(short, long, value_name = "TEXT")]
        password: Option<String>,
    },

    /// Shrink files, resampling images via Ghostscript when available
    Compress {
        /// Input PDF files or glob patterns
        #[arg(required = true, value_name = "FILE")]
        inputs: Vec<String>,

        /// Compression strength
        ///
        /// - low: keep print quality
        /// - medium: good quality, noticeable savings
        /// - high: screen-reading quality
        /// - maximum: smallest output
        #[arg(short, long, value_name = "LEVEL", default_value = "medium")]
        #[arg(value_parser = ["low", "medium", "high", "maximum"])]
        level: String,

        /// Directory for output files
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Password for encrypted inputs
        #[arg(short, long, value_name = "TEXT")]
        password: Option<String>,
    },

    /// Rearrange pages into a new order
    Reorder {
        /// Input PDF files or glob patterns
        #[arg(required = true, value_name = "FILE")]
        inputs: Vec<String>,

        /// The new page order as 1-based indices (e.g. "3,1,2"),
        /// listing every page exactly once
        #[arg(short = 'O', long, value_name = "ORDER")]
        order: String,

        /// Directory for output files
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Password for encrypted inputs
        #[arg(short, long, value_name = "TEXT")]
        password: Option<String>,
    },

    /// Password-protect files (requires Ghostscript)
    ///
    /// The output allows printing but denies content extraction.
    Protect {
        /// Input PDF files or glob patterns
        #[arg(required = true, value_name = "FILE")]
        inputs: Vec<String>,

        /// Password required to open the output
        #[arg(short, long, value_name = "TEXT")]
        password: String,

        /// Owner password that lifts restrictions (defaults to the
        /// user password)
        #[arg(long, value_name = "TEXT")]
        owner_password: Option<String>,

        /// Directory for output files
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Render pages to PNG images (requires poppler-utils)
    Convert {
        /// Input PDF files or glob patterns
        #[arg(required = true, value_name = "FILE")]
        inputs: Vec<String>,

        /// Render resolution in dots per inch
        #[arg(short, long, value_name = "DPI", default_value_t = 300)]
        dpi: u32,

        /// Base directory for the per-file image folders
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// List the repair engines available on this system
    Engines,
}

/// Expand inputs that may be literal paths or glob patterns, in
/// argument order, without duplicates.
///
/// A pattern that matches nothing is an error; so is an empty final
/// list.
///
/// # Errors
///
/// Returns [`ToolboxError::FileNotFound`] for a non-matching literal
/// path or pattern, [`ToolboxError::NoFilesToProcess`] when nothing
/// remains.
pub fn expand_inputs(inputs: &[String]) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = Vec::new();

    for input in inputs {
        let literal = PathBuf::from(input);
        if literal.exists() {
            push_unique(&mut files, literal);
            continue;
        }

        let matches = glob::glob(input)
            .map_err(|e| ToolboxError::invalid_config(format!("bad pattern '{input}': {e}")))?;
        let mut matched_any = false;
        for entry in matches.filter_map(std::result::Result::ok) {
            matched_any = true;
            push_unique(&mut files, entry);
        }
        if !matched_any {
            return Err(ToolboxError::file_not_found(literal));
        }
    }

    if files.is_empty() {
        return Err(ToolboxError::NoFilesToProcess);
    }
    Ok(files)
}

fn push_unique(files: &mut Vec<PathBuf>, path: PathBuf) {
    if !files.contains(&path) {
        files.push(path);
    }
}

/// Parse a 1-based comma-separated page list ("1,3,5") into 0-based
/// indices.
///
/// # Errors
///
/// Returns [`ToolboxError::InvalidConfig`] for anything that is not a
/// positive integer list.
pub fn parse_page_list(expr: &str) -> Result<Vec<usize>> {
    let mut pages = Vec::new();
    for token in expr.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let page: usize = token.parse().map_err(|_| {
            ToolboxError::invalid_config(format!("invalid page number '{token}'"))
        })?;
        if page == 0 {
            return Err(ToolboxError::invalid_config("page numbers start at 1"));
        }
        pages.push(page - 1);
    }
    if pages.is_empty() {
        return Err(ToolboxError::invalid_config(format!(
            "no page numbers in '{expr}'"
        )));
    }
    Ok(pages)
}
