//! Render PDF pages to PNG images with `pdftoppm`.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Result, ToolboxError};

/// Default render resolution in dots per inch.
pub const DEFAULT_DPI: u32 = 300;

/// What a conversion produced.
#[derive(Debug, Clone)]
pub struct ConvertOutcome {
    /// The written images, sorted by page number.
    pub outputs: Vec<PathBuf>,
}

/// Whether `pdftoppm` (poppler-utils) is on the PATH.
///
/// Same contract as the Ghostscript probe: the command must run and
/// exit 0. "Command not found" and "nonzero exit" are the same signal.
pub fn find_pdftoppm() -> Option<String> {
    let candidate = "pdftoppm";
    runs_cleanly(candidate, "-v").then(|| candidate.to_string())
}

fn runs_cleanly(cmd: &str, arg: &str) -> bool {
    match Command::new(cmd).arg(arg).output() {
        Ok(out) => out.status.success(),
        Err(_) => false,
    }
}

/// Render every page of `src` to a PNG in `output_dir` at `dpi`.
///
/// Images are named `<stem>-<page>.png` by pdftoppm. Requires
/// poppler-utils.
///
/// # Errors
///
/// Returns [`ToolboxError::ToolNotFound`] when pdftoppm is missing,
/// [`ToolboxError::ToolFailed`] when it exits nonzero or renders
/// nothing, and I/O errors when the output directory cannot be created.
pub fn pdf_to_images(src: &Path, output_dir: &Path, dpi: u32) -> Result<ConvertOutcome> {
    if !src.exists() {
        return Err(ToolboxError::file_not_found(src.to_path_buf()));
    }
    let tool = find_pdftoppm().ok_or_else(|| {
        ToolboxError::tool_not_found(
            "pdftoppm",
            "install poppler-utils to convert PDFs to images (e.g. apt install poppler-utils)",
        )
    })?;

    std::fs::create_dir_all(output_dir).map_err(|e| ToolboxError::FailedToCreateOutputDir {
        path: output_dir.to_path_buf(),
        source: e,
    })?;

    let stem = src
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "page".to_string());
    let prefix = output_dir.join(&stem);

    let output = Command::new(&tool)
        .arg("-png")
        .arg("-r")
        .arg(dpi.to_string())
        .arg(src)
        .arg(&prefix)
        .output()
        .map_err(|e| ToolboxError::ToolFailed {
            tool: "pdftoppm".to_string(),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(ToolboxError::ToolFailed {
            tool: "pdftoppm".to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    let pattern = format!("{}-*.png", prefix.display());
    let mut outputs: Vec<PathBuf> = glob::glob(&pattern)
        .map_err(|e| ToolboxError::operation_failed("convert", e.to_string()))?
        .filter_map(std::result::Result::ok)
        .collect();
    outputs.sort();

    if outputs.is_empty() {
        return Err(ToolboxError::ToolFailed {
            tool: "pdftoppm".to_string(),
            stderr: "no images were produced".to_string(),
        });
    }

    Ok(ConvertOutcome { outputs })
}
