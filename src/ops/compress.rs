//! Shrink a PDF, preferring Ghostscript's resampling pipeline.

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::doc::{load_document, save_document};
use crate::error::{Result, ToolboxError};
use crate::repair::find_ghostscript;

/// How hard to compress. Stronger presets resample images more
/// aggressively and cost more visual quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressPreset {
    /// Keep print-quality images (Ghostscript `/prepress`).
    Low,
    /// Good quality, noticeable savings (`/printer`).
    Medium,
    /// Screen-reading quality (`/ebook`).
    High,
    /// Smallest output, lowest quality (`/screen`).
    Maximum,
}

impl CompressPreset {
    /// The Ghostscript `-dPDFSETTINGS` value for this preset.
    pub fn gs_setting(self) -> &'static str {
        match self {
            CompressPreset::Low => "/prepress",
            CompressPreset::Medium => "/printer",
            CompressPreset::High => "/ebook",
            CompressPreset::Maximum => "/screen",
        }
    }

    /// Lowercase name used on the command line and in log lines.
    pub fn label(self) -> &'static str {
        match self {
            CompressPreset::Low => "low",
            CompressPreset::Medium => "medium",
            CompressPreset::High => "high",
            CompressPreset::Maximum => "maximum",
        }
    }
}

/// What a compression run produced.
#[derive(Debug, Clone)]
pub struct CompressOutcome {
    /// Path of the compressed document.
    pub output: PathBuf,
    /// Input size in bytes.
    pub original_size: u64,
    /// Output size in bytes.
    pub compressed_size: u64,
    /// Which backend did the work: `"ghostscript"` or `"structural"`.
    pub backend: &'static str,
}

impl CompressOutcome {
    /// Size reduction as a percentage of the original, negative when
    /// the output grew.
    pub fn reduction_percent(&self) -> f64 {
        if self.original_size == 0 {
            return 0.0;
        }
        let saved = self.original_size as f64 - self.compressed_size as f64;
        saved / self.original_size as f64 * 100.0
    }
}

/// Compress `src` into `dst` with the given preset.
///
/// Uses Ghostscript when it is installed. Without it, falls back to a
/// structural pass (re-serialize with compressed streams and pruned
/// objects), which never resamples images and saves correspondingly
/// less.
///
/// # Errors
///
/// Returns an error when the source is unreadable, Ghostscript exits
/// nonzero, or the output cannot be written.
pub fn compress_pdf(
    src: &Path,
    dst: &Path,
    preset: CompressPreset,
    password: Option<&str>,
) -> Result<CompressOutcome> {
    let original_size = std::fs::metadata(src)
        .map_err(|_| ToolboxError::file_not_found(src.to_path_buf()))?
        .len();

    let (compressed_size, backend) = match find_ghostscript() {
        Some(gs) => (ghostscript_compress(&gs, src, dst, preset)?, "ghostscript"),
        None => (structural_compress(src, dst, password)?, "structural"),
    };

    Ok(CompressOutcome {
        output: dst.to_path_buf(),
        original_size,
        compressed_size,
        backend,
    })
}

fn ghostscript_compress(
    gs: &str,
    src: &Path,
    dst: &Path,
    preset: CompressPreset,
) -> Result<u64> {
    let output = Command::new(gs)
        .arg("-sDEVICE=pdfwrite")
        .arg("-dCompatibilityLevel=1.4")
        .arg(format!("-dPDFSETTINGS={}", preset.gs_setting()))
        .arg("-dNOPAUSE")
        .arg("-dQUIET")
        .arg("-dBATCH")
        .arg(format!("-sOutputFile={}", dst.display()))
        .arg(src)
        .output()
        .map_err(|e| ToolboxError::ToolFailed {
            tool: "ghostscript".to_string(),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        return Err(ToolboxError::ToolFailed {
            tool: "ghostscript".to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    let size = std::fs::metadata(dst).map(|m| m.len()).unwrap_or(0);
    if size == 0 {
        return Err(ToolboxError::ToolFailed {
            tool: "ghostscript".to_string(),
            stderr: "produced an empty output file".to_string(),
        });
    }
    Ok(size)
}

fn structural_compress(src: &Path, dst: &Path, password: Option<&str>) -> Result<u64> {
    let mut doc = load_document(src, password)?;
    doc.prune_objects();
    doc.renumber_objects();
    doc.compress();
    save_document(&mut doc, dst)
}
