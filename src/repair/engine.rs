//! Repair engines and their adapters.
//!
//! Each engine exposes the same contract through [`Engine::attempt`]:
//! read `src`, write a candidate repair to `dst`, report a [`RepairOutcome`].
//! Adapters never let an error escape - every fallible body is wrapped at
//! the adapter boundary and converted into a failed outcome carrying the
//! diagnostic, so the orchestrator only ever sees result values.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::doc;
use crate::error::Result;
use crate::repair::probe::find_ghostscript;

/// One interchangeable repair backend.
///
/// The declaration order is the fixed priority order: highest fidelity
/// first, guaranteed-terminating fallback last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    /// Decrypt, then import every page into a freshly built document.
    Rebuild,
    /// Decrypt and structurally clean the existing document in place.
    Sanitize,
    /// Load and re-serialize; often repairs xref corruption as a side effect.
    Resave,
    /// External Ghostscript rewrite through the `pdfwrite` device.
    Ghostscript,
    /// Byte-for-byte copy of the source. The terminal fallback.
    RawCopy,
}

impl Engine {
    /// Stable lowercase label, used in attempt callbacks and task results.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Rebuild => "rebuild",
            Self::Sanitize => "sanitize",
            Self::Resave => "resave",
            Self::Ghostscript => "ghostscript",
            Self::RawCopy => "raw-copy",
        }
    }

    /// Attempt to repair `src` into `dst`.
    ///
    /// Never panics and never returns an error: failures come back as
    /// `RepairOutcome { succeeded: false, .. }` with a diagnostic message.
    pub fn attempt(self, src: &Path, dst: &Path, password: Option<&str>) -> RepairOutcome {
        let result = match self {
            Self::Rebuild => rebuild(src, dst, password),
            Self::Sanitize => sanitize(src, dst, password),
            Self::Resave => resave(src, dst, password),
            Self::Ghostscript => return ghostscript(src, dst),
            Self::RawCopy => raw_copy(src, dst),
        };

        match result {
            Ok(message) => RepairOutcome::success(self, message, dst.to_path_buf()),
            Err(e) => RepairOutcome::failure(Some(self), e.to_string()),
        }
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Result of one repair attempt, or of a whole chain run.
#[derive(Debug, Clone)]
pub struct RepairOutcome {
    /// Whether the attempt produced a usable output.
    pub succeeded: bool,
    /// The engine that produced this outcome; `None` only for chain
    /// exhaustion.
    pub engine: Option<Engine>,
    /// Human-readable description of what happened.
    pub message: String,
    /// Where the output was written, when `succeeded` is true.
    pub output_path: Option<PathBuf>,
}

impl RepairOutcome {
    /// Successful outcome for `engine`.
    pub fn success(engine: Engine, message: impl Into<String>, output: PathBuf) -> Self {
        Self {
            succeeded: true,
            engine: Some(engine),
            message: message.into(),
            output_path: Some(output),
        }
    }

    /// Failed outcome, optionally attributed to an engine.
    pub fn failure(engine: Option<Engine>, message: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            engine,
            message: message.into(),
            output_path: None,
        }
    }
}

/// Full rebuild: decrypt, then carry every page into a fresh document.
fn rebuild(src: &Path, dst: &Path, password: Option<&str>) -> Result<String> {
    let source = doc::load_document(src, password)?;
    let pages = doc::page_ids(&source).len();
    let indices: Vec<usize> = (0..pages).collect();
    let mut rebuilt = doc::select_pages(&source, &indices)?;
    doc::save_document(&mut rebuilt, dst)?;
    Ok(format!("rebuilt {pages} pages into a fresh document"))
}

/// Structural cleanup on the existing document: drop the encryption
/// dictionary, prune unreachable objects, renumber, recompress.
fn sanitize(src: &Path, dst: &Path, password: Option<&str>) -> Result<String> {
    let mut document = doc::load_document(src, password)?;
    document.trailer.remove(b"Encrypt");
    document.prune_objects();
    document.renumber_objects();
    document.compress();
    doc::save_document(&mut document, dst)?;
    Ok("sanitized document structure".to_string())
}

/// Plain load + save. Re-serialization rebuilds the xref table and stream
/// lengths, which is enough for a surprising amount of corruption.
fn resave(src: &Path, dst: &Path, password: Option<&str>) -> Result<String> {
    let mut document = doc::load_document(src, password)?;
    document.trailer.remove(b"Encrypt");
    doc::save_document(&mut document, dst)?;
    Ok("re-serialized document".to_string())
}

/// Rewrite through Ghostscript's `pdfwrite` device.
fn ghostscript(src: &Path, dst: &Path) -> RepairOutcome {
    let Some(gs) = find_ghostscript() else {
        return RepairOutcome::failure(Some(Engine::Ghostscript), "Ghostscript not installed");
    };

    let output = Command::new(&gs)
        .arg("-sDEVICE=pdfwrite")
        .arg("-dCompatibilityLevel=1.4")
        .arg("-dPDFSETTINGS=/prepress")
        .arg("-dNOPAUSE")
        .arg("-dQUIET")
        .arg("-dBATCH")
        .arg(format!("-sOutputFile={}", dst.display()))
        .arg(src)
        .output();

    match output {
        Ok(out) if out.status.success() => RepairOutcome::success(
            Engine::Ghostscript,
            "rewritten by Ghostscript",
            dst.to_path_buf(),
        ),
        Ok(out) => RepairOutcome::failure(
            Some(Engine::Ghostscript),
            format!(
                "Ghostscript failed: {}",
                String::from_utf8_lossy(&out.stderr).trim()
            ),
        ),
        Err(e) => RepairOutcome::failure(
            Some(Engine::Ghostscript),
            format!("failed to run {gs}: {e}"),
        ),
    }
}

/// Last resort: duplicate the input unmodified.
fn raw_copy(src: &Path, dst: &Path) -> Result<String> {
    std::fs::copy(src, dst)?;
    Ok("copied file unmodified".to_string())
}
