//! Output path policy shared by all operations.
//!
//! Every operation writes next to its source file (or into a caller-chosen
//! directory) under a suffixed name, and never clobbers an existing file:
//! colliding names get `_1`, `_2`, ... appended before the extension.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Return `path` unchanged if free, otherwise the first `stem_N.ext`
/// variant that does not exist yet.
///
/// `report.pdf` -> `report_1.pdf` -> `report_2.pdf` -> ...
///
/// # Examples
///
/// ```no_run
/// use pdf_toolbox::paths::ensure_unique_path;
/// use std::path::PathBuf;
///
/// let out = ensure_unique_path(PathBuf::from("report.pdf"));
/// ```
pub fn ensure_unique_path(path: PathBuf) -> PathBuf {
    if !path.exists() {
        return path;
    }

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();
    let parent = path.parent().map(Path::to_path_buf).unwrap_or_default();

    let mut counter = 1usize;
    loop {
        let name = if ext.is_empty() {
            format!("{stem}_{counter}")
        } else {
            format!("{stem}_{counter}.{ext}")
        };
        let candidate = parent.join(name);
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Build the default output path for `src`: `<dir>/<stem><suffix>.<ext>`,
/// made collision-free.
///
/// `dir` defaults to the source file's parent. The suffix goes before the
/// extension: `doc.pdf` with `_rotated` becomes `doc_rotated.pdf`.
pub fn suffixed_output_path(src: &Path, suffix: &str, dir: Option<&Path>) -> PathBuf {
    let parent = dir
        .map(Path::to_path_buf)
        .or_else(|| src.parent().map(Path::to_path_buf))
        .unwrap_or_default();
    let stem = src
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = src
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "pdf".to_string());

    ensure_unique_path(parent.join(format!("{stem}{suffix}.{ext}")))
}

/// Quick sanity check: file exists and starts with the `%PDF-` magic.
///
/// This is a cheap pre-flight guard, not validation; a file passing this
/// check can still be arbitrarily corrupted.
pub fn looks_like_pdf(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    let mut header = [0u8; 5];
    match fs::File::open(path).and_then(|mut f| f.read_exact(&mut header)) {
        Ok(()) => &header == b"%PDF-",
        Err(_) => false,
    }
}

/// Format a byte count as a human-readable string.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}
