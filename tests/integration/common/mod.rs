//! Shared fixtures for the integration tests.
//!
//! Fixtures are generated programmatically rather than checked in as
//! binary files, so every test starts from a known-good document.

use std::path::{Path, PathBuf};

use pdf_toolbox::doc::{load_document, minimal_document_with_pages, save_document};
use tempfile::TempDir;

/// Write a valid PDF with `pages` pages into `dir`.
pub fn write_pdf(dir: &TempDir, name: &str, pages: usize) -> PathBuf {
    let path = dir.path().join(name);
    let mut doc = minimal_document_with_pages(pages);
    save_document(&mut doc, &path).unwrap();
    path
}

/// Write a file that is not a PDF at all.
pub fn write_garbage(dir: &TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, b"this is not a pdf").unwrap();
    path
}

/// Page count of a PDF on disk.
pub fn page_count(path: &Path) -> usize {
    load_document(path, None).unwrap().get_pages().len()
}
