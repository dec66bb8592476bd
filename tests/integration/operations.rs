//! Cross-operation flows over real documents.

use pdf_toolbox::doc::load_document;
use pdf_toolbox::ops::{
    compress_pdf, merge_pdfs, pdf_to_images, protect_pdf, reorder_pdf, rotate_pdf, split_pdf,
    watermark_pdf, CompressPreset, SplitMode, WatermarkOptions,
};
use pdf_toolbox::ops::convert::find_pdftoppm;
use pdf_toolbox::repair::find_ghostscript;
use tempfile::TempDir;

use crate::common::{page_count, write_pdf};

#[test]
fn test_merge_then_split_roundtrip() {
    let dir = TempDir::new().unwrap();
    let a = write_pdf(&dir, "a.pdf", 2);
    let b = write_pdf(&dir, "b.pdf", 3);
    let merged = dir.path().join("merged.pdf");

    let outcome = merge_pdfs(&[a, b], &merged, None).unwrap();
    assert_eq!(outcome.total_pages, 5);

    let split = split_pdf(&merged, None, &SplitMode::EveryN(2), None).unwrap();
    assert_eq!(split.outputs.len(), 3);
    assert_eq!(page_count(&split.outputs[0]), 2);
    assert_eq!(page_count(&split.outputs[2]), 1);
}

#[test]
fn test_watermark_then_rotate_composes() {
    let dir = TempDir::new().unwrap();
    let src = write_pdf(&dir, "doc.pdf", 2);
    let stamped = dir.path().join("stamped.pdf");
    let rotated = dir.path().join("rotated.pdf");

    watermark_pdf(&src, &stamped, &WatermarkOptions::new("DRAFT"), None, None).unwrap();
    rotate_pdf(&stamped, &rotated, 180, None, None).unwrap();

    let doc = load_document(&rotated, None).unwrap();
    let text = doc.extract_text(&[1]).unwrap_or_default();
    assert!(text.contains("DRAFT"));
    assert!(text.contains("page 1"));
}

#[test]
fn test_split_ranges_clamp_to_document() {
    let dir = TempDir::new().unwrap();
    let src = write_pdf(&dir, "doc.pdf", 4);

    let mode = SplitMode::Ranges("1-2,3-99".to_string());
    let outcome = split_pdf(&src, None, &mode, None).unwrap();

    assert_eq!(outcome.outputs.len(), 2);
    assert_eq!(page_count(&outcome.outputs[1]), 2);
}

#[test]
fn test_reorder_then_merge_keeps_order() {
    let dir = TempDir::new().unwrap();
    let src = write_pdf(&dir, "doc.pdf", 3);
    let reversed = dir.path().join("reversed.pdf");

    reorder_pdf(&src, &reversed, &[2, 1, 0], None).unwrap();

    let merged = dir.path().join("merged.pdf");
    merge_pdfs(&[reversed.clone(), src], &merged, None).unwrap();

    let doc = load_document(&merged, None).unwrap();
    assert_eq!(doc.get_pages().len(), 6);
    let first = doc.extract_text(&[1]).unwrap_or_default();
    assert!(first.contains("page 3"), "expected reversed front: {first:?}");
}

#[test]
fn test_compress_output_stays_loadable() {
    let dir = TempDir::new().unwrap();
    let src = write_pdf(&dir, "doc.pdf", 3);
    let dst = dir.path().join("small.pdf");

    let outcome = compress_pdf(&src, &dst, CompressPreset::High, None).unwrap();
    assert!(outcome.compressed_size > 0);
    assert_eq!(page_count(&dst), 3);
}

#[test]
fn test_protect_then_open_with_password() {
    if find_ghostscript().is_none() {
        return; // needs Ghostscript installed
    }

    let dir = TempDir::new().unwrap();
    let src = write_pdf(&dir, "doc.pdf", 1);
    let dst = dir.path().join("locked.pdf");

    protect_pdf(&src, &dst, "s3cret", None).unwrap();

    assert!(load_document(&dst, Some("s3cret")).is_ok());
}

#[test]
fn test_convert_renders_per_page_images() {
    if find_pdftoppm().is_none() {
        return; // needs poppler-utils installed
    }

    let dir = TempDir::new().unwrap();
    let src = write_pdf(&dir, "doc.pdf", 3);
    let out = dir.path().join("images");

    let outcome = pdf_to_images(&src, &out, 72).unwrap();
    assert_eq!(outcome.outputs.len(), 3);
}
