//! Output naming policy and reporting, exercised through real runs.

use std::sync::Mutex;

use pdf_toolbox::output::write_json_report;
use pdf_toolbox::paths::{ensure_unique_path, suffixed_output_path};
use pdf_toolbox::worker::tasks::RotateTask;
use pdf_toolbox::worker::{run_per_file, CancelFlag};
use tempfile::TempDir;

use crate::common::{write_garbage, write_pdf};

#[test]
fn test_repeated_operations_number_their_outputs() {
    let dir = TempDir::new().unwrap();
    let src = write_pdf(&dir, "doc.pdf", 1);
    let task = RotateTask::new(90, None, None);

    let sink = Mutex::new(Vec::new());
    for _ in 0..3 {
        run_per_file(
            std::slice::from_ref(&src),
            &task,
            &sink,
            &CancelFlag::new(),
        );
    }

    assert!(dir.path().join("doc_rotated.pdf").exists());
    assert!(dir.path().join("doc_rotated_1.pdf").exists());
    assert!(dir.path().join("doc_rotated_2.pdf").exists());
}

#[test]
fn test_suffix_goes_before_extension() {
    let dir = TempDir::new().unwrap();
    let src = dir.path().join("report.final.pdf");

    let out = suffixed_output_path(&src, "_unlocked", None);
    assert!(out
        .file_name()
        .unwrap()
        .to_string_lossy()
        .ends_with("_unlocked.pdf"));
}

#[test]
fn test_unique_path_walks_free_slots() {
    let dir = TempDir::new().unwrap();
    for name in ["out.pdf", "out_1.pdf", "out_2.pdf"] {
        std::fs::write(dir.path().join(name), b"x").unwrap();
    }

    let next = ensure_unique_path(dir.path().join("out.pdf"));
    assert_eq!(next, dir.path().join("out_3.pdf"));
}

#[test]
fn test_json_report_from_real_batch() {
    let dir = TempDir::new().unwrap();
    let files = vec![write_pdf(&dir, "ok.pdf", 1), write_garbage(&dir, "bad.pdf")];

    let sink = Mutex::new(Vec::new());
    let results = run_per_file(
        &files,
        &RotateTask::new(90, None, None),
        &sink,
        &CancelFlag::new(),
    );

    let report = dir.path().join("report.json");
    write_json_report(&report, &results).unwrap();

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).unwrap();
    let entries = parsed.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["status"], "success");
    assert_eq!(entries[1]["status"], "failed");
    assert!(entries[0]["output"].as_str().unwrap().contains("ok_rotated"));
}
