//! The batch worker driving real operations end to end.

use std::sync::Mutex;

use pdf_toolbox::worker::tasks::{RotateTask, UnlockTask};
use pdf_toolbox::worker::{
    run_per_file, BatchWorker, CancelFlag, TaskStatus, WorkerEvent,
};
use tempfile::TempDir;

use crate::common::{page_count, write_garbage, write_pdf};

#[tokio::test]
async fn test_rotate_batch_with_one_bad_file() {
    let dir = TempDir::new().unwrap();
    let files = vec![
        write_pdf(&dir, "a.pdf", 1),
        write_garbage(&dir, "bad.pdf"),
        write_pdf(&dir, "c.pdf", 2),
    ];

    let (handle, mut events) = BatchWorker::new(files).spawn(RotateTask::new(90, None, None));

    let mut progress = Vec::new();
    let mut completions = Vec::new();
    let mut terminal = None;
    while let Some(event) = events.recv().await {
        match event {
            WorkerEvent::Progress { current, total, .. } => progress.push((current, total)),
            WorkerEvent::FileCompleted { name, success, .. } => completions.push((name, success)),
            WorkerEvent::Finished {
                success,
                cancelled,
                summary,
                ..
            } => terminal = Some((success, cancelled, summary)),
            WorkerEvent::Log(_) => {}
        }
    }

    assert_eq!(progress, vec![(1, 3), (2, 3), (3, 3)]);
    assert_eq!(completions.len(), 3);
    assert!(completions[0].1);
    assert!(!completions[1].1);
    assert!(completions[2].1);

    let (success, cancelled, summary) = terminal.expect("no terminal event");
    assert!(success);
    assert!(!cancelled);
    assert_eq!(summary, "completed, 2/3 succeeded");

    let results = handle.join().await.unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[1].status, TaskStatus::Failed);

    assert!(dir.path().join("a_rotated.pdf").exists());
    assert!(!dir.path().join("bad_rotated.pdf").exists());
    assert!(dir.path().join("c_rotated.pdf").exists());
}

#[tokio::test]
async fn test_empty_batch_terminates_immediately() {
    let (handle, mut events) = BatchWorker::new(Vec::new()).spawn(RotateTask::new(90, None, None));

    let mut event_count = 0;
    let mut summary = None;
    while let Some(event) = events.recv().await {
        event_count += 1;
        if let WorkerEvent::Finished { summary: s, .. } = event {
            summary = Some(s);
        }
    }

    assert_eq!(event_count, 1);
    assert_eq!(summary.as_deref(), Some("no files to process"));
    assert!(handle.join().await.unwrap().is_empty());
}

#[test]
fn test_cancellation_before_start_skips_every_file() {
    let dir = TempDir::new().unwrap();
    let files = vec![write_pdf(&dir, "a.pdf", 1), write_pdf(&dir, "b.pdf", 1)];

    let cancel = CancelFlag::new();
    cancel.cancel();
    let sink = Mutex::new(Vec::new());
    let results = run_per_file(&files, &RotateTask::new(90, None, None), &sink, &cancel);

    assert!(results.is_empty());
    assert!(!dir.path().join("a_rotated.pdf").exists());

    let events = sink.into_inner().unwrap();
    match events.last() {
        Some(WorkerEvent::Finished {
            success, cancelled, ..
        }) => {
            assert!(!success);
            assert!(cancelled);
        }
        other => panic!("unexpected terminal event: {other:?}"),
    }
}

#[tokio::test]
async fn test_unlock_batch_end_to_end() {
    let dir = TempDir::new().unwrap();
    let files = vec![write_pdf(&dir, "x.pdf", 2), write_pdf(&dir, "y.pdf", 1)];

    let (handle, mut events) = BatchWorker::new(files).spawn(UnlockTask::new(None, None));
    while events.recv().await.is_some() {}

    let results = handle.join().await.unwrap();
    assert!(results.iter().all(|r| r.is_success()));
    assert!(results.iter().all(|r| !r.engine.is_empty()));

    let x_out = dir.path().join("x_unlocked.pdf");
    assert!(x_out.exists());
    assert_eq!(page_count(&x_out), 2);
}

#[tokio::test]
async fn test_rerun_does_not_clobber_previous_outputs() {
    let dir = TempDir::new().unwrap();
    let src = write_pdf(&dir, "doc.pdf", 1);

    for _ in 0..2 {
        let (handle, mut events) =
            BatchWorker::new(vec![src.clone()]).spawn(UnlockTask::new(None, None));
        while events.recv().await.is_some() {}
        handle.join().await.unwrap();
    }

    assert!(dir.path().join("doc_unlocked.pdf").exists());
    assert!(dir.path().join("doc_unlocked_1.pdf").exists());
}

#[tokio::test]
async fn test_prepare_failure_is_batch_fatal() {
    let dir = TempDir::new().unwrap();
    let src = write_pdf(&dir, "doc.pdf", 1);

    // 45 degrees fails validation before any file is touched.
    let (handle, mut events) =
        BatchWorker::new(vec![src]).spawn(RotateTask::new(45, None, None));

    let mut events_seen = 0;
    while let Some(event) = events.recv().await {
        events_seen += 1;
        if let WorkerEvent::Finished { success, summary, .. } = event {
            assert!(!success);
            assert!(summary.contains("90, 180 or 270"));
        }
    }
    assert_eq!(events_seen, 1);
    assert!(handle.join().await.unwrap().is_empty());
    assert!(!dir.path().join("doc_rotated.pdf").exists());
}
