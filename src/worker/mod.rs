//! Background batch execution.
//!
//! Every operation in this crate runs through the same harness: a
//! [`FileTask`] describes how to process one file, and [`BatchWorker`]
//! drives it over a list of inputs on a blocking thread, reporting
//! progress through a channel of [`WorkerEvent`]s.
//!
//! The harness guarantees:
//!
//! - at most one task runs at a time per worker (files are processed
//!   sequentially, in input order),
//! - a failure on one file never aborts the rest of the batch,
//! - cancellation is checked before each file, never mid-file,
//! - exactly one [`WorkerEvent::Finished`] is emitted per run, on every
//!   path including empty input and setup failure.

pub mod tasks;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;

use crate::error::Result;

/// Terminal state of a single processed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// The file was processed and its output verified.
    Success,
    /// The file was attempted and failed; the batch continued.
    Failed,
    /// The file was skipped because the batch was cancelled first.
    Cancelled,
}

/// Outcome record for one input file.
///
/// The worker collects one of these per file it actually attempts and
/// hands the full list back in [`WorkerEvent::Finished`].
#[derive(Debug, Clone, Serialize)]
pub struct FileTaskResult {
    /// The input file this result describes.
    pub source: PathBuf,
    /// Path of the produced artifact, when one exists.
    pub output: Option<PathBuf>,
    /// Terminal state of the attempt.
    pub status: TaskStatus,
    /// Human-readable one-liner, also emitted as a log event.
    pub message: String,
    /// Which engine or tool produced the output, when known.
    pub engine: String,
}

impl FileTaskResult {
    /// A successful result with a produced artifact.
    pub fn success(
        source: impl Into<PathBuf>,
        output: impl Into<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        FileTaskResult {
            source: source.into(),
            output: Some(output.into()),
            status: TaskStatus::Success,
            message: message.into(),
            engine: String::new(),
        }
    }

    /// A failed result; the batch keeps going after recording it.
    pub fn failure(source: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        FileTaskResult {
            source: source.into(),
            output: None,
            status: TaskStatus::Failed,
            message: message.into(),
            engine: String::new(),
        }
    }

    /// Attach the name of the engine that did the work.
    pub fn with_engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = engine.into();
        self
    }

    /// Whether this file ended in [`TaskStatus::Success`].
    pub fn is_success(&self) -> bool {
        self.status == TaskStatus::Success
    }
}

/// Events a running worker emits, in order, over an unbounded channel.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    /// About to process file `current` of `total` (1-based).
    Progress {
        /// 1-based index of the file being started.
        current: usize,
        /// Total number of files in the batch.
        total: usize,
        /// Short description, usually the file name.
        message: String,
    },
    /// One file finished, successfully or not.
    FileCompleted {
        /// File name (not the full path) of the input.
        name: String,
        /// Whether the file was processed successfully.
        success: bool,
        /// The per-file result message.
        message: String,
    },
    /// A free-form log line.
    Log(String),
    /// The batch is over. Emitted exactly once per run.
    Finished {
        /// True when at least one file succeeded and the run was not
        /// cancelled.
        success: bool,
        /// True when the run stopped early on request.
        cancelled: bool,
        /// One-line account of the whole run.
        summary: String,
        /// Every per-file result that was recorded.
        results: Vec<FileTaskResult>,
    },
}

/// Where worker events go.
///
/// The worker does not care who is listening; the CLI attaches a
/// channel, tests can attach anything that collects events.
pub trait EventSink: Send {
    /// Deliver one event. Delivery failures are swallowed: a worker
    /// whose listener went away keeps running to completion.
    fn emit(&self, event: WorkerEvent);
}

impl EventSink for UnboundedSender<WorkerEvent> {
    fn emit(&self, event: WorkerEvent) {
        let _ = self.send(event);
    }
}

impl EventSink for std::sync::Mutex<Vec<WorkerEvent>> {
    fn emit(&self, event: WorkerEvent) {
        if let Ok(mut events) = self.lock() {
            events.push(event);
        }
    }
}

/// Shared cancellation token, checked by the worker before each file.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// A new, unset flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. The file currently in flight still runs
    /// to completion; no further files are started.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One operation applied independently to each file of a batch.
///
/// Implementations hold the operation's parameters (angle, password,
/// output directory) and process one file per call. They should return
/// `Err` only for failures worth reporting; the harness converts the
/// error into a failed [`FileTaskResult`] and moves on.
pub trait FileTask: Send {
    /// Short lowercase name of the operation, used in log lines.
    fn name(&self) -> &'static str;

    /// One-time setup before the first file. An error here fails the
    /// whole batch without touching any file.
    fn prepare(&self) -> Result<()> {
        Ok(())
    }

    /// Process a single input file.
    fn process(&self, src: &Path) -> Result<FileTaskResult>;
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Run a [`FileTask`] over `files` synchronously, emitting events into
/// `sink`. Returns the recorded per-file results.
///
/// This is the per-file template every independent batch operation
/// shares. [`BatchWorker::spawn`] wraps it in a blocking task; tests
/// call it directly.
pub fn run_per_file(
    files: &[PathBuf],
    task: &dyn FileTask,
    sink: &dyn EventSink,
    cancel: &CancelFlag,
) -> Vec<FileTaskResult> {
    let total = files.len();
    if total == 0 {
        sink.emit(WorkerEvent::Finished {
            success: false,
            cancelled: false,
            summary: "no files to process".to_string(),
            results: Vec::new(),
        });
        return Vec::new();
    }

    if let Err(err) = task.prepare() {
        sink.emit(WorkerEvent::Finished {
            success: false,
            cancelled: false,
            summary: err.to_string(),
            results: Vec::new(),
        });
        return Vec::new();
    }

    sink.emit(WorkerEvent::Log(format!(
        "{}: processing {} file(s)",
        task.name(),
        total
    )));

    let mut results: Vec<FileTaskResult> = Vec::with_capacity(total);
    let mut cancelled = false;

    for (index, path) in files.iter().enumerate() {
        if cancel.is_cancelled() {
            cancelled = true;
            sink.emit(WorkerEvent::Log(
                "cancellation requested, stopping".to_string(),
            ));
            break;
        }

        let name = display_name(path);
        sink.emit(WorkerEvent::Progress {
            current: index + 1,
            total,
            message: format!("processing {name}"),
        });

        let result = match task.process(path) {
            Ok(result) => result,
            Err(err) => FileTaskResult::failure(path.clone(), format!("✗ {name}: {err}")),
        };

        sink.emit(WorkerEvent::FileCompleted {
            name,
            success: result.is_success(),
            message: result.message.clone(),
        });
        sink.emit(WorkerEvent::Log(result.message.clone()));
        results.push(result);
    }

    let succeeded = results.iter().filter(|r| r.is_success()).count();
    let summary = if cancelled {
        format!("cancelled, {succeeded}/{total} completed before stopping")
    } else {
        format!("completed, {succeeded}/{total} succeeded")
    };
    sink.emit(WorkerEvent::Finished {
        success: !cancelled && succeeded > 0,
        cancelled,
        summary,
        results: results.clone(),
    });

    results
}

/// Run a whole-batch operation (one that consumes all inputs to make a
/// single output, like merge) synchronously, emitting events into
/// `sink`.
///
/// Progress goes 0/1 then 1/1; there is no cancellation point because
/// the operation is indivisible once started.
pub fn run_whole_batch<F>(
    files: &[PathBuf],
    label: &str,
    sink: &dyn EventSink,
    op: F,
) -> Vec<FileTaskResult>
where
    F: FnOnce(&[PathBuf]) -> Result<FileTaskResult>,
{
    if files.is_empty() {
        sink.emit(WorkerEvent::Finished {
            success: false,
            cancelled: false,
            summary: "no files to process".to_string(),
            results: Vec::new(),
        });
        return Vec::new();
    }

    sink.emit(WorkerEvent::Log(format!(
        "{label}: combining {} file(s)",
        files.len()
    )));
    sink.emit(WorkerEvent::Progress {
        current: 0,
        total: 1,
        message: format!("{label} in progress"),
    });

    let result = match op(files) {
        Ok(result) => result,
        Err(err) => FileTaskResult::failure(files[0].clone(), format!("✗ {label}: {err}")),
    };

    sink.emit(WorkerEvent::Progress {
        current: 1,
        total: 1,
        message: result.message.clone(),
    });
    sink.emit(WorkerEvent::Log(result.message.clone()));

    let success = result.is_success();
    let results = vec![result];
    let summary = results[0].message.clone();
    sink.emit(WorkerEvent::Finished {
        success,
        cancelled: false,
        summary,
        results: results.clone(),
    });

    results
}

/// Handle to a spawned worker: cancel it, or wait for it to finish.
pub struct BatchHandle {
    cancel: CancelFlag,
    join: JoinHandle<Vec<FileTaskResult>>,
}

impl BatchHandle {
    /// Request cooperative cancellation of the running batch.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// A cancellation token usable from another task, e.g. a signal
    /// handler.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Wait for the worker thread to finish and collect its results.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker task panicked.
    pub async fn join(self) -> Result<Vec<FileTaskResult>> {
        self.join
            .await
            .map_err(|err| crate::error::ToolboxError::other(format!("worker panicked: {err}")))
    }
}

/// Entry point for running operations in the background.
///
/// # Examples
///
/// ```no_run
/// use pdf_toolbox::worker::{tasks::RotateTask, BatchWorker, WorkerEvent};
///
/// # async fn demo() -> pdf_toolbox::Result<()> {
/// let files = vec!["a.pdf".into(), "b.pdf".into()];
/// let (handle, mut events) = BatchWorker::new(files).spawn(RotateTask::new(90, None, None));
/// while let Some(event) = events.recv().await {
///     if let WorkerEvent::Finished { summary, .. } = event {
///         println!("{summary}");
///     }
/// }
/// let results = handle.join().await?;
/// # let _ = results;
/// # Ok(())
/// # }
/// ```
pub struct BatchWorker {
    files: Vec<PathBuf>,
}

impl BatchWorker {
    /// A worker over the given input files, processed in order.
    pub fn new(files: Vec<PathBuf>) -> Self {
        BatchWorker { files }
    }

    /// Run `task` over every file on a blocking thread.
    ///
    /// Returns a handle for cancellation and joining, plus the event
    /// stream. Dropping the receiver does not stop the worker.
    pub fn spawn<T>(self, task: T) -> (BatchHandle, UnboundedReceiver<WorkerEvent>)
    where
        T: FileTask + 'static,
    {
        let (tx, rx) = unbounded_channel();
        let cancel = CancelFlag::new();
        let flag = cancel.clone();
        let files = self.files;
        let join = tokio::task::spawn_blocking(move || run_per_file(&files, &task, &tx, &flag));
        (BatchHandle { cancel, join }, rx)
    }

    /// Run a whole-batch operation (merge-style) on a blocking thread.
    pub fn spawn_batch<F>(
        self,
        label: &'static str,
        op: F,
    ) -> (BatchHandle, UnboundedReceiver<WorkerEvent>)
    where
        F: FnOnce(&[PathBuf]) -> Result<FileTaskResult> + Send + 'static,
    {
        let (tx, rx) = unbounded_channel();
        let cancel = CancelFlag::new();
        let files = self.files;
        let join =
            tokio::task::spawn_blocking(move || run_whole_batch(&files, label, &tx, op));
        (
            BatchHandle {
                cancel: cancel.clone(),
                join,
            },
            rx,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct StubTask {
        fail_on: Vec<&'static str>,
    }

    impl StubTask {
        fn new() -> Self {
            StubTask { fail_on: Vec::new() }
        }

        fn failing_on(names: Vec<&'static str>) -> Self {
            StubTask { fail_on: names }
        }
    }

    impl FileTask for StubTask {
        fn name(&self) -> &'static str {
            "stub"
        }

        fn process(&self, src: &Path) -> Result<FileTaskResult> {
            let name = display_name(src);
            if self.fail_on.iter().any(|f| name.contains(f)) {
                return Ok(FileTaskResult::failure(src, format!("✗ {name}")));
            }
            Ok(FileTaskResult::success(src, src, format!("✓ {name}")))
        }
    }

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    fn finished(events: &[WorkerEvent]) -> (bool, bool, String, usize) {
        let last = events.last().expect("no events emitted");
        match last {
            WorkerEvent::Finished {
                success,
                cancelled,
                summary,
                results,
            } => (*success, *cancelled, summary.clone(), results.len()),
            other => panic!("last event is not Finished: {other:?}"),
        }
    }

    #[test]
    fn test_processes_all_files_in_order() {
        let sink = Mutex::new(Vec::new());
        let results = run_per_file(
            &paths(&["a.pdf", "b.pdf", "c.pdf"]),
            &StubTask::new(),
            &sink,
            &CancelFlag::new(),
        );

        assert_eq!(results.len(), 3);
        assert!(results.iter().all(FileTaskResult::is_success));

        let events = sink.into_inner().unwrap();
        let progress: Vec<(usize, usize)> = events
            .iter()
            .filter_map(|e| match e {
                WorkerEvent::Progress { current, total, .. } => Some((*current, *total)),
                _ => None,
            })
            .collect();
        assert_eq!(progress, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[test]
    fn test_one_failure_does_not_abort_batch() {
        let sink = Mutex::new(Vec::new());
        let results = run_per_file(
            &paths(&["a.pdf", "bad.pdf", "c.pdf"]),
            &StubTask::failing_on(vec!["bad"]),
            &sink,
            &CancelFlag::new(),
        );

        assert_eq!(results.len(), 3);
        assert!(results[0].is_success());
        assert_eq!(results[1].status, TaskStatus::Failed);
        assert!(results[2].is_success());

        let events = sink.into_inner().unwrap();
        let (success, cancelled, summary, recorded) = finished(&events);
        assert!(success);
        assert!(!cancelled);
        assert_eq!(summary, "completed, 2/3 succeeded");
        assert_eq!(recorded, 3);
    }

    #[test]
    fn test_task_error_becomes_failed_result() {
        struct ErrTask;
        impl FileTask for ErrTask {
            fn name(&self) -> &'static str {
                "err"
            }
            fn process(&self, _src: &Path) -> Result<FileTaskResult> {
                Err(crate::error::ToolboxError::operation_failed("err", "boom"))
            }
        }

        let sink = Mutex::new(Vec::new());
        let results = run_per_file(&paths(&["a.pdf"]), &ErrTask, &sink, &CancelFlag::new());

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, TaskStatus::Failed);
        assert!(results[0].message.contains("boom"));

        let (success, cancelled, _, _) = finished(&sink.into_inner().unwrap());
        assert!(!success);
        assert!(!cancelled);
    }

    #[test]
    fn test_empty_batch_emits_single_terminal_event() {
        let sink = Mutex::new(Vec::new());
        let results = run_per_file(&[], &StubTask::new(), &sink, &CancelFlag::new());

        assert!(results.is_empty());
        let events = sink.into_inner().unwrap();
        assert_eq!(events.len(), 1);
        let (success, cancelled, summary, _) = finished(&events);
        assert!(!success);
        assert!(!cancelled);
        assert_eq!(summary, "no files to process");
    }

    #[test]
    fn test_prepare_failure_fails_batch_without_touching_files() {
        struct BadPrepare;
        impl FileTask for BadPrepare {
            fn name(&self) -> &'static str {
                "bad-prepare"
            }
            fn prepare(&self) -> Result<()> {
                Err(crate::error::ToolboxError::invalid_config("bad angle"))
            }
            fn process(&self, _src: &Path) -> Result<FileTaskResult> {
                panic!("process must not run after failed prepare");
            }
        }

        let sink = Mutex::new(Vec::new());
        let results = run_per_file(&paths(&["a.pdf"]), &BadPrepare, &sink, &CancelFlag::new());

        assert!(results.is_empty());
        let events = sink.into_inner().unwrap();
        assert_eq!(events.len(), 1);
        let (success, _, summary, _) = finished(&events);
        assert!(!success);
        assert!(summary.contains("bad angle"));
    }

    #[test]
    fn test_cancel_before_start_processes_nothing() {
        let cancel = CancelFlag::new();
        cancel.cancel();

        let sink = Mutex::new(Vec::new());
        let results = run_per_file(&paths(&["a.pdf", "b.pdf"]), &StubTask::new(), &sink, &cancel);

        assert!(results.is_empty());
        let (success, cancelled, summary, _) = finished(&sink.into_inner().unwrap());
        assert!(!success);
        assert!(cancelled);
        assert_eq!(summary, "cancelled, 0/2 completed before stopping");
    }

    #[test]
    fn test_cancel_mid_batch_keeps_completed_results() {
        struct CancelAfterFirst<'a> {
            flag: &'a CancelFlag,
        }
        impl FileTask for CancelAfterFirst<'_> {
            fn name(&self) -> &'static str {
                "cancel-after-first"
            }
            fn process(&self, src: &Path) -> Result<FileTaskResult> {
                self.flag.cancel();
                Ok(FileTaskResult::success(src, src, "✓ done"))
            }
        }

        let cancel = CancelFlag::new();
        let sink = Mutex::new(Vec::new());
        let results = run_per_file(
            &paths(&["a.pdf", "b.pdf", "c.pdf"]),
            &CancelAfterFirst { flag: &cancel },
            &sink,
            &cancel,
        );

        assert_eq!(results.len(), 1);
        assert!(results[0].is_success());
        let (success, cancelled, summary, recorded) = finished(&sink.into_inner().unwrap());
        assert!(!success);
        assert!(cancelled);
        assert_eq!(summary, "cancelled, 1/3 completed before stopping");
        assert_eq!(recorded, 1);
    }

    #[test]
    fn test_exactly_one_finished_event() {
        let sink = Mutex::new(Vec::new());
        run_per_file(
            &paths(&["a.pdf", "bad.pdf"]),
            &StubTask::failing_on(vec!["bad"]),
            &sink,
            &CancelFlag::new(),
        );

        let events = sink.into_inner().unwrap();
        let terminal = events
            .iter()
            .filter(|e| matches!(e, WorkerEvent::Finished { .. }))
            .count();
        assert_eq!(terminal, 1);
        assert!(matches!(events.last(), Some(WorkerEvent::Finished { .. })));
    }

    #[test]
    fn test_whole_batch_progress_goes_zero_then_one() {
        let sink = Mutex::new(Vec::new());
        let results = run_whole_batch(&paths(&["a.pdf", "b.pdf"]), "merge", &sink, |files| {
            Ok(FileTaskResult::success(
                files[0].clone(),
                "merged.pdf",
                "✓ merged 2 files",
            ))
        });

        assert_eq!(results.len(), 1);
        let events = sink.into_inner().unwrap();
        let progress: Vec<(usize, usize)> = events
            .iter()
            .filter_map(|e| match e {
                WorkerEvent::Progress { current, total, .. } => Some((*current, *total)),
                _ => None,
            })
            .collect();
        assert_eq!(progress, vec![(0, 1), (1, 1)]);
        let (success, cancelled, summary, _) = finished(&events);
        assert!(success);
        assert!(!cancelled);
        assert_eq!(summary, "✓ merged 2 files");
    }

    #[test]
    fn test_whole_batch_error_becomes_failure() {
        let sink = Mutex::new(Vec::new());
        let results = run_whole_batch(&paths(&["a.pdf"]), "merge", &sink, |_| {
            Err(crate::error::ToolboxError::operation_failed(
                "merge",
                "page tree missing",
            ))
        });

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].status, TaskStatus::Failed);
        let (success, _, summary, _) = finished(&sink.into_inner().unwrap());
        assert!(!success);
        assert!(summary.contains("page tree missing"));
    }

    #[test]
    fn test_whole_batch_empty_input() {
        let sink = Mutex::new(Vec::new());
        let results = run_whole_batch(&[], "merge", &sink, |files| {
            Ok(FileTaskResult::success(
                files[0].clone(),
                "merged.pdf",
                "unreachable",
            ))
        });

        assert!(results.is_empty());
        let events = sink.into_inner().unwrap();
        assert_eq!(events.len(), 1);
        let (_, _, summary, _) = finished(&events);
        assert_eq!(summary, "no files to process");
    }

    #[test]
    fn test_cancelled_status_serializes_lowercase() {
        let result = FileTaskResult {
            source: PathBuf::from("a.pdf"),
            output: None,
            status: TaskStatus::Cancelled,
            message: "skipped".to_string(),
            engine: String::new(),
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"cancelled\""));
    }

    #[tokio::test]
    async fn test_spawned_worker_delivers_events_and_results() {
        let files = paths(&["x.pdf", "y.pdf"]);
        let (handle, mut events) = BatchWorker::new(files).spawn(StubTask::new());

        let mut summary = None;
        while let Some(event) = events.recv().await {
            if let WorkerEvent::Finished { summary: s, .. } = event {
                summary = Some(s);
            }
        }
        assert_eq!(summary.as_deref(), Some("completed, 2/2 succeeded"));

        let results = handle.join().await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn test_spawned_worker_cancel() {
        // Cancel immediately; the worker may have started file 1 by the
        // time the flag lands, so anywhere from 0 to 2 results is valid,
        // but the terminal event must arrive either way.
        let files = paths(&["x.pdf", "y.pdf"]);
        let (handle, mut events) = BatchWorker::new(files).spawn(StubTask::new());
        handle.cancel();

        let mut saw_finished = false;
        while let Some(event) = events.recv().await {
            if matches!(event, WorkerEvent::Finished { .. }) {
                saw_finished = true;
            }
        }
        assert!(saw_finished);
        let results = handle.join().await.unwrap();
        assert!(results.len() <= 2);
    }
}
