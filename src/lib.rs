//! pdf-toolbox - batch transformations for PDF files.
//!
//! This library implements the processing core of a PDF toolbox: a set of
//! file transformations (unlock/repair, merge, split, rotate, watermark,
//! compress, reorder, protect, convert-to-image) executed through a uniform
//! batch-worker model with progress reporting, cooperative cancellation and
//! partial-failure aggregation.
//!
//! The two interesting subsystems are:
//!
//! - [`repair`] - the multi-engine unlock/repair chain: independent engines
//!   are tried in a fixed priority order until one produces a verified,
//!   non-empty output file.
//! - [`worker`] - the batch execution template every operation runs on: one
//!   dedicated worker thread per run, events delivered through a sink the
//!   caller supplies.
//!
//! # Examples
//!
//! ## Repairing a single file
//!
//! ```no_run
//! use pdf_toolbox::repair::{available_engines, repair};
//! use std::path::Path;
//!
//! let engines = available_engines();
//! let outcome = repair(
//!     Path::new("locked.pdf"),
//!     Path::new("unlocked.pdf"),
//!     Some("hunter2"),
//!     &engines,
//!     &mut |label| eprintln!("  trying {label}..."),
//! );
//! if outcome.succeeded {
//!     println!("repaired via {}", outcome.engine.unwrap());
//! }
//! ```
//!
//! ## Running a batch operation
//!
//! ```no_run
//! use pdf_toolbox::worker::{BatchWorker, WorkerEvent};
//! use pdf_toolbox::worker::tasks::RotateTask;
//! use std::path::PathBuf;
//!
//! # async fn example() {
//! let files = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
//! let (handle, mut events) = BatchWorker::new(files).spawn(RotateTask::new(90, None, None));
//!
//! while let Some(event) = events.recv().await {
//!     if let WorkerEvent::Finished { summary, .. } = &event {
//!         println!("{summary}");
//!     }
//! }
//! let _ = handle.join().await;
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod doc;
pub mod error;
pub mod ops;
pub mod output;
pub mod paths;
pub mod repair;
pub mod worker;

// Re-export commonly used types
pub use error::{Result, ToolboxError};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
