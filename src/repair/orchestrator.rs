//! The repair orchestrator: try engines in order, stop at first verified
//! success.
//!
//! An adapter may report success while producing a truncated or empty file,
//! so the orchestrator verifies the artifact (exists, non-zero size) and not
//! just the return flag before accepting an attempt. Each attempt writes to
//! a transient temp file in the destination directory; the file is persisted
//! onto the final path only after verification, and cleaned up automatically
//! otherwise.

use std::path::Path;

use crate::repair::engine::{Engine, RepairOutcome};

/// Try each engine in `engines` order until one produces a verified output.
///
/// `on_attempt` is invoked once per engine tried, with the engine label,
/// before the attempt runs. It is an observability hook with no behavioral
/// effect.
///
/// Returns the first qualifying outcome, or a failed outcome with
/// `engine: None` once every engine is exhausted. This function never
/// returns an error; the chain's floor is whatever the caller put last in
/// the list.
///
/// # Examples
///
/// ```no_run
/// use pdf_toolbox::repair::{available_engines, repair};
/// use std::path::Path;
///
/// let outcome = repair(
///     Path::new("broken.pdf"),
///     Path::new("fixed.pdf"),
///     None,
///     &available_engines(),
///     &mut |label| eprintln!("trying {label}"),
/// );
/// ```
pub fn repair(
    src: &Path,
    dst: &Path,
    password: Option<&str>,
    engines: &[Engine],
    on_attempt: &mut dyn FnMut(&str),
) -> RepairOutcome {
    for &engine in engines {
        on_attempt(engine.label());

        let scratch = match attempt_file_for(dst) {
            Ok(file) => file,
            Err(e) => {
                // Destination directory is unusable; no engine can do better.
                return RepairOutcome::failure(None, format!("cannot write near destination: {e}"));
            }
        };

        let outcome = engine.attempt(src, scratch.path(), password);

        let artifact_ok = outcome.succeeded
            && std::fs::metadata(scratch.path())
                .map(|m| m.len() > 0)
                .unwrap_or(false);

        if artifact_ok {
            match scratch.persist(dst) {
                Ok(_) => {
                    return RepairOutcome::success(engine, outcome.message, dst.to_path_buf());
                }
                Err(_) => continue, // scratch already cleaned up by persist failure
            }
        }
        // scratch drops here; the failed artifact is removed
    }

    RepairOutcome::failure(None, "all repair methods failed")
}

/// Create the per-attempt scratch file beside the destination, so the final
/// persist is a same-filesystem rename.
fn attempt_file_for(dst: &Path) -> std::io::Result<tempfile::NamedTempFile> {
    let dir = match dst.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => std::path::PathBuf::from("."),
    };
    tempfile::Builder::new()
        .prefix(".repair-")
        .suffix(".pdf")
        .tempfile_in(dir)
}
