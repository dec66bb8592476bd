//! Engine availability probe.
//!
//! Detects which repair backends are usable in the current environment and
//! returns them as an ordered capability list. The order is fixed: engines
//! are listed from most semantically aware to most robust, so the
//! orchestrator naturally prefers quality over brute force but never fails
//! outright.

use std::process::Command;

use crate::repair::engine::Engine;

/// Candidate executable names for the external rasterizer, covering the
/// common platform variants.
pub const GHOSTSCRIPT_CANDIDATES: [&str; 4] = ["gs", "gswin64c", "gswin32c", "ghostscript"];

/// Find a working Ghostscript command, if any.
///
/// Each candidate is executed with `--version`; the first one that runs and
/// exits 0 wins. "Command not found" and "nonzero exit" are the same
/// signal here: that candidate is unavailable.
pub fn find_ghostscript() -> Option<String> {
    for cmd in GHOSTSCRIPT_CANDIDATES {
        match Command::new(cmd).arg("--version").output() {
            Ok(out) if out.status.success() => return Some(cmd.to_string()),
            _ => continue,
        }
    }
    None
}

/// The ordered list of engines usable right now.
///
/// The three lopdf-backed engines are compiled into this crate and are
/// always present. Ghostscript is included only when the probe finds a
/// working executable. RawCopy is unconditionally last.
pub fn available_engines() -> Vec<Engine> {
    let mut engines = vec![Engine::Rebuild, Engine::Sanitize, Engine::Resave];
    if find_ghostscript().is_some() {
        engines.push(Engine::Ghostscript);
    }
    engines.push(Engine::RawCopy);
    engines
}
