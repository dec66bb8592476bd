//! Multi-engine PDF unlock/repair chain.
//!
//! Given a possibly-encrypted or corrupted PDF, a fixed-priority list of
//! independent engines is tried until one produces a verified, non-empty
//! output file. Engines are ordered from most semantically aware (full page
//! rebuild) to most robust (byte-for-byte copy), so the chain prefers
//! quality over brute force but never fails outright when the filesystem
//! cooperates.
//!
//! - [`Engine`] - the five engine variants and their adapters.
//! - [`available_engines`] - runtime capability probe, order preserved.
//! - [`repair`] - the orchestrator: try in order, verify the artifact,
//!   short-circuit on first qualifying success.

pub mod engine;
pub mod orchestrator;
pub mod probe;

pub use engine::{Engine, RepairOutcome};
pub use orchestrator::repair;
pub use probe::{available_engines, find_ghostscript};
