//! Error types for pdf-toolbox.
//!
//! This module defines all error types that can occur during PDF operations.
//! Errors are designed to be informative and actionable, providing clear
//! context about what went wrong and how to fix it.
//!
//! Most failures in this crate are *recovered* long before they reach a
//! caller: engine adapters convert errors into failed repair outcomes, and
//! the batch worker converts per-file errors into failed task results. The
//! variants here cover the remaining paths - bad configuration, fatal batch
//! setup problems, and I/O at the crate boundary.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Result type alias for pdf-toolbox operations.
pub type Result<T> = std::result::Result<T, ToolboxError>;

/// Main error type for pdf-toolbox operations.
#[derive(Debug)]
pub enum ToolboxError {
    /// Input file was not found.
    FileNotFound {
        /// Path to the file that was not found.
        path: PathBuf,
    },

    /// Input file exists but is not a usable PDF.
    NotAPdf {
        /// Path to the offending file.
        path: PathBuf,
        /// What the header sniff or loader reported.
        details: String,
    },

    /// Failed to load a PDF file.
    FailedToLoadPdf {
        /// Path to the PDF file.
        path: PathBuf,
        /// Reason for the failure.
        reason: String,
    },

    /// A PDF is encrypted and the supplied password did not open it.
    WrongPassword {
        /// Path to the encrypted PDF.
        path: PathBuf,
    },

    /// No input files were provided for a batch run.
    NoFilesToProcess,

    /// Failed to create the output directory for a run.
    FailedToCreateOutputDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Failed to write an output file.
    FailedToWrite {
        /// Path being written to.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// An external tool (Ghostscript, pdftoppm) is required but missing.
    ToolNotFound {
        /// Name of the missing tool.
        tool: String,
        /// How to get it.
        hint: String,
    },

    /// An external tool ran but reported failure.
    ToolFailed {
        /// Name of the tool.
        tool: String,
        /// Captured stderr (trimmed).
        stderr: String,
    },

    /// A single operation failed (rotate, split, watermark, ...).
    OperationFailed {
        /// Which operation.
        operation: String,
        /// Description of what went wrong.
        reason: String,
    },

    /// Invalid configuration or arguments.
    InvalidConfig {
        /// Description of what's wrong.
        message: String,
    },

    /// User cancelled the operation.
    Cancelled,

    /// Generic I/O error.
    Io {
        /// Underlying I/O error.
        source: io::Error,
    },

    /// Generic error with a custom message.
    Other {
        /// Error message.
        message: String,
    },
}

impl fmt::Display for ToolboxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileNotFound { path } => {
                write!(f, "File not found: {}", path.display())
            }
            Self::NotAPdf { path, details } => {
                write!(
                    f,
                    "Not a usable PDF: {}\n  Details: {}",
                    path.display(),
                    details
                )
            }
            Self::FailedToLoadPdf { path, reason } => {
                write!(
                    f,
                    "Failed to load PDF: {}\n  Reason: {}",
                    path.display(),
                    reason
                )
            }
            Self::WrongPassword { path } => {
                write!(
                    f,
                    "Password did not open encrypted PDF: {}\n  \
                     Hint: pass the correct password with --password",
                    path.display()
                )
            }
            Self::NoFilesToProcess => {
                write!(f, "No input files to process")
            }
            Self::FailedToCreateOutputDir { path, source } => {
                write!(
                    f,
                    "Failed to create output directory: {}\n  Reason: {}",
                    path.display(),
                    source
                )
            }
            Self::FailedToWrite { path, source } => {
                write!(
                    f,
                    "Failed to write output file: {}\n  Reason: {}",
                    path.display(),
                    source
                )
            }
            Self::ToolNotFound { tool, hint } => {
                write!(f, "Required tool not found: {tool}\n  Hint: {hint}")
            }
            Self::ToolFailed { tool, stderr } => {
                write!(f, "{tool} reported failure:\n  {stderr}")
            }
            Self::OperationFailed { operation, reason } => {
                write!(f, "{operation} failed: {reason}")
            }
            Self::InvalidConfig { message } => {
                write!(f, "Invalid configuration: {message}")
            }
            Self::Cancelled => {
                write!(f, "Operation cancelled by user")
            }
            Self::Io { source } => {
                write!(f, "I/O error: {source}")
            }
            Self::Other { message } => {
                write!(f, "{message}")
            }
        }
    }
}

impl std::error::Error for ToolboxError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FailedToCreateOutputDir { source, .. } => Some(source),
            Self::FailedToWrite { source, .. } => Some(source),
            Self::Io { source } => Some(source),
            _ => None,
        }
    }
}

impl From<io::Error> for ToolboxError {
    fn from(err: io::Error) -> Self {
        Self::Io { source: err }
    }
}

impl From<lopdf::Error> for ToolboxError {
    fn from(err: lopdf::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl From<anyhow::Error> for ToolboxError {
    fn from(err: anyhow::Error) -> Self {
        Self::other(err.to_string())
    }
}

impl ToolboxError {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: PathBuf) -> Self {
        Self::FileNotFound { path }
    }

    /// Create a NotAPdf error.
    pub fn not_a_pdf(path: PathBuf, details: impl Into<String>) -> Self {
        Self::NotAPdf {
            path,
            details: details.into(),
        }
    }

    /// Create a FailedToLoadPdf error.
    pub fn failed_to_load_pdf(path: PathBuf, reason: impl Into<String>) -> Self {
        Self::FailedToLoadPdf {
            path,
            reason: reason.into(),
        }
    }

    /// Create a ToolNotFound error.
    pub fn tool_not_found(tool: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::ToolNotFound {
            tool: tool.into(),
            hint: hint.into(),
        }
    }

    /// Create an OperationFailed error.
    pub fn operation_failed(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::OperationFailed {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create an Other error with a custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Check if this error aborts a whole batch run.
    ///
    /// Per-file failures are recovered by the worker template; only setup
    /// and output-side failures terminate a run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::NoFilesToProcess
                | Self::FailedToCreateOutputDir { .. }
                | Self::FailedToWrite { .. }
                | Self::Cancelled
        )
    }

    /// Get the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FileNotFound { .. } => 2,
            Self::NotAPdf { .. } => 2,
            Self::FailedToLoadPdf { .. } => 3,
            Self::WrongPassword { .. } => 3,
            Self::NoFilesToProcess => 1,
            Self::FailedToCreateOutputDir { .. } => 5,
            Self::FailedToWrite { .. } => 5,
            Self::ToolNotFound { .. } => 4,
            Self::ToolFailed { .. } => 6,
            Self::OperationFailed { .. } => 6,
            Self::InvalidConfig { .. } => 1,
            Self::Cancelled => 130, // Standard exit code for SIGINT
            Self::Io { .. } => 5,
            Self::Other { .. } => 1,
        }
    }
}
