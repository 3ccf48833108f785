//! Error types for grading checks
//!
//! A `CheckError` is a failed check. Every variant carries the text that is
//! shown to the student after the `✘` mark.

use proctor_supervisor::SupervisorError;
use std::path::PathBuf;
use thiserror::Error;

/// Why a check failed
#[derive(Error, Debug)]
pub enum CheckError {
    /// A file the check depends on is not present
    #[error("Error: cannot find file '{}'", path.display())]
    MissingFile { path: PathBuf },

    #[error("Error: {message}")]
    LaunchFailed { message: String },

    #[error("Error: {message}")]
    TimedOut { message: String },

    /// The program ran but its output or status was not accepted
    #[error("{detail}")]
    Rejected { detail: String },

    #[error("Error: cannot access '{}': {reason}", path.display())]
    Io { path: PathBuf, reason: String },

    #[error("Failed to write check report: {0}")]
    Report(#[from] std::io::Error),

    #[error(transparent)]
    Supervisor(#[from] SupervisorError),
}

impl CheckError {
    /// Whether the failure was the deadline rather than the program's behavior.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }
}
