//! Top-level error type for the proctor binary and library facade

use proctor_config::ConfigError;
use proctor_supervisor::SupervisorError;
use std::path::PathBuf;
use thiserror::Error;

use crate::exit_codes::ExitCode;

#[derive(Error, Debug)]
pub enum ProctorError {
    #[error("Supervisor error: {0}")]
    Supervisor(#[from] SupervisorError),

    #[error("Invalid suite {}: {reason}", path.display())]
    Suite { path: PathBuf, reason: String },

    #[error("{failed} of {total} checks failed")]
    ChecksFailed { failed: usize, total: usize },
}

impl ProctorError {
    /// Map the error to the process exit code.
    #[must_use]
    pub const fn to_exit_code(&self) -> ExitCode {
        match self {
            Self::Suite { .. }
            | Self::Supervisor(SupervisorError::InvalidTimeout { .. })
            | Self::Supervisor(SupervisorError::EmptyProgram) => ExitCode::CLI_ARGS,
            Self::ChecksFailed { .. } => ExitCode::CHECKS_FAILED,
            Self::Supervisor(_) => ExitCode::INTERNAL,
        }
    }
}

/// Exit code for an `anyhow` error from a command handler.
///
/// Walks the chain for a [`ProctorError`] or a [`ConfigError`] from config
/// discovery; anything else is an internal failure.
#[must_use]
pub fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    for cause in err.chain() {
        if let Some(err) = cause.downcast_ref::<ProctorError>() {
            return err.to_exit_code();
        }
        if cause.downcast_ref::<ConfigError>().is_some() {
            return ExitCode::CLI_ARGS;
        }
    }
    ExitCode::INTERNAL
}
