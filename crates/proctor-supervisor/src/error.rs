//! Error types for the supervisor
//!
//! Only contract violations and failures of the supervisor's own machinery
//! surface here. Launch failures, timeouts and nonzero exits are data in
//! [`ExecutionResult`](crate::ExecutionResult), never errors.

use thiserror::Error;

/// Supervisor errors
#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("Execution timeout must be positive, got {timeout_ms}ms")]
    InvalidTimeout { timeout_ms: u128 },

    #[error("Execution request has an empty program name")]
    EmptyProgram,

    #[error("Supervisor runtime unavailable: {reason}")]
    Runtime { reason: String },

    #[error("Failed to collect exit status of pid {pid}: {reason}")]
    Wait { pid: u32, reason: String },
}
