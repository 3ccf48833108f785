use crate::error::SupervisorError;
use crate::request::ExecutionRequest;
use crate::result::ExecutionResult;

/// Seam between the supervisor and its clients.
///
/// Adapters take a `&dyn ProcessRunner` rather than the concrete
/// [`Supervisor`](crate::Supervisor) so they can be exercised against
/// scripted results.
///
/// # Threading
///
/// `ProcessRunner` is a synchronous interface. Implementations MAY internally
/// drive an async runtime but MUST NOT expose async in this trait.
pub trait ProcessRunner: Send + Sync {
    /// Run one request to completion, timeout, or launch failure.
    ///
    /// # Errors
    ///
    /// Only contract violations and supervisor failures; see
    /// [`SupervisorError`].
    fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResult, SupervisorError>;
}
