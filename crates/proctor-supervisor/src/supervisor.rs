use chrono::Utc;
use std::io;
use std::pin::pin;
use std::process::ExitStatus;
use std::time::{Duration, Instant};
use tokio::time::{sleep_until, timeout, timeout_at};
use tracing::{Instrument, debug, info, info_span, warn};

use crate::capture::OutputCapture;
use crate::error::SupervisorError;
use crate::request::ExecutionRequest;
use crate::result::ExecutionResult;
use crate::runner::ProcessRunner;
use crate::spawn::{ProcessHandle, feed_stdin};

/// How long the capture may keep reading after the tree has been killed.
pub const DEFAULT_DRAIN_GRACE: Duration = Duration::from_millis(250);

/// Deadline used when the requested timeout does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

// ============================================================================
// Supervisor - Bounded execution of one request
// ============================================================================

/// Runs external programs under a wall-clock deadline.
///
/// Every call owns its own process, pipes, buffers and timer; a single
/// `Supervisor` can serve any number of concurrent calls.
///
/// # Example
///
/// ```rust,no_run
/// use proctor_supervisor::{ExecutionRequest, Outcome, Supervisor};
/// use std::time::Duration;
///
/// let supervisor = Supervisor::new();
/// let request = ExecutionRequest::new("python3")
///     .arg("hello.py")
///     .timeout(Duration::from_secs(5));
///
/// let result = supervisor.execute(&request).unwrap();
/// match result.outcome() {
///     Outcome::Completed => println!("exit {:?}: {}", result.exit_code(), result.stdout()),
///     Outcome::TimedOut => println!("too slow"),
///     Outcome::LaunchFailed => println!("{}", result.message().unwrap_or_default()),
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Supervisor {
    drain_grace: Duration,
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}

/// Which side of the deadline race finished first.
enum Race {
    Exited(io::Result<ExitStatus>),
    Deadline,
}

impl Supervisor {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            drain_grace: DEFAULT_DRAIN_GRACE,
        }
    }

    /// Override how long output is still collected after the tree is killed.
    #[must_use]
    pub const fn with_drain_grace(mut self, drain_grace: Duration) -> Self {
        self.drain_grace = drain_grace;
        self
    }

    /// Run `request` from synchronous code.
    ///
    /// Drives a private current-thread runtime. When called from inside a
    /// tokio runtime the work moves to a scoped helper thread, since a runtime
    /// cannot be blocked on from within another.
    ///
    /// # Errors
    ///
    /// See [`run`](Self::run); additionally [`SupervisorError::Runtime`] when
    /// the private runtime cannot be created.
    pub fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResult, SupervisorError> {
        if tokio::runtime::Handle::try_current().is_err() {
            return self.block_on(request);
        }

        std::thread::scope(|scope| {
            scope
                .spawn(|| self.block_on(request))
                .join()
                .unwrap_or_else(|_| {
                    Err(SupervisorError::Runtime {
                        reason: "supervisor thread panicked".to_string(),
                    })
                })
        })
    }

    fn block_on(&self, request: &ExecutionRequest) -> Result<ExecutionResult, SupervisorError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| SupervisorError::Runtime {
                reason: e.to_string(),
            })?;
        runtime.block_on(self.run(request))
    }

    /// Run `request` to completion, timeout, or launch failure.
    ///
    /// Returns only after the process tree is gone and every pipe is closed.
    ///
    /// # Errors
    ///
    /// * [`SupervisorError::InvalidTimeout`] / [`SupervisorError::EmptyProgram`]
    ///   before anything is spawned
    /// * [`SupervisorError::Wait`] if the OS fails to report the root's exit
    ///   status (the tree is killed first)
    pub async fn run(&self, request: &ExecutionRequest) -> Result<ExecutionResult, SupervisorError> {
        request.validate()?;

        let span = info_span!(
            "execute",
            program = %request.program_lossy(),
            timeout_ms = request.deadline().as_millis() as u64,
        );
        self.run_validated(request).instrument(span).await
    }

    async fn run_validated(
        &self,
        request: &ExecutionRequest,
    ) -> Result<ExecutionResult, SupervisorError> {
        let started_at = Utc::now();
        let clock = Instant::now();
        let deadline = deadline_after(tokio::time::Instant::now(), request.deadline());

        let mut handle = match ProcessHandle::spawn(request) {
            Ok(handle) => handle,
            Err(err) => {
                let message = format!(
                    "unable to run command '{}': {err}",
                    request.program_lossy()
                );
                info!(%err, "launch failed");
                return Ok(ExecutionResult::launch_failed(
                    message,
                    started_at,
                    clock.elapsed(),
                ));
            }
        };
        let pid = handle.pid();

        let writer = feed_stdin(
            handle.take_stdin(),
            request.stdin_input().map(<[u8]>::to_vec),
        );
        let mut capture = OutputCapture::new(handle.take_stdout(), handle.take_stderr());

        let race = {
            let mut drain = pin!(capture.drain());
            let mut drained = false;

            let race = loop {
                tokio::select! {
                    biased;
                    status = handle.wait() => break Race::Exited(status),
                    () = sleep_until(deadline) => break Race::Deadline,
                    () = &mut drain, if !drained => drained = true,
                }
            };

            match &race {
                Race::Exited(Ok(_)) => {
                    // Descendants may still hold the pipes; wait for them only
                    // until the original deadline.
                    if !drained && timeout_at(deadline, &mut drain).await.is_err() {
                        warn!(pid, "output still open at deadline after exit; killing lingering processes");
                        handle.reap_lingering();
                        let _ = timeout(self.drain_grace, &mut drain).await;
                    }
                    // Nothing the root left running may outlive the call.
                    handle.reap_lingering();
                }
                Race::Exited(Err(_)) | Race::Deadline => {
                    let reaped = handle.reap_tree().await;
                    if let Err(err) = &reaped {
                        warn!(pid, %err, "failed to reap killed process");
                    }
                    let _ = timeout(self.drain_grace, &mut drain).await;
                }
            }
            race
        };

        writer.abort();
        let _ = writer.await;

        let (stdout, stderr) = capture.into_bytes();
        let elapsed = clock.elapsed();

        match race {
            Race::Exited(Ok(status)) => {
                debug!(pid, code = ?status.code(), elapsed_ms = elapsed.as_millis() as u64, "process completed");
                Ok(ExecutionResult::completed(
                    status.code(),
                    termination_signal(status),
                    &stdout,
                    &stderr,
                    started_at,
                    elapsed,
                    pid,
                ))
            }
            Race::Exited(Err(err)) => Err(SupervisorError::Wait {
                pid,
                reason: err.to_string(),
            }),
            Race::Deadline => {
                info!(pid, elapsed_ms = elapsed.as_millis() as u64, "deadline exceeded; process tree killed");
                Ok(ExecutionResult::timed_out(
                    request.deadline(),
                    &stdout,
                    &stderr,
                    started_at,
                    elapsed,
                    pid,
                ))
            }
        }
    }
}

impl ProcessRunner for Supervisor {
    fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResult, SupervisorError> {
        Supervisor::execute(self, request)
    }
}

/// `now + timeout`, clamped to a far-future instant when the sum overflows.
fn deadline_after(now: tokio::time::Instant, timeout: Duration) -> tokio::time::Instant {
    now.checked_add(timeout)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

#[cfg(unix)]
fn termination_signal(status: ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
fn termination_signal(_status: ExitStatus) -> Option<i32> {
    None
}

/// Run one program with the given arguments, optional text input and
/// deadline. Convenience wrapper over [`Supervisor::execute`].
///
/// # Errors
///
/// See [`Supervisor::execute`].
pub fn execute<I, S>(
    program: &str,
    args: I,
    input: Option<&str>,
    timeout: Duration,
) -> Result<ExecutionResult, SupervisorError>
where
    I: IntoIterator<Item = S>,
    S: Into<std::ffi::OsString>,
{
    let mut request = ExecutionRequest::new(program).args(args).timeout(timeout);
    if let Some(input) = input {
        request = request.input(input);
    }
    Supervisor::new().execute(&request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Outcome;

    #[test]
    fn test_invalid_timeout_fails_before_spawn() {
        let request = ExecutionRequest::new("this_command_definitely_does_not_exist_12345")
            .timeout(Duration::ZERO);
        let result = Supervisor::new().execute(&request);
        assert!(matches!(
            result,
            Err(SupervisorError::InvalidTimeout { .. })
        ));
    }

    #[test]
    fn test_deadline_after_clamps_overflowing_timeouts() {
        let now = tokio::time::Instant::now();
        assert_eq!(
            deadline_after(now, Duration::from_secs(5)),
            now + Duration::from_secs(5)
        );
        assert_eq!(deadline_after(now, Duration::MAX), now + FAR_FUTURE);
    }

    #[test]
    fn test_missing_executable_is_launch_failed() {
        let request = ExecutionRequest::new("this_command_definitely_does_not_exist_12345")
            .timeout(Duration::from_secs(5));
        let result = Supervisor::new().execute(&request).unwrap();
        assert_eq!(result.outcome(), Outcome::LaunchFailed);
        assert!(result.pid().is_none());
        let message = result.message().unwrap();
        assert!(
            message.contains("this_command_definitely_does_not_exist_12345"),
            "message should name the program: {message}"
        );
    }

    #[cfg(windows)]
    #[test]
    fn test_contained_process_is_resumed_and_completes() {
        let request = ExecutionRequest::new("cmd")
            .args(["/C", "echo hello"])
            .timeout(Duration::from_secs(10));
        let result = Supervisor::new().execute(&request).unwrap();
        assert_eq!(result.outcome(), Outcome::Completed);
        assert_eq!(result.exit_code(), Some(0));
        assert_eq!(result.stdout().trim_end(), "hello");
    }

    #[cfg(unix)]
    #[test]
    fn test_sync_execute_echo() {
        let result = execute("echo", ["hello world"], None, Duration::from_secs(10)).unwrap();
        assert_eq!(result.outcome(), Outcome::Completed);
        assert_eq!(result.exit_code(), Some(0));
        assert_eq!(result.stdout(), "hello world\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_sync_execute_inside_runtime_uses_helper_thread() {
        let request = ExecutionRequest::new("sh")
            .args(["-c", "exit 42"])
            .timeout(Duration::from_secs(10));
        let result = Supervisor::new().execute(&request).unwrap();
        assert_eq!(result.exit_code(), Some(42));
        assert!(!result.success());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_async_run_captures_stderr_separately() {
        let request = ExecutionRequest::new("sh")
            .args(["-c", "echo out; echo err >&2"])
            .timeout(Duration::from_secs(10));
        let result = Supervisor::new().run(&request).await.unwrap();
        assert_eq!(result.stdout(), "out\n");
        assert_eq!(result.stderr(), "err\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_signal_death_is_completed_with_signal() {
        let request = ExecutionRequest::new("sh")
            .args(["-c", "kill -SEGV $$"])
            .timeout(Duration::from_secs(10));
        let result = Supervisor::new().run(&request).await.unwrap();
        assert_eq!(result.outcome(), Outcome::Completed);
        assert_eq!(result.exit_code(), None);
        assert_eq!(result.signal(), Some(libc::SIGSEGV));
    }
}
