use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::path::PathBuf;
use std::time::Duration;
use tokio::process::Command as TokioCommand;

use crate::error::SupervisorError;

/// Deadline applied when the caller does not supply one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// ExecutionRequest - What to run, with what input, for how long
// ============================================================================

/// Immutable description of one supervised execution.
///
/// Arguments are stored as discrete `OsString` elements and handed to the OS
/// as argv; nothing is ever interpreted by a shell. An adapter that wants a
/// shell (`sh script.sh`) names the shell as the program.
///
/// # Example
///
/// ```rust
/// use proctor_supervisor::ExecutionRequest;
/// use std::time::Duration;
///
/// let request = ExecutionRequest::new("python3")
///     .arg("hello.py")
///     .input("hello\nworld")
///     .timeout(Duration::from_secs(5));
///
/// assert_eq!(request.arguments().len(), 1);
/// assert_eq!(request.stdin_input(), Some(&b"hello\nworld"[..]));
/// ```
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    program: OsString,
    args: Vec<OsString>,
    input: Option<Vec<u8>>,
    timeout: Duration,
    cwd: Option<PathBuf>,
    env: Option<HashMap<OsString, OsString>>,
}

impl ExecutionRequest {
    /// Create a request for `program` with no arguments, no input and the
    /// default deadline.
    #[must_use]
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            input: None,
            timeout: DEFAULT_TIMEOUT,
            cwd: None,
            env: None,
        }
    }

    /// Append a single argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments, preserving order.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Bytes written to the child's stdin before it is closed.
    ///
    /// Without input the child's stdin is closed immediately, so programs
    /// that read from it see end-of-file instead of blocking.
    #[must_use]
    pub fn input(mut self, input: impl Into<Vec<u8>>) -> Self {
        self.input = Some(input.into());
        self
    }

    /// Wall-clock deadline for the whole execution.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Working directory for the child.
    #[must_use]
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Set one environment variable for the child (inherits the rest).
    #[must_use]
    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn program(&self) -> &OsStr {
        &self.program
    }

    #[must_use]
    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }

    #[must_use]
    pub fn stdin_input(&self) -> Option<&[u8]> {
        self.input.as_deref()
    }

    #[must_use]
    pub const fn deadline(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub fn working_dir(&self) -> Option<&PathBuf> {
        self.cwd.as_ref()
    }

    /// Reject requests that break the calling contract before anything is
    /// spawned.
    ///
    /// # Errors
    ///
    /// * [`SupervisorError::EmptyProgram`] when the program name is empty
    /// * [`SupervisorError::InvalidTimeout`] when the deadline is zero
    pub fn validate(&self) -> Result<(), SupervisorError> {
        if self.program.is_empty() {
            return Err(SupervisorError::EmptyProgram);
        }
        if self.timeout.is_zero() {
            return Err(SupervisorError::InvalidTimeout {
                timeout_ms: self.timeout.as_millis(),
            });
        }
        Ok(())
    }

    /// Program name as lossy UTF-8, for messages and logs.
    #[must_use]
    pub fn program_lossy(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Build the argv-style tokio command. Stdio wiring is left to the spawner.
    #[must_use]
    pub(crate) fn to_tokio_command(&self) -> TokioCommand {
        let mut cmd = TokioCommand::new(&self.program);
        cmd.args(&self.args);

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        if let Some(ref env) = self.env {
            for (key, value) in env {
                cmd.env(key, value);
            }
        }

        cmd
    }
}
