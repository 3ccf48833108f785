//! Exit codes for the proctor binary

/// Exit codes matching the documented exit code table.
///
/// The numeric values are part of the public interface: grading scripts
/// branch on them.
///
/// # Constants
///
/// | Constant | Value | Description |
/// |----------|-------|-------------|
/// | [`SUCCESS`](Self::SUCCESS) | 0 | Operation completed successfully |
/// | [`INTERNAL`](Self::INTERNAL) | 1 | General/internal failure |
/// | [`CLI_ARGS`](Self::CLI_ARGS) | 2 | Invalid CLI arguments, config or suite |
/// | [`CHECKS_FAILED`](Self::CHECKS_FAILED) | 3 | At least one grading check failed |
/// | [`EXEC_TIMEOUT`](Self::EXEC_TIMEOUT) | 10 | `exec` hit its deadline |
/// | [`LAUNCH_FAILED`](Self::LAUNCH_FAILED) | 127 | `exec` could not start the program |
///
/// `proctor exec` otherwise exits with the program's own exit code.
///
/// # Example
///
/// ```rust
/// use proctor::ExitCode;
///
/// assert_eq!(ExitCode::CHECKS_FAILED.as_i32(), 3);
/// assert_eq!(ExitCode::SUCCESS, ExitCode::from_i32(0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - operation completed successfully
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// CLI arguments error - invalid arguments, configuration or suite file
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    /// Checks failed - at least one check in a suite failed
    pub const CHECKS_FAILED: ExitCode = ExitCode(3);

    /// Execution timeout - `exec` killed the program at its deadline
    pub const EXEC_TIMEOUT: ExitCode = ExitCode(10);

    /// Launch failed - `exec` could not start the program (shell convention)
    pub const LAUNCH_FAILED: ExitCode = ExitCode(127);

    /// Get the numeric exit code value for `std::process::exit()`.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Create an ExitCode from a raw i32 value.
    ///
    /// Prefer using the named constants when possible.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }

    /// Shell convention for a program killed by `signal`.
    #[must_use]
    pub const fn from_signal(signal: i32) -> Self {
        ExitCode(128 + signal)
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}
