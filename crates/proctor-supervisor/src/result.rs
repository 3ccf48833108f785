use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::time::Duration;

use crate::types::Outcome;

// ============================================================================
// ExecutionResult - What the supervisor observed
// ============================================================================

/// Result of one supervised execution.
///
/// Fields are private so that the outcome invariants hold by construction:
/// an exit code exists only for [`Outcome::Completed`], and a launch failure
/// never carries output or a pid.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    exit_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    signal: Option<i32>,
    stdout: String,
    stderr: String,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    elapsed: Duration,
    started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pid: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

fn serialize_millis<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u128(elapsed.as_millis())
}

impl ExecutionResult {
    /// The process exited on its own.
    ///
    /// `exit_code` is `None` (and `signal` is set on Unix) when the process
    /// was terminated by a signal it did not get from the supervisor.
    #[must_use]
    pub fn completed(
        exit_code: Option<i32>,
        signal: Option<i32>,
        stdout: &[u8],
        stderr: &[u8],
        started_at: DateTime<Utc>,
        elapsed: Duration,
        pid: u32,
    ) -> Self {
        Self {
            outcome: Outcome::Completed,
            exit_code,
            signal,
            stdout: decode(stdout),
            stderr: decode(stderr),
            elapsed,
            started_at,
            pid: Some(pid),
            message: None,
        }
    }

    /// The deadline passed and the process tree was killed. Partial output is
    /// kept.
    #[must_use]
    pub fn timed_out(
        timeout: Duration,
        stdout: &[u8],
        stderr: &[u8],
        started_at: DateTime<Utc>,
        elapsed: Duration,
        pid: u32,
    ) -> Self {
        Self {
            outcome: Outcome::TimedOut,
            exit_code: None,
            signal: None,
            stdout: decode(stdout),
            stderr: decode(stderr),
            elapsed,
            started_at,
            pid: Some(pid),
            message: Some(timeout_message(timeout)),
        }
    }

    /// No process was created.
    #[must_use]
    pub fn launch_failed(
        message: impl Into<String>,
        started_at: DateTime<Utc>,
        elapsed: Duration,
    ) -> Self {
        Self {
            outcome: Outcome::LaunchFailed,
            exit_code: None,
            signal: None,
            stdout: String::new(),
            stderr: String::new(),
            elapsed,
            started_at,
            pid: None,
            message: Some(message.into()),
        }
    }

    #[must_use]
    pub const fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Exit code; only ever `Some` for [`Outcome::Completed`].
    #[must_use]
    pub const fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    /// Terminating signal of a completed process (Unix only).
    #[must_use]
    pub const fn signal(&self) -> Option<i32> {
        self.signal
    }

    #[must_use]
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    #[must_use]
    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Pid of the spawned root process, if one was created.
    #[must_use]
    pub const fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// Launch diagnostic or timeout description.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Stdout followed by stderr, for callers that grade both streams as one.
    #[must_use]
    pub fn combined_output(&self) -> String {
        let mut combined = String::with_capacity(self.stdout.len() + self.stderr.len());
        combined.push_str(&self.stdout);
        combined.push_str(&self.stderr);
        combined
    }

    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self.outcome, Outcome::Completed)
    }

    #[must_use]
    pub const fn is_timed_out(&self) -> bool {
        matches!(self.outcome, Outcome::TimedOut)
    }

    #[must_use]
    pub const fn is_launch_failed(&self) -> bool {
        matches!(self.outcome, Outcome::LaunchFailed)
    }

    /// Completed with exit code 0.
    #[must_use]
    pub fn success(&self) -> bool {
        self.is_completed() && self.exit_code == Some(0)
    }
}

/// Text recorded for a timed-out execution.
#[must_use]
pub fn timeout_message(timeout: Duration) -> String {
    let secs = timeout.as_secs_f64();
    if secs.fract() == 0.0 {
        format!("{}s timeout expired", timeout.as_secs())
    } else {
        format!("{secs}s timeout expired")
    }
}

fn decode(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn test_completed_carries_exit_code_and_output() {
        let result = ExecutionResult::completed(
            Some(3),
            None,
            b"out",
            b"err",
            now(),
            Duration::from_millis(12),
            42,
        );
        assert_eq!(result.outcome(), Outcome::Completed);
        assert_eq!(result.exit_code(), Some(3));
        assert_eq!(result.stdout(), "out");
        assert_eq!(result.stderr(), "err");
        assert_eq!(result.pid(), Some(42));
        assert!(result.message().is_none());
        assert!(!result.success());
    }

    #[test]
    fn test_timed_out_has_no_exit_code_but_keeps_output() {
        let result = ExecutionResult::timed_out(
            Duration::from_secs(1),
            b"partial",
            b"",
            now(),
            Duration::from_millis(1005),
            7,
        );
        assert!(result.is_timed_out());
        assert_eq!(result.exit_code(), None);
        assert_eq!(result.stdout(), "partial");
        assert_eq!(result.message(), Some("1s timeout expired"));
        assert!(!result.success());
    }

    #[test]
    fn test_launch_failed_is_empty() {
        let result = ExecutionResult::launch_failed(
            "unable to run command 'nope': No such file or directory",
            now(),
            Duration::ZERO,
        );
        assert!(result.is_launch_failed());
        assert!(result.stdout().is_empty());
        assert!(result.stderr().is_empty());
        assert!(result.pid().is_none());
        assert!(result.exit_code().is_none());
    }

    #[test]
    fn test_invalid_utf8_is_replaced_not_rejected() {
        let result = ExecutionResult::completed(
            Some(0),
            None,
            &[b'o', b'k', 0xff, 0xfe],
            &[],
            now(),
            Duration::ZERO,
            1,
        );
        assert!(result.stdout().starts_with("ok"));
        assert!(result.stdout().contains('\u{FFFD}'));
        assert!(result.success());
    }

    #[test]
    fn test_combined_output_is_stdout_then_stderr() {
        let result =
            ExecutionResult::completed(Some(1), None, b"a\n", b"b\n", now(), Duration::ZERO, 1);
        assert_eq!(result.combined_output(), "a\nb\n");
    }

    #[test]
    fn test_timeout_message_fractional_seconds() {
        assert_eq!(timeout_message(Duration::from_secs(30)), "30s timeout expired");
        assert_eq!(
            timeout_message(Duration::from_millis(1500)),
            "1.5s timeout expired"
        );
    }

    #[test]
    fn test_serialized_shape() {
        let result = ExecutionResult::timed_out(
            Duration::from_secs(2),
            b"x",
            b"",
            now(),
            Duration::from_millis(2010),
            9,
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["outcome"], "timed_out");
        assert_eq!(json["elapsed_ms"], 2010);
        assert_eq!(json["stdout"], "x");
        assert!(json.get("exit_code").is_none());
        assert_eq!(json["message"], "2s timeout expired");
    }
}
