use proctor_supervisor::ExecutionResult;
use regex::Regex;

/// Judges the output of a completed run.
///
/// Returning `Err(reason)` fails the check; `reason` is shown to the student.
/// Any `Fn(&str, &str) -> Result<(), String>` taking stdout and stderr is a
/// tester.
///
/// # Example
///
/// ```rust
/// use proctor_adapters::Tester;
///
/// let tester = |stdout: &str, _stderr: &str| {
///     if stdout.trim() == "Hello, World" {
///         Ok(())
///     } else {
///         Err(format!("expected a greeting, got {stdout:?}"))
///     }
/// };
/// # fn takes(_: &dyn Tester) {}
/// # takes(&tester);
/// ```
pub trait Tester: Send + Sync {
    /// # Errors
    ///
    /// A human-readable reason when the output is rejected.
    fn check(&self, result: &ExecutionResult) -> Result<(), String>;
}

impl<F> Tester for F
where
    F: Fn(&str, &str) -> Result<(), String> + Send + Sync,
{
    fn check(&self, result: &ExecutionResult) -> Result<(), String> {
        self(result.stdout(), result.stderr())
    }
}

// ============================================================================
// Expectations - Declarative testers
// ============================================================================

/// A tester built from declarative expectations. Every expectation that is
/// set must hold; the first violation is reported.
#[derive(Debug, Clone, Default)]
pub struct Expectations {
    stdout: Option<String>,
    contains: Vec<String>,
    pattern: Option<Regex>,
    empty_stderr: bool,
    exit_code: Option<i32>,
}

impl Expectations {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stdout must equal `expected` exactly.
    #[must_use]
    pub fn stdout(mut self, expected: impl Into<String>) -> Self {
        self.stdout = Some(expected.into());
        self
    }

    /// Stdout must contain `needle`. May be given several times.
    #[must_use]
    pub fn contains(mut self, needle: impl Into<String>) -> Self {
        self.contains.push(needle.into());
        self
    }

    /// Stdout must match the regular expression `pattern`.
    ///
    /// # Errors
    ///
    /// Returns the compile error if `pattern` is not a valid regex.
    pub fn matches(mut self, pattern: &str) -> Result<Self, regex::Error> {
        self.pattern = Some(Regex::new(pattern)?);
        Ok(self)
    }

    #[must_use]
    pub fn empty_stderr(mut self) -> Self {
        self.empty_stderr = true;
        self
    }

    #[must_use]
    pub fn exit_code(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stdout.is_none()
            && self.contains.is_empty()
            && self.pattern.is_none()
            && !self.empty_stderr
            && self.exit_code.is_none()
    }
}

impl Tester for Expectations {
    fn check(&self, result: &ExecutionResult) -> Result<(), String> {
        if let Some(code) = self.exit_code
            && result.exit_code() != Some(code)
        {
            return Err(match result.exit_code() {
                Some(actual) => format!("expected exit code {code}, got {actual}"),
                None => format!(
                    "expected exit code {code}, process was terminated by signal {}",
                    result.signal().map_or_else(|| "?".to_string(), |s| s.to_string())
                ),
            });
        }

        if self.empty_stderr && !result.stderr().is_empty() {
            return Err(result.stderr().to_string());
        }

        let stdout = result.stdout();
        if let Some(expected) = &self.stdout
            && stdout != expected
        {
            return Err(format!("expected output:\n{expected}\nactual output:\n{stdout}"));
        }

        for needle in &self.contains {
            if !stdout.contains(needle.as_str()) {
                return Err(format!("output does not contain {needle:?}:\n{stdout}"));
            }
        }

        if let Some(pattern) = &self.pattern
            && !pattern.is_match(stdout)
        {
            return Err(format!("output does not match /{pattern}/:\n{stdout}"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::time::Duration;

    fn completed(code: i32, stdout: &str, stderr: &str) -> ExecutionResult {
        ExecutionResult::completed(
            Some(code),
            None,
            stdout.as_bytes(),
            stderr.as_bytes(),
            Utc::now(),
            Duration::from_millis(5),
            42,
        )
    }

    #[test]
    fn test_closure_tester_sees_stdout_and_stderr() {
        let tester = |stdout: &str, stderr: &str| {
            if stdout == "out\n" && stderr == "err\n" {
                Ok(())
            } else {
                Err("unexpected".to_string())
            }
        };
        assert!(tester.check(&completed(0, "out\n", "err\n")).is_ok());
        assert!(tester.check(&completed(0, "out\n", "")).is_err());
    }

    #[test]
    fn test_empty_expectations_accept_anything() {
        let expectations = Expectations::new();
        assert!(expectations.is_empty());
        assert!(expectations.check(&completed(3, "x", "y")).is_ok());
    }

    #[test]
    fn test_exact_stdout() {
        let expectations = Expectations::new().stdout("HELLO\n");
        assert!(expectations.check(&completed(0, "HELLO\n", "")).is_ok());
        let err = expectations.check(&completed(0, "hello\n", "")).unwrap_err();
        assert!(err.contains("expected output"));
    }

    #[test]
    fn test_contains_every_needle() {
        let expectations = Expectations::new().contains("BUILD").contains("SUCCESSFUL");
        assert!(expectations.check(&completed(0, "BUILD SUCCESSFUL", "")).is_ok());
        let err = expectations.check(&completed(0, "BUILD FAILED", "")).unwrap_err();
        assert!(err.contains("SUCCESSFUL"));
    }

    #[test]
    fn test_regex_match() {
        let expectations = Expectations::new().matches(r"^sum = \d+$").unwrap();
        assert!(expectations.check(&completed(0, "sum = 42", "")).is_ok());
        assert!(expectations.check(&completed(0, "sum = x", "")).is_err());
    }

    #[test]
    fn test_invalid_regex_is_reported_at_construction() {
        assert!(Expectations::new().matches("(unclosed").is_err());
    }

    #[test]
    fn test_empty_stderr_reports_the_stderr_text() {
        let expectations = Expectations::new().empty_stderr();
        let err = expectations
            .check(&completed(0, "", "Warning: deprecated API\n"))
            .unwrap_err();
        assert_eq!(err, "Warning: deprecated API\n");
    }

    #[test]
    fn test_exit_code() {
        let expectations = Expectations::new().exit_code(2);
        assert!(expectations.check(&completed(2, "", "")).is_ok());
        let err = expectations.check(&completed(0, "", "")).unwrap_err();
        assert_eq!(err, "expected exit code 2, got 0");
    }
}
