//! Grading suites: a TOML list of checks run through the adapters
//!
//! ```toml
//! [[check]]
//! kind = "javac"
//! target = "Hello.java"
//!
//! [[check]]
//! kind = "java"
//! target = "Hello"
//! expect_stdout = "Hello, World\n"
//!
//! [[check]]
//! kind = "python3"
//! target = "upper.py"
//! input = "hello"
//! expect_contains = ["HELLO"]
//! timeout_secs = 5
//! ```
//!
//! Relative paths in a suite resolve against the directory holding the
//! suite file, and programs run there.

use anyhow::{Context, Result};
use proctor_adapters::{CheckError, Expectations, Grader, Input, Tester};
use proctor_config::{Config, MAX_TIMEOUT_SECS, Tool};
use proctor_supervisor::ProcessRunner;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::ProctorError;

// ============================================================================
// Suite model
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Suite {
    #[serde(rename = "check", default)]
    pub checks: Vec<CheckSpec>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckKind {
    Python3,
    Javac,
    Java,
    Ant,
    Iota,
    Jmm,
    Javaccjmm,
    Shell,
}

impl CheckKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Python3 => "python3",
            Self::Javac => "javac",
            Self::Java => "java",
            Self::Ant => "ant",
            Self::Iota => "iota",
            Self::Jmm => "jmm",
            Self::Javaccjmm => "javaccjmm",
            Self::Shell => "shell",
        }
    }

    const fn needs_target(self) -> bool {
        !matches!(self, Self::Ant)
    }

    const fn takes_args(self) -> bool {
        matches!(self, Self::Python3 | Self::Java | Self::Shell)
    }

    const fn takes_opts(self) -> bool {
        !matches!(self, Self::Python3 | Self::Shell)
    }

    const fn takes_tester(self) -> bool {
        !matches!(self, Self::Javac | Self::Ant)
    }
}

/// One `[[check]]` entry
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckSpec {
    pub kind: CheckKind,
    /// Script, source file or class the check runs on
    pub target: Option<String>,
    /// Program arguments (python3, java, shell)
    #[serde(default)]
    pub args: Vec<String>,
    /// Tool options placed before the target (javac, java, ant, compilers)
    #[serde(default)]
    pub opts: Vec<String>,
    /// Literal stdin text (python3, shell)
    pub input: Option<String>,
    /// File whose contents become stdin (python3)
    pub input_file: Option<PathBuf>,
    /// File receiving stdout (python3)
    pub outfile: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub expect_stdout: Option<String>,
    #[serde(default)]
    pub expect_contains: Vec<String>,
    pub expect_regex: Option<String>,
    #[serde(default)]
    pub expect_empty_stderr: bool,
    pub expect_exit_code: Option<i32>,
}

impl Suite {
    /// Load and validate a suite file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, is not valid TOML for a suite, or
    /// contains an inconsistent check.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ProctorError::Suite {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let suite = Self::parse(&content, path)
            .with_context(|| format!("Failed to load suite: {}", path.display()))?;
        debug!(path = %path.display(), checks = suite.checks.len(), "loaded suite");
        Ok(suite)
    }

    /// Parse and validate suite text; `path` is only used in messages.
    ///
    /// # Errors
    ///
    /// [`ProctorError::Suite`] naming the offending check.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ProctorError> {
        let suite: Self = toml::from_str(content).map_err(|e| ProctorError::Suite {
            path: path.to_path_buf(),
            reason: e.message().to_string(),
        })?;
        suite.validate(path)?;
        Ok(suite)
    }

    fn validate(&self, path: &Path) -> Result<(), ProctorError> {
        if self.checks.is_empty() {
            return Err(ProctorError::Suite {
                path: path.to_path_buf(),
                reason: "no [[check]] entries".to_string(),
            });
        }
        for (index, check) in self.checks.iter().enumerate() {
            check.validate().map_err(|reason| ProctorError::Suite {
                path: path.to_path_buf(),
                reason: format!("check #{} ({}): {reason}", index + 1, check.kind.as_str()),
            })?;
        }
        Ok(())
    }
}

impl CheckSpec {
    fn validate(&self) -> Result<(), String> {
        let kind = self.kind;

        match &self.target {
            None if kind.needs_target() => return Err("`target` is required".to_string()),
            Some(_) if !kind.needs_target() => {
                return Err("`target` is not used; ant always builds build.xml".to_string());
            }
            Some(target) if target.trim().is_empty() => {
                return Err("`target` cannot be empty".to_string());
            }
            _ => {}
        }

        if !self.args.is_empty() && !kind.takes_args() {
            return Err("`args` is not supported; use `opts`".to_string());
        }
        if !self.opts.is_empty() && !kind.takes_opts() {
            return Err("`opts` is not supported; use `args`".to_string());
        }

        if self.input.is_some() && !matches!(kind, CheckKind::Python3 | CheckKind::Shell) {
            return Err("`input` is only supported for python3 and shell".to_string());
        }
        if self.input_file.is_some() && kind != CheckKind::Python3 {
            return Err("`input_file` is only supported for python3".to_string());
        }
        if self.input.is_some() && self.input_file.is_some() {
            return Err("`input` and `input_file` are mutually exclusive".to_string());
        }
        if self.outfile.is_some() && kind != CheckKind::Python3 {
            return Err("`outfile` is only supported for python3".to_string());
        }

        if let Some(secs) = self.timeout_secs
            && !(1..=MAX_TIMEOUT_SECS).contains(&secs)
        {
            return Err(format!("`timeout_secs` must be between 1 and {MAX_TIMEOUT_SECS}"));
        }

        let expectations = self.expectations().map_err(|e| format!("`expect_regex`: {e}"))?;
        if expectations.is_some() && !kind.takes_tester() {
            return Err("expectations are not supported; the check has a fixed rule".to_string());
        }

        Ok(())
    }

    /// Declarative tester for this check, if any `expect_*` field is set.
    ///
    /// # Errors
    ///
    /// Returns the compile error of an invalid `expect_regex`.
    pub fn expectations(&self) -> Result<Option<Expectations>, regex::Error> {
        let mut expectations = Expectations::new();
        if let Some(stdout) = &self.expect_stdout {
            expectations = expectations.stdout(stdout.clone());
        }
        for needle in &self.expect_contains {
            expectations = expectations.contains(needle.clone());
        }
        if let Some(pattern) = &self.expect_regex {
            expectations = expectations.matches(pattern)?;
        }
        if self.expect_empty_stderr {
            expectations = expectations.empty_stderr();
        }
        if let Some(code) = self.expect_exit_code {
            expectations = expectations.exit_code(code);
        }
        Ok((!expectations.is_empty()).then_some(expectations))
    }

    /// Run this check through `grader`.
    ///
    /// # Errors
    ///
    /// The [`CheckError`] reported by the adapter.
    pub fn run<W: std::io::Write>(&self, grader: &mut Grader<'_, W>) -> Result<(), CheckError> {
        let expectations = self
            .expectations()
            .map_err(|e| CheckError::Rejected {
                detail: e.to_string(),
            })?;
        let tester = expectations.as_ref().map(|e| e as &dyn Tester);
        let target = self.target.as_deref().unwrap_or_default();

        match self.kind {
            CheckKind::Python3 => {
                let input = match (&self.input, &self.input_file) {
                    (Some(text), _) => Some(Input::Text(text.clone())),
                    (None, Some(file)) => Some(Input::File(file.clone())),
                    (None, None) => None,
                };
                grader.python3(
                    target,
                    &self.args,
                    input.as_ref(),
                    self.outfile.as_deref(),
                    tester,
                )
            }
            CheckKind::Javac => grader.javac(target, &self.opts),
            CheckKind::Java => grader.java(target, &self.opts, &self.args, tester),
            CheckKind::Ant => grader.ant(&self.opts),
            CheckKind::Iota => grader.compile_with(Tool::Iota, target, &self.opts, tester),
            CheckKind::Jmm => grader.compile_with(Tool::Jmm, target, &self.opts, tester),
            CheckKind::Javaccjmm => {
                grader.compile_with(Tool::JavaccJmm, target, &self.opts, tester)
            }
            CheckKind::Shell => grader.shell(target, &self.args, self.input.as_deref(), tester),
        }
    }
}

// ============================================================================
// Suite execution
// ============================================================================

/// Outcome of one check, with its rendered report lines.
#[derive(Debug, Clone)]
pub struct CheckReport {
    /// Position of the check in the suite (0-based)
    pub index: usize,
    pub passed: bool,
    pub timed_out: bool,
    /// `"<command> ✔\n"` or `"<command> ✘\n<detail>\n"`
    pub output: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuiteSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub timed_out: usize,
}

impl SuiteSummary {
    fn record(&mut self, report: &CheckReport) {
        self.total += 1;
        if report.passed {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        if report.timed_out {
            self.timed_out += 1;
        }
    }

    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// Runs suites with up to `jobs` checks in flight.
///
/// Each check owns its own process, pipes and deadline, so checks run on
/// independent threads without coordinating. Reports are handed to the
/// callback strictly in suite order, as soon as every earlier check has
/// finished.
pub struct SuiteRunner<'a> {
    config: &'a Config,
    runner: &'a dyn ProcessRunner,
    base_dir: PathBuf,
    jobs: usize,
}

impl<'a> SuiteRunner<'a> {
    pub fn new(
        config: &'a Config,
        runner: &'a dyn ProcessRunner,
        base_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            config,
            runner,
            base_dir: base_dir.into(),
            jobs: config.jobs(),
        }
    }

    /// Directory holding `suite_path`, usable as a working directory.
    #[must_use]
    pub fn base_dir_of(suite_path: &Path) -> PathBuf {
        match suite_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    #[must_use]
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    pub fn run<F>(&self, suite: &Suite, mut on_report: F) -> SuiteSummary
    where
        F: FnMut(&CheckReport),
    {
        let workers = self.jobs.clamp(1, suite.checks.len().max(1));
        info!(checks = suite.checks.len(), jobs = workers, "running suite");

        let next = AtomicUsize::new(0);
        let (tx, rx) = mpsc::channel();
        let mut summary = SuiteSummary::default();

        thread::scope(|scope| {
            for _ in 0..workers {
                let tx = tx.clone();
                let next = &next;
                scope.spawn(move || {
                    loop {
                        let index = next.fetch_add(1, Ordering::Relaxed);
                        let Some(check) = suite.checks.get(index) else {
                            break;
                        };
                        if tx.send(self.run_check(index, check)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(tx);

            let mut pending = BTreeMap::new();
            let mut next_in_order = 0;
            for report in rx {
                pending.insert(report.index, report);
                while let Some(report) = pending.remove(&next_in_order) {
                    summary.record(&report);
                    on_report(&report);
                    next_in_order += 1;
                }
            }
        });

        info!(
            passed = summary.passed,
            failed = summary.failed,
            timed_out = summary.timed_out,
            "suite finished"
        );
        summary
    }

    fn run_check(&self, index: usize, check: &CheckSpec) -> CheckReport {
        let mut grader =
            Grader::new(self.runner, self.config, Vec::new()).with_workdir(&self.base_dir);
        if let Some(secs) = check.timeout_secs {
            grader.set_timeout(Duration::from_secs(secs));
        }

        let outcome = check.run(&mut grader);
        let output = String::from_utf8_lossy(&grader.into_reporter().into_inner()).into_owned();

        CheckReport {
            index,
            passed: outcome.is_ok(),
            timed_out: outcome.as_ref().is_err_and(CheckError::is_timeout),
            output,
        }
    }
}
