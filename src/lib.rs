//! proctor - autograding harness built on a bounded execution supervisor
//!
//! proctor runs external programs (student submissions, compilers,
//! interpreters) under a wall-clock deadline, captures their output, and
//! guarantees that nothing they started outlives the run. Grading checks
//! are layered on top as thin adapters.
//!
//! proctor can be used in two ways:
//! - **CLI**: `proctor exec`, `proctor grade`, `proctor config`
//! - **Library**: drive the [`Supervisor`] directly or grade through a
//!   [`Grader`]
//!
//! # Quick Start (CLI)
//!
//! ```bash
//! # Run one command with a 5 second deadline
//! proctor exec --timeout 5 -- python3 hello.py
//!
//! # Grade a suite of checks
//! proctor grade hw1/suite.toml --jobs 4
//! ```
//!
//! # Quick Start (Library)
//!
//! ```rust,no_run
//! use proctor::{ExecutionRequest, Outcome, Supervisor};
//! use std::time::Duration;
//!
//! let request = ExecutionRequest::new("python3")
//!     .arg("upper.py")
//!     .input("hello")
//!     .timeout(Duration::from_secs(5));
//!
//! let result = Supervisor::new().execute(&request)?;
//! if result.outcome() == Outcome::TimedOut {
//!     eprintln!("{}", result.message().unwrap_or_default());
//! }
//! # Ok::<(), proctor::SupervisorError>(())
//! ```
//!
//! # Public API
//!
//! - [`Supervisor`], [`ExecutionRequest`], [`ExecutionResult`], [`Outcome`] -
//!   bounded execution
//! - [`Grader`], [`Expectations`], [`Tester`] - grading checks
//! - [`Config`] and [`ConfigBuilder`] - configuration management
//! - [`Suite`] and [`SuiteRunner`] - TOML grading suites
//! - [`ProctorError`] and [`ExitCode`] - errors and CLI exit codes

// ============================================================================
// Public API
// ============================================================================

pub use proctor_supervisor::{
    DEFAULT_TIMEOUT, ExecutionRequest, ExecutionResult, Outcome, ProcessRunner, Supervisor,
    SupervisorError, execute,
};

pub use proctor_adapters::{
    CORRECT, CheckError, Expectations, Grader, Input, Reporter, Tester, WRONG, slot,
};

pub use proctor_config::{CliArgs, Config, ConfigBuilder, ConfigError, ConfigSource, Tool};

pub use error::ProctorError;
pub use exit_codes::ExitCode;
pub use suite::{CheckKind, CheckReport, CheckSpec, Suite, SuiteRunner, SuiteSummary};

// ============================================================================
// Modules
// ============================================================================

pub mod cli;
pub mod error;
pub mod exit_codes;
pub mod logging;
pub mod suite;
