//! Toolchain adapters for grading checks
//!
//! Thin clients of the bounded execution supervisor. Each adapter turns one
//! grading step ("compile this", "run that with this input and judge the
//! output") into an [`ExecutionRequest`](proctor_supervisor::ExecutionRequest),
//! runs it through a [`ProcessRunner`](proctor_supervisor::ProcessRunner),
//! applies its acceptance rule and reports `✔` or `✘`.

pub mod display;
pub mod error;
pub mod grader;
pub mod reporter;
mod slot;
pub mod tester;

pub use error::CheckError;
pub use grader::{Grader, Input};
pub use reporter::{CORRECT, Reporter, WRONG};
pub use slot::slot;
pub use tester::{Expectations, Tester};
