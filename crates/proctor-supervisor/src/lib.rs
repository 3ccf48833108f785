//! Bounded execution supervisor
//!
//! Spawns an external program with piped stdio, feeds it input, enforces a
//! wall-clock deadline, drains its output concurrently, and guarantees that
//! neither the program nor anything it started survives the call.
//!
//! # Outcomes
//!
//! Every call ends in exactly one [`Outcome`]:
//!
//! - [`Outcome::Completed`]: the program exited on its own; exit code and full
//!   output are recorded. A nonzero exit is data, not an error.
//! - [`Outcome::TimedOut`]: the deadline passed; the process tree was killed and
//!   reaped, and output captured up to that point is kept.
//! - [`Outcome::LaunchFailed`]: no process was created.
//!
//! Only contract violations (such as a zero timeout) are returned as
//! [`SupervisorError`].
//!
//! # Security Model
//!
//! All arguments travel as discrete argv elements; there is no shell string
//! evaluation. The supervisor does not sandbox: no CPU, memory, filesystem or
//! network limits are applied.

mod capture;
pub mod error;
mod platform;
pub mod reaper;
pub mod request;
pub mod result;
pub mod runner;
pub mod spawn;
pub mod supervisor;
pub mod types;

pub use error::SupervisorError;
pub use request::{DEFAULT_TIMEOUT, ExecutionRequest};
pub use result::{ExecutionResult, timeout_message};
pub use runner::ProcessRunner;
pub use spawn::ProcessHandle;
pub use supervisor::{DEFAULT_DRAIN_GRACE, Supervisor, execute};
pub use types::Outcome;
