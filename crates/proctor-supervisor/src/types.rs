//! Types shared across the supervisor

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a supervised execution ended. Exactly one applies to every result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The process exited on its own before the deadline
    Completed,
    /// The deadline passed; the whole process tree was killed
    TimedOut,
    /// No process was created
    LaunchFailed,
}

impl Outcome {
    /// Convert outcome to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::TimedOut => "timed_out",
            Self::LaunchFailed => "launch_failed",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
