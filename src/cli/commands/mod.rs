//! CLI command implementations.
//!
//! Each handler returns the exit code for a completed command, or an
//! `anyhow` error that `run` reports and maps to an exit code.

mod config;
mod exec;
mod grade;

pub use config::execute_config_command;
pub use exec::execute_exec_command;
pub use grade::execute_grade_command;
