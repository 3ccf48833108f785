//! Configuration for proctor.
//!
//! Hierarchical configuration with discovery and precedence:
//! CLI > config file > programmatic builder > built-in defaults. The file is
//! `.proctor/config.toml` with `[defaults]` and `[toolchains]` sections.

mod config;
pub mod error;

pub use config::{
    CliArgs, Config, ConfigBuilder, ConfigSource, DEFAULT_JOBS, DEFAULT_TIMEOUT_SECS, Defaults,
    MAX_TIMEOUT_SECS, Tool, Toolchains,
};
pub use error::ConfigError;
