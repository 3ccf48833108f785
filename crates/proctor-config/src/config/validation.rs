use crate::error::ConfigError;

use super::{Config, MAX_TIMEOUT_SECS, Tool};

impl Config {
    /// Validate configuration values
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if let Some(timeout_secs) = self.defaults.timeout_secs {
            if timeout_secs == 0 {
                return Err(ConfigError::invalid_value(
                    "timeout_secs",
                    "must be greater than 0",
                ));
            }
            if timeout_secs > MAX_TIMEOUT_SECS {
                return Err(ConfigError::invalid_value(
                    "timeout_secs",
                    format!("exceeds maximum limit of {MAX_TIMEOUT_SECS} seconds (24 hours)"),
                ));
            }
        }

        if self.defaults.jobs == Some(0) {
            return Err(ConfigError::invalid_value("jobs", "must be at least 1"));
        }

        for tool in Tool::ALL {
            if let Some(program) = self.toolchains.slot(tool)
                && program.trim().is_empty()
            {
                return Err(ConfigError::invalid_value(
                    tool.key(),
                    "toolchain program cannot be empty",
                ));
            }
        }

        Ok(())
    }
}
