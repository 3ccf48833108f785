use anyhow::Result;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigError;

use super::{CliArgs, Config, ConfigSource, Tool};

impl Config {
    /// Create a builder for programmatic configuration.
    ///
    /// # Example
    ///
    /// ```rust
    /// use proctor_config::{Config, Tool};
    /// use std::time::Duration;
    ///
    /// let config = Config::builder()
    ///     .timeout(Duration::from_secs(10))
    ///     .jobs(4)
    ///     .toolchain(Tool::Python3, "/usr/bin/python3.12")
    ///     .build()
    ///     .expect("valid config");
    ///
    /// assert_eq!(config.jobs(), 4);
    /// assert_eq!(config.program(Tool::Python3), "/usr/bin/python3.12");
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }
}

/// Builder for programmatic configuration.
///
/// Values set here are attributed to [`ConfigSource::Programmatic`]. They
/// override built-in defaults but yield to the config file and the CLI when
/// combined through [`ConfigBuilder::discover_from`].
#[derive(Debug, Clone, Default)]
pub struct ConfigBuilder {
    timeout_secs: Option<u64>,
    jobs: Option<usize>,
    verbose: Option<bool>,
    toolchains: BTreeMap<Tool, String>,
}

impl ConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Per-check deadline. Rounded up to whole seconds.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        let secs = timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0);
        self.timeout_secs = Some(secs);
        self
    }

    #[must_use]
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    #[must_use]
    pub fn jobs(mut self, jobs: usize) -> Self {
        self.jobs = Some(jobs);
        self
    }

    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    /// Program to run for `tool`.
    #[must_use]
    pub fn toolchain(mut self, tool: Tool, program: impl Into<String>) -> Self {
        self.toolchains.insert(tool, program.into());
        self
    }

    /// Build the configuration from builder values over built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a value fails validation.
    pub fn build(self) -> Result<Config, ConfigError> {
        let config = self.apply(Config::defaults());
        config.validate()?;
        Ok(config)
    }

    /// Build, then layer the discovered config file and CLI overrides on top.
    ///
    /// # Errors
    ///
    /// Fails if the config file cannot be read or parsed, or if the final
    /// configuration is invalid.
    pub fn discover_from(self, start_dir: &Path, cli_args: &CliArgs) -> Result<Config> {
        let base = self.apply(Config::defaults());
        Config::layer_discovered(base, start_dir, cli_args)
    }

    fn apply(self, mut config: Config) -> Config {
        let source = ConfigSource::Programmatic;

        if let Some(timeout_secs) = self.timeout_secs {
            config.defaults.timeout_secs = Some(timeout_secs);
            config
                .source_attribution
                .insert("timeout_secs".to_string(), source);
        }
        if let Some(jobs) = self.jobs {
            config.defaults.jobs = Some(jobs);
            config.source_attribution.insert("jobs".to_string(), source);
        }
        if let Some(verbose) = self.verbose {
            config.defaults.verbose = Some(verbose);
            config
                .source_attribution
                .insert("verbose".to_string(), source);
        }
        for (tool, program) in self.toolchains {
            *config.toolchains.slot_mut(tool) = Some(program);
            config
                .source_attribution
                .insert(tool.key().to_string(), source);
        }

        config
    }
}
