use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::ConfigError;

use super::{CliArgs, Config, ConfigSource, Defaults, Tool, Toolchains};

/// Directory holding the config file, relative to a project root
const CONFIG_DIR: &str = ".proctor";
const CONFIG_FILE: &str = "config.toml";

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    defaults: Option<Defaults>,
    toolchains: Option<Toolchains>,
}

impl Config {
    /// Discover and load configuration with precedence: CLI > file > defaults
    ///
    /// Uses the current working directory for config file discovery when no
    /// explicit path is provided in `cli_args`.
    ///
    /// # Errors
    ///
    /// Fails if the current directory cannot be determined, the config file
    /// cannot be read or parsed, or validation fails.
    pub fn discover(cli_args: &CliArgs) -> Result<Self> {
        let start_dir = std::env::current_dir().context("Failed to get current directory")?;
        Self::discover_from(&start_dir, cli_args)
    }

    /// Discover and load configuration starting from a specific directory
    ///
    /// Path-driven variant of [`discover`](Self::discover); tests use it to
    /// avoid depending on the process working directory.
    ///
    /// # Errors
    ///
    /// See [`discover`](Self::discover).
    pub fn discover_from(start_dir: &Path, cli_args: &CliArgs) -> Result<Self> {
        Self::layer_discovered(Self::defaults(), start_dir, cli_args)
    }

    pub(crate) fn layer_discovered(
        mut config: Self,
        start_dir: &Path,
        cli_args: &CliArgs,
    ) -> Result<Self> {
        let config_path = match &cli_args.config_path {
            Some(explicit_path) => Some(explicit_path.clone()),
            None => Self::discover_config_file_from(start_dir)?,
        };

        if let Some(path) = &config_path {
            let file_config = Self::load_config_file(path)
                .with_context(|| format!("Failed to load config file: {}", path.display()))?;
            debug!(path = %path.display(), "loaded config file");
            config.apply_file(file_config);
        }

        config.apply_cli(cli_args);
        config.validate()?;

        Ok(config)
    }

    fn apply_file(&mut self, file_config: TomlConfig) {
        let source = ConfigSource::Config;

        if let Some(file_defaults) = file_config.defaults {
            if file_defaults.timeout_secs.is_some() {
                self.defaults.timeout_secs = file_defaults.timeout_secs;
                self.source_attribution
                    .insert("timeout_secs".to_string(), source);
            }
            if file_defaults.verbose.is_some() {
                self.defaults.verbose = file_defaults.verbose;
                self.source_attribution.insert("verbose".to_string(), source);
            }
            if file_defaults.jobs.is_some() {
                self.defaults.jobs = file_defaults.jobs;
                self.source_attribution.insert("jobs".to_string(), source);
            }
        }

        if let Some(file_toolchains) = file_config.toolchains {
            for tool in Tool::ALL {
                if let Some(program) = file_toolchains.slot(tool) {
                    *self.toolchains.slot_mut(tool) = Some(program.clone());
                    self.source_attribution
                        .insert(tool.key().to_string(), source);
                }
            }
        }
    }

    fn apply_cli(&mut self, cli_args: &CliArgs) {
        let source = ConfigSource::Cli;

        if let Some(timeout_secs) = cli_args.timeout_secs {
            self.defaults.timeout_secs = Some(timeout_secs);
            self.source_attribution
                .insert("timeout_secs".to_string(), source);
        }
        if let Some(jobs) = cli_args.jobs {
            self.defaults.jobs = Some(jobs);
            self.source_attribution.insert("jobs".to_string(), source);
        }
        if let Some(verbose) = cli_args.verbose {
            self.defaults.verbose = Some(verbose);
            self.source_attribution.insert("verbose".to_string(), source);
        }
    }

    /// Discover config file by searching upward from a given directory
    ///
    /// Walks up the directory tree looking for `.proctor/config.toml`,
    /// stopping at repository root markers (.git, .hg, .svn) or the
    /// filesystem root.
    ///
    /// # Errors
    ///
    /// Currently infallible; the `Result` leaves room for I/O probing.
    pub fn discover_config_file_from(start_dir: &Path) -> Result<Option<PathBuf>> {
        let mut current_dir = start_dir;

        loop {
            let config_path = current_dir.join(CONFIG_DIR).join(CONFIG_FILE);
            if config_path.is_file() {
                return Ok(Some(config_path));
            }

            if current_dir.join(".git").exists()
                || current_dir.join(".hg").exists()
                || current_dir.join(".svn").exists()
            {
                break;
            }

            match current_dir.parent() {
                Some(parent) => current_dir = parent,
                None => break,
            }
        }

        Ok(None)
    }

    /// Load configuration from TOML file
    fn load_config_file(path: &Path) -> Result<TomlConfig> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                ConfigError::InvalidFile {
                    path: path.display().to_string(),
                    reason: e.message().to_string(),
                }
                .into()
            }),
            // An explicit path that does not exist yet means defaults
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(TomlConfig::default()),
            Err(e) => Err(ConfigError::DiscoveryFailed {
                reason: format!("failed to read {}: {e}", path.display()),
            }
            .into()),
        }
    }
}
