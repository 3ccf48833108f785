use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Default per-check deadline in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Upper bound accepted for `timeout_secs` (one day)
pub const MAX_TIMEOUT_SECS: u64 = 86_400;

/// Default number of checks run at once
pub const DEFAULT_JOBS: usize = 1;

/// Source of a configuration value.
///
/// Precedence chain: CLI arguments > config file > programmatic builder >
/// built-in defaults. Serializes to lowercase strings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    /// Value provided via CLI argument (highest precedence).
    Cli,
    /// Value loaded from `.proctor/config.toml`.
    Config,
    /// Value provided through [`Config::builder`].
    Programmatic,
    /// Built-in default value (lowest precedence).
    Default,
}

/// Main configuration structure
#[derive(Debug, Clone)]
pub struct Config {
    pub defaults: Defaults,
    pub toolchains: Toolchains,
    pub source_attribution: HashMap<String, ConfigSource>,
}

/// `[defaults]` section
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Defaults {
    pub timeout_secs: Option<u64>,
    pub verbose: Option<bool>,
    pub jobs: Option<usize>,
}

/// Programs graded through a toolchain adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tool {
    Python3,
    Javac,
    Java,
    Ant,
    Iota,
    Jmm,
    JavaccJmm,
    Shell,
}

impl Tool {
    pub const ALL: [Self; 8] = [
        Self::Python3,
        Self::Javac,
        Self::Java,
        Self::Ant,
        Self::Iota,
        Self::Jmm,
        Self::JavaccJmm,
        Self::Shell,
    ];

    /// Key used in `[toolchains]` and in source attribution.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Python3 => "python3",
            Self::Javac => "javac",
            Self::Java => "java",
            Self::Ant => "ant",
            Self::Iota => "iota",
            Self::Jmm => "jmm",
            Self::JavaccJmm => "javaccjmm",
            Self::Shell => "shell",
        }
    }

    /// Program run when the configuration does not name one.
    #[must_use]
    pub const fn default_program(self) -> &'static str {
        match self {
            Self::Python3 => "python3",
            Self::Javac => "javac",
            Self::Java => "java",
            Self::Ant => "ant",
            Self::Iota => "./bin/iota",
            Self::Jmm => "./bin/j--",
            Self::JavaccJmm => "./bin/javaccj--",
            Self::Shell => "sh",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// `[toolchains]` section: program path per adapter
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Toolchains {
    pub python3: Option<String>,
    pub javac: Option<String>,
    pub java: Option<String>,
    pub ant: Option<String>,
    pub iota: Option<String>,
    pub jmm: Option<String>,
    pub javaccjmm: Option<String>,
    pub shell: Option<String>,
}

impl Toolchains {
    pub(crate) fn slot(&self, tool: Tool) -> &Option<String> {
        match tool {
            Tool::Python3 => &self.python3,
            Tool::Javac => &self.javac,
            Tool::Java => &self.java,
            Tool::Ant => &self.ant,
            Tool::Iota => &self.iota,
            Tool::Jmm => &self.jmm,
            Tool::JavaccJmm => &self.javaccjmm,
            Tool::Shell => &self.shell,
        }
    }

    pub(crate) fn slot_mut(&mut self, tool: Tool) -> &mut Option<String> {
        match tool {
            Tool::Python3 => &mut self.python3,
            Tool::Javac => &mut self.javac,
            Tool::Java => &mut self.java,
            Tool::Ant => &mut self.ant,
            Tool::Iota => &mut self.iota,
            Tool::Jmm => &mut self.jmm,
            Tool::JavaccJmm => &mut self.javaccjmm,
            Tool::Shell => &mut self.shell,
        }
    }

    /// Program for `tool`, falling back to its built-in default.
    #[must_use]
    pub fn program(&self, tool: Tool) -> &str {
        self.slot(tool)
            .as_deref()
            .unwrap_or_else(|| tool.default_program())
    }
}

impl Config {
    /// Built-in defaults with every key attributed to [`ConfigSource::Default`].
    #[must_use]
    pub fn defaults() -> Self {
        let mut source_attribution = HashMap::new();
        for key in ["timeout_secs", "verbose", "jobs"] {
            source_attribution.insert(key.to_string(), ConfigSource::Default);
        }
        for tool in Tool::ALL {
            source_attribution.insert(tool.key().to_string(), ConfigSource::Default);
        }

        Self {
            defaults: Defaults {
                timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
                verbose: Some(false),
                jobs: Some(DEFAULT_JOBS),
            },
            toolchains: Toolchains::default(),
            source_attribution,
        }
    }

    /// Per-check deadline.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.defaults.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    #[must_use]
    pub fn jobs(&self) -> usize {
        self.defaults.jobs.unwrap_or(DEFAULT_JOBS)
    }

    #[must_use]
    pub fn verbose(&self) -> bool {
        self.defaults.verbose.unwrap_or(false)
    }

    /// Program configured for `tool`.
    #[must_use]
    pub fn program(&self, tool: Tool) -> &str {
        self.toolchains.program(tool)
    }

    #[must_use]
    pub fn source_of(&self, key: &str) -> ConfigSource {
        self.source_attribution
            .get(key)
            .copied()
            .unwrap_or(ConfigSource::Default)
    }
}
