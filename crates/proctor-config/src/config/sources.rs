use std::collections::BTreeMap;

use super::{Config, ConfigSource, Tool};

fn stable_source_label(source: ConfigSource) -> &'static str {
    match source {
        ConfigSource::Cli => "cli",
        ConfigSource::Config => "config",
        ConfigSource::Programmatic => "programmatic",
        ConfigSource::Default => "default",
    }
}

impl Config {
    /// Get effective configuration as key-value pairs with source attribution
    ///
    /// Keys are sorted so `proctor config` output is stable.
    #[must_use]
    pub fn effective_config(&self) -> BTreeMap<String, (String, String)> {
        let mut config = BTreeMap::new();

        let mut add_config = |key: &str, value: String| {
            let source = stable_source_label(self.source_of(key)).to_string();
            config.insert(key.to_string(), (value, source));
        };

        add_config("timeout_secs", self.timeout().as_secs().to_string());
        add_config("verbose", self.verbose().to_string());
        add_config("jobs", self.jobs().to_string());

        for tool in Tool::ALL {
            add_config(tool.key(), self.program(tool).to_string());
        }

        config
    }
}
