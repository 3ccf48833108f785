//! `proctor config`: effective configuration with source attribution

use anyhow::{Context, Result};
use serde_json::json;

use crate::{Config, ExitCode};

pub fn execute_config_command(config: &Config, json: bool) -> Result<ExitCode> {
    let effective_config = config.effective_config();

    if json {
        let entries: serde_json::Map<String, serde_json::Value> = effective_config
            .into_iter()
            .map(|(key, (value, source))| (key, json!({ "value": value, "source": source })))
            .collect();
        let output = serde_json::to_string_pretty(&entries).context("Failed to emit config JSON")?;
        println!("{output}");
    } else {
        println!("Effective configuration:");
        for (key, (value, source)) in effective_config {
            println!("  {key} = {value} (from {source})");
        }
    }

    Ok(ExitCode::SUCCESS)
}
