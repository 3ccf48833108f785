use std::path::PathBuf;

/// Configuration overrides taken from the command line.
///
/// Every field is optional; `None` leaves the value to the config file,
/// builder, or built-in default.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Explicit config file, bypassing discovery
    pub config_path: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub jobs: Option<usize>,
    pub verbose: Option<bool>,
}
