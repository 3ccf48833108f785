//! Configuration management for proctor
//!
//! Hierarchical configuration with discovery and precedence:
//! CLI > file > programmatic > defaults. Supports TOML configuration files
//! with `[defaults]` and `[toolchains]` sections.

mod builder;
mod cli_args;
mod discovery;
mod model;
mod sources;
mod validation;

pub use builder::ConfigBuilder;
pub use cli_args::CliArgs;
pub use model::*;

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::time::Duration;
    use tempfile::TempDir;

    fn create_test_config_file(dir: &Path, content: &str) -> PathBuf {
        let proctor_dir = dir.join(".proctor");
        fs::create_dir_all(&proctor_dir).unwrap();

        let config_path = proctor_dir.join("config.toml");
        fs::write(&config_path, content).unwrap();

        config_path
    }

    #[test]
    fn test_default_config() {
        let config = Config::defaults();
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.jobs(), 1);
        assert!(!config.verbose());
        assert_eq!(config.program(Tool::Python3), "python3");
        assert_eq!(config.program(Tool::Jmm), "./bin/j--");
        assert_eq!(config.program(Tool::JavaccJmm), "./bin/javaccj--");
        assert_eq!(config.program(Tool::Shell), "sh");
    }

    #[test]
    fn test_missing_config_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join(".git")).unwrap();

        let config = Config::discover_from(temp_dir.path(), &CliArgs::default()).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.source_of("timeout_secs"), ConfigSource::Default);
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let temp_dir = TempDir::new().unwrap();
        create_test_config_file(
            temp_dir.path(),
            r#"
[defaults]
timeout_secs = 10
jobs = 4

[toolchains]
python3 = "/usr/local/bin/python3"
iota = "/opt/iota/bin/iota"
"#,
        );

        let config = Config::discover_from(temp_dir.path(), &CliArgs::default()).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.jobs(), 4);
        assert_eq!(config.program(Tool::Python3), "/usr/local/bin/python3");
        assert_eq!(config.program(Tool::Iota), "/opt/iota/bin/iota");
        assert_eq!(config.program(Tool::Java), "java");

        assert_eq!(config.source_of("timeout_secs"), ConfigSource::Config);
        assert_eq!(config.source_of("python3"), ConfigSource::Config);
        assert_eq!(config.source_of("verbose"), ConfigSource::Default);
        assert_eq!(config.source_of("java"), ConfigSource::Default);
    }

    #[test]
    fn test_cli_overrides_config_file() {
        let temp_dir = TempDir::new().unwrap();
        create_test_config_file(
            temp_dir.path(),
            r#"
[defaults]
timeout_secs = 10
verbose = false
"#,
        );

        let cli_args = CliArgs {
            timeout_secs: Some(3),
            verbose: Some(true),
            ..CliArgs::default()
        };
        let config = Config::discover_from(temp_dir.path(), &cli_args).unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(3));
        assert!(config.verbose());
        assert_eq!(config.source_of("timeout_secs"), ConfigSource::Cli);
        assert_eq!(config.source_of("verbose"), ConfigSource::Cli);

        let effective = config.effective_config();
        assert_eq!(
            effective.get("timeout_secs"),
            Some(&("3".to_string(), "cli".to_string()))
        );
    }

    #[test]
    fn test_file_overrides_builder_and_cli_overrides_both() {
        let temp_dir = TempDir::new().unwrap();
        create_test_config_file(
            temp_dir.path(),
            r#"
[defaults]
jobs = 2
"#,
        );

        let cli_args = CliArgs {
            timeout_secs: Some(7),
            ..CliArgs::default()
        };
        let config = Config::builder()
            .jobs(8)
            .timeout_secs(60)
            .verbose(true)
            .discover_from(temp_dir.path(), &cli_args)
            .unwrap();

        assert_eq!(config.jobs(), 2);
        assert_eq!(config.source_of("jobs"), ConfigSource::Config);
        assert_eq!(config.timeout(), Duration::from_secs(7));
        assert_eq!(config.source_of("timeout_secs"), ConfigSource::Cli);
        assert!(config.verbose());
        assert_eq!(config.source_of("verbose"), ConfigSource::Programmatic);
    }

    #[test]
    fn test_discovery_walks_up_from_subdirectory() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = create_test_config_file(temp_dir.path(), "[defaults]\njobs = 3\n");
        let nested = temp_dir.path().join("submissions").join("alice");
        fs::create_dir_all(&nested).unwrap();

        let found = Config::discover_config_file_from(&nested).unwrap();
        assert_eq!(found, Some(config_path));

        let config = Config::discover_from(&nested, &CliArgs::default()).unwrap();
        assert_eq!(config.jobs(), 3);
    }

    #[test]
    fn test_discovery_stops_at_repository_root() {
        let temp_dir = TempDir::new().unwrap();
        create_test_config_file(temp_dir.path(), "[defaults]\njobs = 3\n");

        let repo = temp_dir.path().join("repo");
        fs::create_dir_all(repo.join(".git")).unwrap();
        let nested = repo.join("src");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(Config::discover_config_file_from(&nested).unwrap(), None);
    }

    #[test]
    fn test_explicit_config_path_bypasses_discovery() {
        let temp_dir = TempDir::new().unwrap();
        create_test_config_file(temp_dir.path(), "[defaults]\njobs = 3\n");

        let explicit = temp_dir.path().join("grading.toml");
        fs::write(&explicit, "[defaults]\njobs = 6\n").unwrap();

        let cli_args = CliArgs {
            config_path: Some(explicit),
            ..CliArgs::default()
        };
        let config = Config::discover_from(temp_dir.path(), &cli_args).unwrap();
        assert_eq!(config.jobs(), 6);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        create_test_config_file(temp_dir.path(), "[defaults\ntimeout_secs = ");

        let err = Config::discover_from(temp_dir.path(), &CliArgs::default()).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to load config file"));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        create_test_config_file(temp_dir.path(), "[toolchains]\nperl = \"perl\"\n");

        assert!(Config::discover_from(temp_dir.path(), &CliArgs::default()).is_err());
    }

    #[test]
    fn test_invalid_values_from_file_fail_validation() {
        let temp_dir = TempDir::new().unwrap();
        create_test_config_file(temp_dir.path(), "[defaults]\ntimeout_secs = 0\n");

        let err = Config::discover_from(temp_dir.path(), &CliArgs::default()).unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }
}
