//! CLI entry point and dispatch logic
//!
//! This module owns the `run()` function which:
//! - Parses CLI arguments
//! - Builds CliArgs and discovers Config
//! - Initializes tracing
//! - Dispatches to command handlers
//! - Handles all error output

use clap::Parser;

use super::args::{Cli, Commands};
use super::commands;
use crate::error::exit_code_for;
use crate::logging::init_tracing;
use crate::{CliArgs, Config, ExitCode};

/// Main CLI execution function.
///
/// This function handles ALL output including errors. It returns
/// `Result<(), ExitCode>`:
/// - On success: returns `Ok(())` after printing any output
/// - On failure: prints the error chain to stderr, returns `Err(ExitCode)`
///
/// main.rs only calls `std::process::exit(code.as_i32())` on error; it does
/// NOT print.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    let jobs = match &cli.command {
        Commands::Grade { jobs, .. } => *jobs,
        _ => None,
    };
    let cli_args = CliArgs {
        config_path: cli.config.clone(),
        timeout_secs: cli.timeout,
        jobs,
        verbose: cli.verbose.then_some(true),
    };

    let config = match Config::discover(&cli_args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("✗ {err:#}");
            return Err(exit_code_for(&err));
        }
    };

    if let Err(e) = init_tracing(config.verbose()) {
        eprintln!("warning: failed to initialize logging: {e}");
    }

    let result = match cli.command {
        Commands::Exec(args) => commands::execute_exec_command(&args, &config),
        Commands::Grade { suite, .. } => commands::execute_grade_command(&suite, &config),
        Commands::Config { json } => commands::execute_config_command(&config, json),
    };

    match result {
        Ok(ExitCode::SUCCESS) => Ok(()),
        Ok(code) => Err(code),
        Err(err) => {
            eprintln!("✗ {err:#}");
            Err(exit_code_for(&err))
        }
    }
}
