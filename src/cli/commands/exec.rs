//! `proctor exec`: one supervised execution

use anyhow::{Context, Result};
use proctor_supervisor::{ExecutionRequest, ExecutionResult, Outcome, Supervisor};
use std::io::{self, Write};
use tracing::debug;

use crate::cli::args::ExecArgs;
use crate::error::ProctorError;
use crate::{Config, ExitCode};

pub fn execute_exec_command(args: &ExecArgs, config: &Config) -> Result<ExitCode> {
    let mut request = ExecutionRequest::new(&args.program)
        .args(&args.args)
        .timeout(config.timeout());

    if let Some(text) = &args.input {
        request = request.input(text.as_str());
    } else if let Some(path) = &args.input_file {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read input file: {}", path.display()))?;
        request = request.input(bytes);
    }

    let result = Supervisor::new()
        .execute(&request)
        .map_err(ProctorError::from)?;
    debug!(
        outcome = %result.outcome(),
        elapsed_ms = result.elapsed().as_millis() as u64,
        "exec finished"
    );

    if args.json {
        let json = serde_json::to_string_pretty(&result).context("Failed to emit result JSON")?;
        println!("{json}");
    } else {
        relay_output(&result)?;
    }

    Ok(exit_code_of(&result))
}

fn relay_output(result: &ExecutionResult) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(result.stdout().as_bytes())?;
    stdout.flush()?;

    let mut stderr = io::stderr().lock();
    stderr.write_all(result.stderr().as_bytes())?;
    if let Some(message) = result.message() {
        writeln!(stderr, "✗ Error: {message}")?;
    }
    stderr.flush()?;
    Ok(())
}

fn exit_code_of(result: &ExecutionResult) -> ExitCode {
    match result.outcome() {
        Outcome::Completed => match (result.exit_code(), result.signal()) {
            (Some(code), _) => ExitCode::from_i32(code),
            (None, Some(signal)) => ExitCode::from_signal(signal),
            (None, None) => ExitCode::INTERNAL,
        },
        Outcome::TimedOut => ExitCode::EXEC_TIMEOUT,
        Outcome::LaunchFailed => ExitCode::LAUNCH_FAILED,
    }
}
