//! `proctor grade`: run a suite of checks

use anyhow::{Context, Result};
use proctor_supervisor::Supervisor;
use std::io::{self, Write};
use std::path::Path;

use crate::error::ProctorError;
use crate::suite::{Suite, SuiteRunner};
use crate::{Config, ExitCode};

pub fn execute_grade_command(suite_path: &Path, config: &Config) -> Result<ExitCode> {
    let suite = Suite::load(suite_path)?;
    let supervisor = Supervisor::new();
    let runner = SuiteRunner::new(config, &supervisor, SuiteRunner::base_dir_of(suite_path));

    let mut write_error = None;
    let summary = runner.run(&suite, |report| {
        let mut out = io::stdout().lock();
        if let Err(e) = out.write_all(report.output.as_bytes()).and_then(|()| out.flush()) {
            write_error.get_or_insert(e);
        }
    });
    if let Some(e) = write_error {
        return Err(e).context("Failed to write check report");
    }

    let mut out = io::stdout().lock();
    if summary.timed_out > 0 {
        writeln!(
            out,
            "\n{}/{} checks passed ({} timed out)",
            summary.passed, summary.total, summary.timed_out
        )?;
    } else {
        writeln!(out, "\n{}/{} checks passed", summary.passed, summary.total)?;
    }
    out.flush()?;

    if !summary.all_passed() {
        return Err(ProctorError::ChecksFailed {
            failed: summary.failed,
            total: summary.total,
        }
        .into());
    }
    Ok(ExitCode::SUCCESS)
}
