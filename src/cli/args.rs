//! CLI argument definitions and parsing structures
//!
//! This module defines the command-line interface structure using clap,
//! including the main `Cli` struct and all subcommand enums.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// proctor - run student programs under a bounded execution supervisor
#[derive(Parser)]
#[command(name = "proctor")]
#[command(about = "Autograding harness: run programs under a deadline and grade their output")]
#[command(long_about = r#"
proctor runs external programs (student submissions, compilers, interpreters)
under a wall-clock deadline, captures their output, and guarantees that nothing
they started outlives the run.

EXAMPLES:
  # Run one command with a 5 second deadline
  proctor exec --timeout 5 -- python3 hello.py

  # Feed text to stdin and print the result as JSON
  proctor exec --input "hello" --json -- python3 upper.py

  # Grade a suite of checks, four at a time
  proctor grade hw1/suite.toml --jobs 4

  # Show the effective configuration and where each value came from
  proctor config

CONFIGURATION:
  Configuration is loaded with precedence: CLI flags > config file > defaults
  Config file is discovered by searching upward from CWD for .proctor/config.toml
  Use --config to specify an explicit config file path

EXIT CODES:
  0 success, 1 internal error, 2 invalid arguments/config/suite,
  3 checks failed, 10 exec timed out, 127 exec could not launch;
  otherwise `exec` exits with the program's own exit code
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Deadline per execution in seconds (default: 30)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run one program under the supervisor and relay its output
    ///
    /// The program's stdout and stderr are printed as captured, and proctor
    /// exits with the program's exit code. A timeout exits 10, a launch
    /// failure 127.
    ///
    /// EXAMPLES:
    ///   proctor exec -- java -cp . Main
    ///   proctor exec --timeout 2 --input-file in.txt -- ./a.out
    Exec(ExecArgs),

    /// Run every check in a suite file and report ✔ / ✘ per check
    ///
    /// EXAMPLES:
    ///   proctor grade suite.toml
    ///   proctor grade hw2/suite.toml --jobs 8
    Grade {
        /// Suite file with `[[check]]` entries
        suite: PathBuf,

        /// Number of checks to run at once (default: 1)
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// Show the effective configuration with source attribution
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ExecArgs {
    /// Text written to the program's stdin
    #[arg(long, conflicts_with = "input_file")]
    pub input: Option<String>,

    /// File whose contents are written to the program's stdin
    #[arg(long)]
    pub input_file: Option<PathBuf>,

    /// Print the execution result as JSON instead of relaying output
    #[arg(long)]
    pub json: bool,

    /// Program to run
    #[arg(required = true)]
    pub program: String,

    /// Arguments passed to the program verbatim
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Build the clap command (used by tests and tooling).
pub fn build_cli() -> clap::Command {
    <Cli as clap::CommandFactory>::command()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_consistent() {
        build_cli().debug_assert();
    }

    #[test]
    fn test_exec_args_after_separator_are_verbatim() {
        let cli = Cli::try_parse_from([
            "proctor", "--timeout", "5", "exec", "--input", "x", "--", "sh", "-c", "echo --json",
        ])
        .unwrap();
        assert_eq!(cli.timeout, Some(5));
        let Commands::Exec(exec) = cli.command else {
            panic!("expected exec");
        };
        assert_eq!(exec.program, "sh");
        assert_eq!(exec.args, ["-c", "echo --json"]);
        assert_eq!(exec.input.as_deref(), Some("x"));
        assert!(!exec.json);
    }

    #[test]
    fn test_exec_input_and_input_file_conflict() {
        let result = Cli::try_parse_from([
            "proctor", "exec", "--input", "x", "--input-file", "in.txt", "--", "cat",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_grade_jobs() {
        let cli = Cli::try_parse_from(["proctor", "grade", "suite.toml", "--jobs", "4"]).unwrap();
        match cli.command {
            Commands::Grade { suite, jobs } => {
                assert_eq!(suite, PathBuf::from("suite.toml"));
                assert_eq!(jobs, Some(4));
            }
            _ => panic!("expected grade"),
        }
    }
}
