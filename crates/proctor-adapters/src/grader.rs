use proctor_config::{Config, Tool, Toolchains};
use proctor_supervisor::{ExecutionRequest, ExecutionResult, Outcome, ProcessRunner};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::display;
use crate::error::CheckError;
use crate::reporter::Reporter;
use crate::tester::Tester;

/// Text fed to a program's stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Literal text, shown as `echo '<text>' | <command>`
    Text(String),
    /// Contents of a file, shown as `<command> < <file>`
    File(PathBuf),
}

// ============================================================================
// Grader - Toolchain adapters over a ProcessRunner
// ============================================================================

/// Runs grading checks through a [`ProcessRunner`] and reports each one.
///
/// Every adapter builds the command line, checks that the files it needs
/// exist, runs the program, applies its own acceptance rule and the optional
/// [`Tester`], and writes `"<command> ✔"` or `"<command> ✘"` (followed by
/// the failure detail) to the reporter.
///
/// Relative paths (preamble files, input files, outfiles) resolve against
/// the working directory when one is set; programs also run there.
///
/// # Example
///
/// ```rust,no_run
/// use proctor_adapters::{Expectations, Grader};
/// use proctor_config::Config;
/// use proctor_supervisor::Supervisor;
///
/// let supervisor = Supervisor::new();
/// let config = Config::defaults();
/// let mut grader = Grader::new(&supervisor, &config, std::io::stdout());
///
/// grader.javac("Hello.java", &[] as &[&str])?;
/// grader.java("Hello", &[] as &[&str], &[] as &[&str], Some(&Expectations::new().stdout("Hello, World\n")))?;
/// # Ok::<(), proctor_adapters::CheckError>(())
/// ```
pub struct Grader<'r, W: Write> {
    runner: &'r dyn ProcessRunner,
    toolchains: Toolchains,
    timeout: Duration,
    workdir: Option<PathBuf>,
    reporter: Reporter<W>,
}

impl<'r, W: Write> Grader<'r, W> {
    pub fn new(runner: &'r dyn ProcessRunner, config: &Config, out: W) -> Self {
        Self {
            runner,
            toolchains: config.toolchains.clone(),
            timeout: config.timeout(),
            workdir: None,
            reporter: Reporter::new(out),
        }
    }

    /// Resolve files and run programs in `dir`.
    #[must_use]
    pub fn with_workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(dir.into());
        self
    }

    /// Deadline for the checks that follow.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    #[must_use]
    pub const fn reporter(&self) -> &Reporter<W> {
        &self.reporter
    }

    pub fn into_reporter(self) -> Reporter<W> {
        self.reporter
    }

    /// `python3 <script> <args…>`, optionally with stdin input and stdout
    /// saved to `outfile`.
    ///
    /// # Errors
    ///
    /// Fails when the program cannot run or times out, the input file cannot
    /// be read, the outfile cannot be written, or the tester rejects the
    /// output.
    pub fn python3<S: AsRef<str>>(
        &mut self,
        script: &str,
        args: &[S],
        input: Option<&Input>,
        outfile: Option<&Path>,
        tester: Option<&dyn Tester>,
    ) -> Result<(), CheckError> {
        let mut argv = vec![script.to_string()];
        argv.extend(strings(args));
        let mut shown = display::command_line(display_name(Tool::Python3), &argv);
        shown = match input {
            Some(Input::Text(text)) => display::piped_from_echo(text, &shown),
            Some(Input::File(path)) => display::redirected_from(&shown, &path.to_string_lossy()),
            None => shown,
        };
        if let Some(outfile) = outfile {
            shown = display::redirected_to(&shown, &outfile.to_string_lossy());
        }

        self.check(&shown, |grader| {
            let stdin = match input {
                Some(Input::Text(text)) => Some(text.clone().into_bytes()),
                Some(Input::File(path)) => Some(grader.read_input(path)?),
                None => None,
            };
            let result = grader.run_tool(Tool::Python3, argv, stdin)?;
            if let Some(outfile) = outfile {
                grader.write_outfile(outfile, result.stdout())?;
            }
            apply_tester(tester, &result)
        })
    }

    /// `javac <opts…> <file>`. Any compiler diagnostics on stderr fail the
    /// check, warnings included.
    ///
    /// # Errors
    ///
    /// Fails when `file` is missing, the compiler cannot run or times out,
    /// or it writes to stderr.
    pub fn javac<S: AsRef<str>>(&mut self, file: &str, opts: &[S]) -> Result<(), CheckError> {
        let mut argv = strings(opts);
        argv.push(file.to_string());
        let shown = display::command_line(display_name(Tool::Javac), &argv);

        self.check(&shown, |grader| {
            grader.require_file(file)?;
            let result = grader.run_tool(Tool::Javac, argv, None)?;
            if result.stderr().is_empty() {
                Ok(())
            } else {
                Err(CheckError::Rejected {
                    detail: result.stderr().to_string(),
                })
            }
        })
    }

    /// `java <opts…> <class> <args…>`; requires `<class>.class`.
    ///
    /// # Errors
    ///
    /// Fails when the class file is missing, the JVM cannot run or times
    /// out, or the tester rejects the output.
    pub fn java<S: AsRef<str>, T: AsRef<str>>(
        &mut self,
        class: &str,
        opts: &[S],
        args: &[T],
        tester: Option<&dyn Tester>,
    ) -> Result<(), CheckError> {
        let mut argv = strings(opts);
        argv.push(class.to_string());
        argv.extend(strings(args));
        let shown = display::command_line(display_name(Tool::Java), &argv);

        self.check(&shown, |grader| {
            grader.require_file(&format!("{class}.class"))?;
            let result = grader.run_tool(Tool::Java, argv, None)?;
            apply_tester(tester, &result)
        })
    }

    /// `ant <opts…>`; requires `build.xml` and a `SUCCESSFUL` build.
    ///
    /// # Errors
    ///
    /// Fails when `build.xml` is missing, ant cannot run or times out, or
    /// stdout does not report a successful build.
    pub fn ant<S: AsRef<str>>(&mut self, opts: &[S]) -> Result<(), CheckError> {
        let argv = strings(opts);
        let shown = display::command_line(display_name(Tool::Ant), &argv);

        self.check(&shown, |grader| {
            grader.require_file("build.xml")?;
            let result = grader.run_tool(Tool::Ant, argv, None)?;
            if result.stdout().contains("SUCCESSFUL") {
                Ok(())
            } else {
                Err(CheckError::Rejected {
                    detail: result.stdout().to_string(),
                })
            }
        })
    }

    /// Run the iota compiler on `file`.
    ///
    /// # Errors
    ///
    /// See [`compile_with`](Self::compile_with).
    pub fn iota<S: AsRef<str>>(
        &mut self,
        file: &str,
        opts: &[S],
        tester: Option<&dyn Tester>,
    ) -> Result<(), CheckError> {
        self.compile_with(Tool::Iota, file, opts, tester)
    }

    /// Run the j-- compiler on `file`.
    ///
    /// # Errors
    ///
    /// See [`compile_with`](Self::compile_with).
    pub fn jmm<S: AsRef<str>>(
        &mut self,
        file: &str,
        opts: &[S],
        tester: Option<&dyn Tester>,
    ) -> Result<(), CheckError> {
        self.compile_with(Tool::Jmm, file, opts, tester)
    }

    /// Run the JavaCC-based j-- compiler on `file`.
    ///
    /// # Errors
    ///
    /// See [`compile_with`](Self::compile_with).
    pub fn javaccjmm<S: AsRef<str>>(
        &mut self,
        file: &str,
        opts: &[S],
        tester: Option<&dyn Tester>,
    ) -> Result<(), CheckError> {
        self.compile_with(Tool::JavaccJmm, file, opts, tester)
    }

    /// `<tool> <opts…> <file>` for the course compilers; requires `file`.
    ///
    /// # Errors
    ///
    /// Fails when `file` is missing, the compiler cannot run or times out,
    /// or the tester rejects the output.
    pub fn compile_with<S: AsRef<str>>(
        &mut self,
        tool: Tool,
        file: &str,
        opts: &[S],
        tester: Option<&dyn Tester>,
    ) -> Result<(), CheckError> {
        let mut argv = strings(opts);
        argv.push(file.to_string());
        let shown = display::command_line(display_name(tool), &argv);

        self.check(&shown, |grader| {
            grader.require_file(file)?;
            let result = grader.run_tool(tool, argv, None)?;
            apply_tester(tester, &result)
        })
    }

    /// `sh <script> <args…>`; requires `script`.
    ///
    /// # Errors
    ///
    /// Fails when the script is missing, the shell cannot run or times out,
    /// or the tester rejects the output.
    pub fn shell<S: AsRef<str>>(
        &mut self,
        script: &str,
        args: &[S],
        input: Option<&str>,
        tester: Option<&dyn Tester>,
    ) -> Result<(), CheckError> {
        let mut argv = vec![script.to_string()];
        argv.extend(strings(args));
        let mut shown = display::command_line(display_name(Tool::Shell), &argv);
        if let Some(text) = input {
            shown = display::piped_from_echo(text, &shown);
        }

        self.check(&shown, |grader| {
            grader.require_file(script)?;
            let stdin = input.map(|text| text.as_bytes().to_vec());
            let result = grader.run_tool(Tool::Shell, argv, stdin)?;
            apply_tester(tester, &result)
        })
    }

    /// A check that runs no process: `tester` decides on its own.
    ///
    /// # Errors
    ///
    /// [`CheckError::Rejected`] with the tester's reason.
    pub fn function<F>(&mut self, name: &str, tester: F) -> Result<(), CheckError>
    where
        F: FnOnce() -> Result<(), String>,
    {
        self.check(name, |_| tester().map_err(|detail| CheckError::Rejected { detail }))
    }

    fn check<F>(&mut self, shown: &str, body: F) -> Result<(), CheckError>
    where
        F: FnOnce(&Self) -> Result<(), CheckError>,
    {
        debug!(check = %shown, "check started");
        self.reporter.begin(shown)?;

        let outcome = body(self);

        self.reporter.finish(outcome.is_ok())?;
        match &outcome {
            Ok(()) => debug!(check = %shown, "check passed"),
            Err(err) => {
                info!(check = %shown, timeout = err.is_timeout(), "check failed");
                self.reporter.detail(&err.to_string())?;
            }
        }
        outcome
    }

    fn run_tool(
        &self,
        tool: Tool,
        argv: Vec<String>,
        stdin: Option<Vec<u8>>,
    ) -> Result<ExecutionResult, CheckError> {
        let mut request = ExecutionRequest::new(self.toolchains.program(tool))
            .args(argv)
            .timeout(self.timeout);
        if let Some(stdin) = stdin {
            request = request.input(stdin);
        }
        if let Some(dir) = &self.workdir {
            request = request.cwd(dir);
        }

        let result = self.runner.execute(&request)?;
        match result.outcome() {
            Outcome::Completed => Ok(result),
            Outcome::TimedOut => Err(CheckError::TimedOut {
                message: message_of(&result),
            }),
            Outcome::LaunchFailed => Err(CheckError::LaunchFailed {
                message: message_of(&result),
            }),
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.workdir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn require_file(&self, file: &str) -> Result<(), CheckError> {
        if self.resolve(Path::new(file)).is_file() {
            Ok(())
        } else {
            Err(CheckError::MissingFile {
                path: PathBuf::from(file),
            })
        }
    }

    fn read_input(&self, path: &Path) -> Result<Vec<u8>, CheckError> {
        fs::read(self.resolve(path)).map_err(|e| CheckError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    fn write_outfile(&self, path: &Path, stdout: &str) -> Result<(), CheckError> {
        fs::write(self.resolve(path), stdout).map_err(|e| CheckError::Io {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

/// Name shown in report lines. Course compilers are shown by their short
/// name even though they run from `./bin`.
const fn display_name(tool: Tool) -> &'static str {
    match tool {
        Tool::Python3 => "python3",
        Tool::Javac => "javac",
        Tool::Java => "java",
        Tool::Ant => "ant",
        Tool::Iota => "iota",
        Tool::Jmm => "j--",
        Tool::JavaccJmm => "javaccj--",
        Tool::Shell => "sh",
    }
}

fn strings<S: AsRef<str>>(items: &[S]) -> Vec<String> {
    items.iter().map(|item| item.as_ref().to_string()).collect()
}

fn message_of(result: &ExecutionResult) -> String {
    result.message().unwrap_or_default().to_string()
}

fn apply_tester(tester: Option<&dyn Tester>, result: &ExecutionResult) -> Result<(), CheckError> {
    match tester {
        Some(tester) => tester
            .check(result)
            .map_err(|detail| CheckError::Rejected { detail }),
        None => Ok(()),
    }
}
