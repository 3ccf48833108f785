use std::io::{self, Write};

/// Mark printed after a passing check
pub const CORRECT: char = '\u{2714}';
/// Mark printed after a failing check
pub const WRONG: char = '\u{2718}';

/// Writes one report line per check: `<display command> ✔` or `... ✘`.
///
/// The command is written as soon as a check starts so a slow check shows
/// what it is waiting on.
#[derive(Debug)]
pub struct Reporter<W: Write> {
    out: W,
    passed: usize,
    failed: usize,
}

impl<W: Write> Reporter<W> {
    pub const fn new(out: W) -> Self {
        Self {
            out,
            passed: 0,
            failed: 0,
        }
    }

    /// Start a check line.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    pub fn begin(&mut self, display: &str) -> io::Result<()> {
        write!(self.out, "{display} ")?;
        self.out.flush()
    }

    /// Finish the current line with `✔` or `✘`.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    pub fn finish(&mut self, passed: bool) -> io::Result<()> {
        if passed {
            self.passed += 1;
            writeln!(self.out, "{CORRECT}")?;
        } else {
            self.failed += 1;
            writeln!(self.out, "{WRONG}")?;
        }
        self.out.flush()
    }

    /// Write failure detail below a finished line.
    ///
    /// # Errors
    ///
    /// Returns any error from the underlying writer.
    pub fn detail(&mut self, detail: &str) -> io::Result<()> {
        let detail = detail.trim_end();
        if detail.is_empty() {
            return Ok(());
        }
        writeln!(self.out, "{detail}")?;
        self.out.flush()
    }

    #[must_use]
    pub const fn passed(&self) -> usize {
        self.passed
    }

    #[must_use]
    pub const fn failed(&self) -> usize {
        self.failed
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
