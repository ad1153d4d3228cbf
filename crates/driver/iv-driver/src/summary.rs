//! End-of-run summary

use crate::error::Diagnostic;
use iv_library::MissingReport;
use std::fmt;
use std::path::PathBuf;

/// Everything the session accumulated, for the final report
#[derive(Debug)]
pub struct CompilationSummary {
    /// Modules that no file defined
    pub missing: MissingReport,
    /// Startup problems that did not stop compilation
    pub diagnostics: Vec<Diagnostic>,
    /// Files loaded from the library, sorted
    pub library_files: Vec<PathBuf>,
}

impl CompilationSummary {
    /// Whether the run may be reported as successful
    ///
    /// Any missing module fails the run. Startup diagnostics alone do not.
    pub fn succeeded(&self) -> bool {
        self.missing.is_empty()
    }

    /// Converts the summary into a pass/fail result
    ///
    /// # Errors
    ///
    /// Returns an error listing the missing modules if any were missing.
    pub fn into_result(self) -> anyhow::Result<()> {
        if self.succeeded() {
            return Ok(());
        }
        anyhow::bail!(
            "{} module(s) missing, referenced {} time(s):\n{}",
            self.missing.modules().len(),
            self.missing.total_misses(),
            self.missing
        )
    }
}

impl fmt::Display for CompilationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.diagnostics {
            writeln!(f, "warning: {diagnostic}")?;
        }
        write!(f, "{}", self.missing)
    }
}
