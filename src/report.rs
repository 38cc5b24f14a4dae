//! Output reporting
//!
//! Sink interface for progress lines and captured command output. Quiet
//! mode suppresses stdout and progress chatter; captured stderr is always
//! surfaced, matching the rule that errors must be visible regardless of
//! verbosity.

use crate::executor::ExecOutput;

/// Consumer of orchestrator output.
pub trait Reporter {
    /// A human-readable progress line (suppressed in quiet mode).
    fn progress(&mut self, message: &str);

    /// Captured output of one remote command.
    fn command_output(&mut self, output: &ExecOutput);
}

/// Line-oriented reporter writing to the process stdout/stderr.
pub struct ConsoleReporter {
    quiet: bool,
}

impl ConsoleReporter {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    fn render_stdout(quiet: bool, output: &ExecOutput) -> Option<String> {
        if quiet {
            return None;
        }
        let trimmed = output.stdout.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    fn render_stderr(output: &ExecOutput) -> Option<String> {
        let trimmed = output.stderr.trim_end();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

impl Reporter for ConsoleReporter {
    fn progress(&mut self, message: &str) {
        if !self.quiet {
            println!("{message}");
        }
    }

    fn command_output(&mut self, output: &ExecOutput) {
        if let Some(out) = Self::render_stdout(self.quiet, output) {
            println!("{out}");
        }
        if let Some(err) = Self::render_stderr(output) {
            eprintln!("{err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(stdout: &str, stderr: &str) -> ExecOutput {
        ExecOutput {
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            exit_status: 0,
        }
    }

    #[test]
    fn test_stdout_shown_when_not_quiet() {
        let rendered = ConsoleReporter::render_stdout(false, &output("cloned.\n", ""));
        assert_eq!(rendered.as_deref(), Some("cloned."));
    }

    #[test]
    fn test_stdout_suppressed_when_quiet() {
        assert!(ConsoleReporter::render_stdout(true, &output("cloned.\n", "")).is_none());
    }

    #[test]
    fn test_empty_stdout_not_rendered() {
        assert!(ConsoleReporter::render_stdout(false, &output("  \n", "")).is_none());
    }

    #[test]
    fn test_stderr_always_rendered() {
        // quiet has no bearing on stderr rendering
        let rendered = ConsoleReporter::render_stderr(&output("", "fatal: not found\n"));
        assert_eq!(rendered.as_deref(), Some("fatal: not found"));
    }

    #[test]
    fn test_empty_stderr_not_rendered() {
        assert!(ConsoleReporter::render_stderr(&output("data", "")).is_none());
    }
}
