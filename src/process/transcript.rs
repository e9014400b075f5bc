// ABOUTME: Immutable record of a driven process run.
// ABOUTME: Output lines, exit condition and any dialog entries left unconsumed.

use std::fmt;
use std::process::ExitStatus;
use std::time::Duration;

use super::ProcessError;

/// How a driven process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCondition {
    /// Exited normally with a status code.
    Code(i32),
    /// Terminated by a signal it did not send itself.
    Signal,
    /// Killed after exceeding its wall-clock limit.
    TimedOut,
    /// Killed on request (handle dropped or `kill` called).
    Killed,
}

impl From<ExitStatus> for ExitCondition {
    fn from(status: ExitStatus) -> Self {
        match status.code() {
            Some(code) => ExitCondition::Code(code),
            None => ExitCondition::Signal,
        }
    }
}

impl fmt::Display for ExitCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCondition::Code(code) => write!(f, "exit code {}", code),
            ExitCondition::Signal => f.write_str("terminated by signal"),
            ExitCondition::TimedOut => f.write_str("timed out"),
            ExitCondition::Killed => f.write_str("killed"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Transcript {
    pub(crate) program: String,
    pub(crate) stdout: Vec<String>,
    pub(crate) stderr: Vec<String>,
    pub(crate) exit: ExitCondition,
    pub(crate) pending_prompts: Vec<String>,
    pub(crate) dialog_required: bool,
    pub(crate) timeout: Duration,
    pub(crate) elapsed: Duration,
}

impl Transcript {
    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn exit(&self) -> ExitCondition {
        self.exit
    }

    /// Status code, if the process exited on its own.
    pub fn exit_code(&self) -> Option<i32> {
        match self.exit {
            ExitCondition::Code(code) => Some(code),
            _ => None,
        }
    }

    pub fn success(&self) -> bool {
        self.exit == ExitCondition::Code(0)
    }

    pub fn timed_out(&self) -> bool {
        self.exit == ExitCondition::TimedOut
    }

    pub fn stdout_lines(&self) -> &[String] {
        &self.stdout
    }

    pub fn stderr_lines(&self) -> &[String] {
        &self.stderr
    }

    pub fn stdout(&self) -> String {
        self.stdout.join("\n")
    }

    /// Whether stdout contains `needle` on any line.
    pub fn contains(&self, needle: &str) -> bool {
        self.stdout.iter().any(|line| line.contains(needle))
    }

    /// The last stdout line with non-whitespace content.
    pub fn last_non_empty_line(&self) -> Option<&str> {
        self.stdout
            .iter()
            .rev()
            .map(|line| line.trim_end())
            .find(|line| !line.trim().is_empty())
    }

    /// Last `n` lines of stdout and stderr, for error messages.
    pub fn tail(&self, n: usize) -> String {
        let take = |lines: &[String]| {
            let start = lines.len().saturating_sub(n);
            lines[start..].join("\n")
        };
        let mut out = take(&self.stdout);
        let err = take(&self.stderr);
        if !err.is_empty() {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&err);
        }
        out
    }

    /// Prompts the dialog expected but never saw, in order.
    pub fn pending_prompts(&self) -> &[String] {
        &self.pending_prompts
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Fail if the dialog was declared required and entries remain unconsumed.
    pub fn check_dialog(&self) -> Result<(), ProcessError> {
        match self.pending_prompts.first() {
            Some(prompt) if self.dialog_required => Err(ProcessError::DialogMismatch {
                program: self.program.clone(),
                prompt: prompt.clone(),
                pending: self.pending_prompts.len(),
            }),
            _ => Ok(()),
        }
    }

    /// Fail if the process was killed for exceeding its time limit.
    pub fn check_timeout(&self) -> Result<(), ProcessError> {
        if self.timed_out() {
            return Err(ProcessError::Timeout {
                program: self.program.clone(),
                timeout: self.timeout,
            });
        }
        Ok(())
    }
}
