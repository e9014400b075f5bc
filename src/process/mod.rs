// ABOUTME: Process driver for interactive command-line programs.
// ABOUTME: Exports dialogs, invocations, the driver itself and transcripts.

mod dialog;
mod driver;
mod error;
mod transcript;

pub use dialog::{Dialog, DialogCursor, DialogEntry, DialogMatch, Key, Matcher, Token, strip_ansi};
pub use driver::{DEFAULT_TIMEOUT, Invocation, ProcessDriver, RunningProcess};
pub use error::ProcessError;
pub use transcript::{ExitCondition, Transcript};
