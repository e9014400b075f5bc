// ABOUTME: Error types for driving child processes.
// ABOUTME: Covers spawn failures, unconsumed dialog entries and timeouts.

use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// Executable or working directory missing.
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The process exited before an expected prompt appeared.
    #[error("{program} exited before prompt {prompt:?} appeared ({pending} dialog entries unconsumed)")]
    DialogMismatch {
        program: String,
        prompt: String,
        pending: usize,
    },

    /// Wall-clock limit exceeded; the process was killed.
    #[error("{program} timed out after {}s", .timeout.as_secs())]
    Timeout { program: String, timeout: Duration },

    /// The task supervising the process panicked or was aborted.
    #[error("supervisor for {program} failed: {message}")]
    Supervisor { program: String, message: String },
}
