// ABOUTME: Error types for project generation.
// ABOUTME: Separates process failures from bad output and bad directory layout.

use std::path::PathBuf;

use crate::process::{ExitCondition, ProcessError};

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("project generator exited with {exit}:\n{tail}")]
    Failed { exit: ExitCondition, tail: String },

    #[error("project generator output lacks '{marker}'")]
    MissingMarker { marker: &'static str },

    #[error("generated project is incomplete: {} {message}", .path.display())]
    Layout { path: PathBuf, message: String },

    #[error("failed to prepare {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
