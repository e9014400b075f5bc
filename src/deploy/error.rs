// ABOUTME: Deployment error tagged with the stage it happened in.
// ABOUTME: Module errors are folded in here so failures can be triaged by phase.

use serde::Serialize;
use std::fmt;
use std::path::Path;

use crate::chain::ChainError;
use crate::keys::KeyError;
use crate::pool::PoolError;
use crate::process::ProcessError;
use crate::project::GenerationError;

/// Phase of a deployment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    AccountAcquisition,
    ProjectGeneration,
    Configuration,
    DeployInvocation,
    ChainConfirmation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::AccountAcquisition => "account acquisition",
            Stage::ProjectGeneration => "project generation",
            Stage::Configuration => "configuration",
            Stage::DeployInvocation => "deploy invocation",
            Stage::ChainConfirmation => "chain confirmation",
        };
        f.write_str(name)
    }
}

/// Error category for programmatic matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeployErrorKind {
    /// No fee payer became free in time.
    PoolExhausted,
    /// Executable or working directory missing.
    Spawn,
    /// A required prompt never appeared.
    DialogMismatch,
    /// A process, poll or whole attempt ran out of time.
    Timeout,
    /// A driven process exited unsuccessfully.
    ProcessFailed,
    /// Expected text missing from a process's output.
    MissingMarker,
    /// Output could not be interpreted.
    InvalidOutput,
    /// Cancellation was requested but the transaction went out, or vice versa.
    UnexpectedOutcome,
    /// The transaction failed on-chain.
    InclusionFailure,
    AccountNotFound,
    MissingVerificationKey,
    /// Transport or query error talking to the ledger.
    Ledger,
    InvalidRequest,
    Io,
}

/// A failed deployment attempt.
#[derive(Debug, thiserror::Error)]
#[error("{stage} failed: {message}")]
pub struct DeployError {
    stage: Stage,
    kind: DeployErrorKind,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl DeployError {
    pub fn new(stage: Stage, kind: DeployErrorKind, message: impl Into<String>) -> Self {
        Self {
            stage,
            kind,
            message: message.into(),
            source: None,
        }
    }

    fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn kind(&self) -> DeployErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub(crate) fn pool(err: PoolError) -> Self {
        let kind = match err {
            PoolError::Exhausted { .. } | PoolError::Closed => DeployErrorKind::PoolExhausted,
            PoolError::Inventory { .. } | PoolError::Io { .. } => DeployErrorKind::Io,
        };
        Self::new(Stage::AccountAcquisition, kind, err.to_string()).with_source(err)
    }

    pub(crate) fn process(stage: Stage, err: ProcessError) -> Self {
        let kind = match err {
            ProcessError::Spawn { .. } => DeployErrorKind::Spawn,
            ProcessError::DialogMismatch { .. } => DeployErrorKind::DialogMismatch,
            ProcessError::Timeout { .. } => DeployErrorKind::Timeout,
            ProcessError::Supervisor { .. } => DeployErrorKind::ProcessFailed,
        };
        Self::new(stage, kind, err.to_string()).with_source(err)
    }

    pub(crate) fn generation(err: GenerationError) -> Self {
        match err {
            GenerationError::Process(e) => Self::process(Stage::ProjectGeneration, e),
            other => {
                let kind = match other {
                    GenerationError::Failed { .. } => DeployErrorKind::ProcessFailed,
                    GenerationError::MissingMarker { .. } => DeployErrorKind::MissingMarker,
                    GenerationError::Layout { .. } => DeployErrorKind::InvalidOutput,
                    _ => DeployErrorKind::Io,
                };
                Self::new(Stage::ProjectGeneration, kind, other.to_string()).with_source(other)
            }
        }
    }

    pub(crate) fn keys(err: KeyError) -> Self {
        match err {
            KeyError::Process(e) => Self::process(Stage::Configuration, e),
            other => {
                let kind = match other {
                    KeyError::Failed { .. } => DeployErrorKind::ProcessFailed,
                    _ => DeployErrorKind::InvalidOutput,
                };
                Self::new(Stage::Configuration, kind, other.to_string()).with_source(other)
            }
        }
    }

    pub(crate) fn chain(err: ChainError) -> Self {
        let kind = match err {
            ChainError::Timeout { .. } => DeployErrorKind::Timeout,
            ChainError::InclusionFailure { .. } => DeployErrorKind::InclusionFailure,
            ChainError::AccountNotFound(_) => DeployErrorKind::AccountNotFound,
            ChainError::InvalidEndpoint { .. } => DeployErrorKind::InvalidRequest,
            ChainError::Http(_) | ChainError::Query(_) => DeployErrorKind::Ledger,
        };
        Self::new(Stage::ChainConfirmation, kind, err.to_string()).with_source(err)
    }

    pub(crate) fn io(stage: Stage, path: &Path, err: std::io::Error) -> Self {
        Self::new(
            stage,
            DeployErrorKind::Io,
            format!("{}: {}", path.display(), err),
        )
        .with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn message_names_the_stage() {
        let err = DeployError::new(
            Stage::DeployInvocation,
            DeployErrorKind::MissingMarker,
            "no success marker",
        );
        assert_eq!(err.to_string(), "deploy invocation failed: no success marker");
    }

    #[test]
    fn pool_exhaustion_maps_to_acquisition() {
        let err = DeployError::pool(PoolError::Exhausted {
            size: 2,
            waited: Duration::from_secs(1),
        });
        assert_eq!(err.stage(), Stage::AccountAcquisition);
        assert_eq!(err.kind(), DeployErrorKind::PoolExhausted);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn process_errors_keep_caller_stage() {
        let err = DeployError::process(
            Stage::ProjectGeneration,
            ProcessError::Timeout {
                program: "zk".into(),
                timeout: Duration::from_secs(5),
            },
        );
        assert_eq!(err.stage(), Stage::ProjectGeneration);
        assert_eq!(err.kind(), DeployErrorKind::Timeout);
    }
}
