// ABOUTME: Deployment orchestration using the type state pattern.
// ABOUTME: Exports state types, the Deployment struct and the orchestrator.

mod alias;
mod context;
mod deployment;
mod error;
mod orchestrator;
mod outcome;
mod state;
mod transitions;

pub use alias::{DeploymentAlias, KEYS_DIR, KeyCacheEntry, PROJECT_CONFIG_FILE, cache_path};
pub use context::{DeployContext, DeploySettings};
pub use deployment::{DeployRequest, Deployment, DeploymentReport, Outcome};
pub use error::{DeployError, DeployErrorKind, Stage};
pub use orchestrator::Orchestrator;
pub use outcome::{
    ABORT_MARKER, CONFIRM_PROMPT, NEXT_STEP_HINT, SUCCESS_MARKER, TX_HASH_LEN,
    extract_transaction_hash,
};
pub use state::{AccountAcquired, Cancelled, Configured, Confirmed, DeployIssued, ProjectReady};
pub use transitions::Settled;
