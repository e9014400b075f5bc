// ABOUTME: Generic deployment struct parameterized by state, plus request and report types.
// ABOUTME: The lease and diagnostics travel with the deployment through every state.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::diagnostics::Diagnostics;
use crate::pool::AccountLease;
use crate::process::Transcript;
use crate::project::GeneratedProject;
use crate::types::{PublicKey, TransactionHash, UiVariant};

use super::alias::DeploymentAlias;
use super::state::{Cancelled, Configured, Confirmed, DeployIssued, ProjectReady};

/// What one attempt should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeployRequest {
    pub ui: UiVariant,
    /// Answer prompts instead of passing flags.
    pub interactive: bool,
    /// Decline the deploy confirmation. Only meaningful when interactive.
    pub cancel: bool,
}

impl DeployRequest {
    pub fn non_interactive(ui: UiVariant) -> Self {
        Self {
            ui,
            interactive: false,
            cancel: false,
        }
    }

    pub fn interactive(ui: UiVariant) -> Self {
        Self {
            ui,
            interactive: true,
            cancel: false,
        }
    }

    pub fn cancelling(ui: UiVariant) -> Self {
        Self {
            ui,
            interactive: true,
            cancel: true,
        }
    }
}

impl fmt::Display for DeployRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = match (self.interactive, self.cancel) {
            (false, _) => "flags",
            (true, false) => "interactive",
            (true, true) => "interactive-cancel",
        };
        write!(f, "{}/{}", self.ui, mode)
    }
}

/// A deployment in progress, parameterized by its current state.
///
/// The lease is held for the whole lifetime of the value. Dropping a
/// deployment in any state, including on an error path, returns the fee
/// payer to the pool.
#[derive(Debug)]
pub struct Deployment<S> {
    pub(crate) request: DeployRequest,
    // Drops before `lease`: the cached fee payer key goes before the account is freed.
    pub(crate) state: S,
    pub(crate) lease: AccountLease,
    pub(crate) started: Instant,
    pub(crate) diagnostics: Diagnostics,
}

impl<S> Deployment<S> {
    pub fn request(&self) -> &DeployRequest {
        &self.request
    }

    pub fn fee_payer(&self) -> &PublicKey {
        self.lease.account().public_key()
    }

    pub fn lease(&self) -> &AccountLease {
        &self.lease
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Move to the next state, keeping the lease.
    pub(crate) fn advance<T>(self, next: impl FnOnce(S) -> T) -> Deployment<T> {
        Deployment {
            request: self.request,
            lease: self.lease,
            started: self.started,
            diagnostics: self.diagnostics,
            state: next(self.state),
        }
    }

    pub(crate) fn split(self) -> (Deployment<()>, S) {
        let Deployment {
            request,
            lease,
            started,
            diagnostics,
            state,
        } = self;
        let rest = Deployment {
            request,
            lease,
            started,
            diagnostics,
            state: (),
        };
        (rest, state)
    }
}

/// How a completed attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Confirmed,
    Cancelled,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Confirmed => f.write_str("confirmed"),
            Outcome::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Summary of a finished attempt. The fee payer has been released.
#[derive(Debug, Clone, Serialize)]
pub struct DeploymentReport {
    pub request: DeployRequest,
    pub outcome: Outcome,
    pub project: PathBuf,
    pub alias: String,
    pub fee_payer: PublicKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zkapp: Option<PublicKey>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction: Option<TransactionHash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub polls: Option<u32>,
    /// Confirmed by the mocked ledger.
    pub synthetic: bool,
    #[serde(with = "humantime_serde")]
    pub elapsed: Duration,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

struct ReportDetails {
    project: GeneratedProject,
    alias: DeploymentAlias,
    zkapp: Option<PublicKey>,
    transaction: Option<TransactionHash>,
    polls: Option<u32>,
    synthetic: bool,
}

impl Deployment<()> {
    /// Release the lease and build the report.
    fn into_report(self, outcome: Outcome, details: ReportDetails) -> DeploymentReport {
        let elapsed = self.elapsed();
        let fee_payer = self.fee_payer().clone();
        self.lease.release();

        DeploymentReport {
            request: self.request,
            outcome,
            project: details.project.root,
            alias: details.alias.name.to_string(),
            fee_payer,
            zkapp: details.zkapp,
            transaction: details.transaction,
            polls: details.polls,
            synthetic: details.synthetic,
            elapsed,
            warnings: self.diagnostics.into_messages(),
        }
    }
}

impl Deployment<ProjectReady> {
    pub fn project(&self) -> &GeneratedProject {
        &self.state.project
    }
}

impl Deployment<Configured> {
    pub fn project(&self) -> &GeneratedProject {
        &self.state.project
    }

    pub fn alias(&self) -> &DeploymentAlias {
        &self.state.alias
    }
}

impl Deployment<DeployIssued> {
    pub fn alias(&self) -> &DeploymentAlias {
        &self.state.alias
    }

    pub fn transcript(&self) -> &Transcript {
        &self.state.transcript
    }
}

impl Deployment<Confirmed> {
    /// Release the fee payer and summarize.
    pub fn finish(self) -> DeploymentReport {
        let (rest, state) = self.split();
        tracing::info!("[{}] Deployment confirmed", rest.request);
        rest.into_report(
            Outcome::Confirmed,
            ReportDetails {
                project: state.project,
                alias: state.alias,
                zkapp: Some(state.zkapp),
                polls: Some(state.inclusion.polls),
                transaction: Some(state.inclusion.hash),
                synthetic: state.inclusion.synthetic,
            },
        )
    }
}

impl Deployment<Cancelled> {
    /// Release the fee payer and summarize.
    pub fn finish(self) -> DeploymentReport {
        let (rest, state) = self.split();
        tracing::info!("[{}] Deployment cancelled", rest.request);
        rest.into_report(
            Outcome::Cancelled,
            ReportDetails {
                project: state.project,
                alias: state.alias,
                zkapp: None,
                transaction: None,
                polls: None,
                synthetic: false,
            },
        )
    }
}
