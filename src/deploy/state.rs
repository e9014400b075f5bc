// ABOUTME: Deployment state types for the type state pattern.
// ABOUTME: Each state carries the data the next transition needs.

use crate::chain::{AccountDetails, Inclusion};
use crate::process::Transcript;
use crate::project::GeneratedProject;
use crate::types::{KeyPair, PublicKey};

use super::alias::{DeploymentAlias, KeyCacheEntry};

/// A fee payer is leased.
/// Available actions: `generate_project()`
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountAcquired;

/// The project directory exists.
/// Available actions: `configure()`
#[derive(Debug)]
pub struct ProjectReady {
    pub(crate) project: GeneratedProject,
}

/// Alias, zkApp key and fee payer key cache entry are on disk.
/// Available actions: `issue_deploy()`
#[derive(Debug)]
pub struct Configured {
    pub(crate) project: GeneratedProject,
    pub(crate) alias: DeploymentAlias,
    pub(crate) zkapp: KeyPair,
    pub(crate) key_cache: KeyCacheEntry,
}

/// The deploy command has run.
/// Available actions: `settle()`
#[derive(Debug)]
pub struct DeployIssued {
    pub(crate) project: GeneratedProject,
    pub(crate) alias: DeploymentAlias,
    pub(crate) zkapp: KeyPair,
    pub(crate) key_cache: KeyCacheEntry,
    pub(crate) transcript: Transcript,
}

/// The transaction is on-chain and the zkApp account carries a verification key.
/// Available actions: `finish()`
#[derive(Debug)]
pub struct Confirmed {
    pub(crate) project: GeneratedProject,
    pub(crate) alias: DeploymentAlias,
    pub(crate) zkapp: PublicKey,
    pub(crate) inclusion: Inclusion,
    pub(crate) account: AccountDetails,
}

/// The confirmation prompt was declined and nothing was sent.
/// Available actions: `finish()`
#[derive(Debug)]
pub struct Cancelled {
    pub(crate) project: GeneratedProject,
    pub(crate) alias: DeploymentAlias,
    pub(crate) transcript: Transcript,
}

impl Confirmed {
    pub fn inclusion(&self) -> &Inclusion {
        &self.inclusion
    }

    pub fn account(&self) -> &AccountDetails {
        &self.account
    }
}

impl Cancelled {
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }
}
