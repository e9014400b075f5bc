// ABOUTME: State transition methods for deployment orchestration.
// ABOUTME: Each method consumes self and returns the next state on success.

use std::time::Instant;

use crate::diagnostics::{Diagnostics, Warning};
use crate::pool::AccountPool;
use crate::process::{Dialog, Invocation};
use crate::project::ProjectRequest;
use crate::types::AliasName;

use super::alias::{DeploymentAlias, KeyCacheEntry, cache_path};
use super::context::DeployContext;
use super::deployment::{DeployRequest, Deployment};
use super::error::{DeployError, DeployErrorKind, Stage};
use super::outcome::{
    ABORT_MARKER, CONFIRM_PROMPT, NEXT_STEP_HINT, SUCCESS_MARKER, extract_transaction_hash,
};
use super::state::{AccountAcquired, Cancelled, Configured, Confirmed, DeployIssued, ProjectReady};

/// Where a deploy command left things.
#[derive(Debug)]
pub enum Settled {
    Confirmed(Deployment<Confirmed>),
    Cancelled(Deployment<Cancelled>),
}

impl Settled {
    pub fn finish(self) -> super::DeploymentReport {
        match self {
            Settled::Confirmed(d) => d.finish(),
            Settled::Cancelled(d) => d.finish(),
        }
    }
}

// =============================================================================
// Start -> AccountAcquired
// =============================================================================

impl Deployment<AccountAcquired> {
    /// Lease a fee payer, waiting for one to become free.
    pub async fn acquire(request: DeployRequest, pool: &AccountPool) -> Result<Self, DeployError> {
        let lease = pool.acquire().await.map_err(DeployError::pool)?;
        tracing::info!(
            "[{}] Acquired fee payer {}",
            request,
            lease.account().public_key()
        );

        Ok(Deployment {
            request,
            lease,
            started: Instant::now(),
            diagnostics: Diagnostics::default(),
            state: AccountAcquired,
        })
    }

    // =========================================================================
    // AccountAcquired -> ProjectReady
    // =========================================================================

    /// Generate a project named `name` in the workspace.
    pub async fn generate_project(
        self,
        ctx: &DeployContext,
        name: &str,
    ) -> Result<Deployment<ProjectReady>, DeployError> {
        let project_request = ProjectRequest {
            name: name.to_string(),
            ui: self.request.ui,
            interactive: self.request.interactive,
            parent_dir: ctx.settings.workspace.clone(),
        };

        let project = ctx
            .generator
            .generate(&project_request, &ctx.driver)
            .await
            .map_err(DeployError::generation)?;

        tracing::info!("[{}] Project ready at {}", self.request, project.root.display());
        Ok(self.advance(|_| ProjectReady { project }))
    }
}

// =============================================================================
// ProjectReady -> Configured
// =============================================================================

impl Deployment<ProjectReady> {
    /// Write the deployment alias, zkApp key and fee payer key cache entry.
    ///
    /// The cache entry is created first so that any later failure drops
    /// and purges it.
    pub async fn configure(
        self,
        ctx: &DeployContext,
    ) -> Result<Deployment<Configured>, DeployError> {
        let settings = &ctx.settings;

        let zkapp = ctx
            .keys
            .generate(&ctx.driver)
            .await
            .map_err(DeployError::keys)?;

        let fee_payer_alias = AliasName::random_with_prefix("fee-payer");
        let key_cache = KeyCacheEntry::create(
            &settings.key_cache_dir,
            fee_payer_alias.clone(),
            self.lease.account().key_pair(),
        )
        .map_err(|e| {
            DeployError::io(
                Stage::Configuration,
                &cache_path(&settings.key_cache_dir, &fee_payer_alias),
                e,
            )
        })?;

        let alias = DeploymentAlias::new(
            AliasName::random_with_prefix("deploy"),
            fee_payer_alias,
            &settings.endpoint,
            &settings.network_id,
            &settings.fee,
            &settings.key_cache_dir,
        );

        let contracts = self.state.project.contracts_dir();
        alias
            .write_into(&contracts, &zkapp)
            .map_err(|e| DeployError::io(Stage::Configuration, &contracts, e))?;

        tracing::info!(
            "[{}] Configured alias {} for zkApp {}",
            self.request,
            alias.name,
            zkapp.public_key
        );

        Ok(self.advance(|ready| Configured {
            project: ready.project,
            alias,
            zkapp,
            key_cache,
        }))
    }
}

// =============================================================================
// Configured -> DeployIssued
// =============================================================================

impl Deployment<Configured> {
    /// Run `<cli> deploy <alias>` in the contracts directory.
    ///
    /// Flag mode passes `-y`; interactive mode answers the confirmation
    /// prompt with `yes`, or `no` when the request asks to cancel.
    pub async fn issue_deploy(
        self,
        ctx: &DeployContext,
    ) -> Result<Deployment<DeployIssued>, DeployError> {
        let contracts = self.state.project.contracts_dir();
        let mut invocation = Invocation::new(&ctx.settings.cli, &contracts)
            .arg("deploy")
            .arg(self.state.alias.name.as_str())
            .timeout(ctx.settings.deploy_timeout);

        invocation = if self.request.interactive {
            let answer = if self.request.cancel { "no" } else { "yes" };
            invocation
                .dialog(Dialog::new().answer(CONFIRM_PROMPT, answer))
                .require_dialog()
        } else {
            invocation.arg("-y")
        };

        tracing::info!("[{}] Running {}", self.request, invocation.command_line());
        let transcript = ctx
            .driver
            .run(invocation)
            .await
            .map_err(|e| DeployError::process(Stage::DeployInvocation, e))?;

        Ok(self.advance(|configured| DeployIssued {
            project: configured.project,
            alias: configured.alias,
            zkapp: configured.zkapp,
            key_cache: configured.key_cache,
            transcript,
        }))
    }
}

// =============================================================================
// DeployIssued -> Confirmed | Cancelled
// =============================================================================

impl Deployment<DeployIssued> {
    /// Interpret the deploy output and, when a transaction was sent, wait
    /// for it on-chain and check the zkApp account.
    ///
    /// The fee payer key cache entry is purged before anything else.
    pub async fn settle(self, ctx: &DeployContext) -> Result<Settled, DeployError> {
        let (mut rest, state) = self.split();
        let DeployIssued {
            project,
            alias,
            zkapp,
            key_cache,
            transcript,
        } = state;

        let cache_file = key_cache.path().to_path_buf();
        if let Err(e) = key_cache.purge() {
            rest.diagnostics.warn(Warning::key_cache_purge(format!(
                "failed to purge fee payer key {}: {}",
                cache_file.display(),
                e
            )));
        }

        let invocation_error = |e| DeployError::process(Stage::DeployInvocation, e);
        transcript.check_timeout().map_err(invocation_error)?;
        transcript.check_dialog().map_err(invocation_error)?;

        if rest.request.cancel {
            if transcript.contains(SUCCESS_MARKER) {
                return Err(DeployError::new(
                    Stage::DeployInvocation,
                    DeployErrorKind::UnexpectedOutcome,
                    "transaction was sent although the confirmation was declined",
                ));
            }
            if !transcript.contains(ABORT_MARKER) {
                return Err(missing_marker(ABORT_MARKER, &transcript.tail(20)));
            }
            return Ok(Settled::Cancelled(rest.advance(|()| Cancelled {
                project,
                alias,
                transcript,
            })));
        }

        if !transcript.success() {
            return Err(DeployError::new(
                Stage::DeployInvocation,
                DeployErrorKind::ProcessFailed,
                format!("deploy exited with {}:\n{}", transcript.exit(), transcript.tail(20)),
            ));
        }
        for marker in [SUCCESS_MARKER, NEXT_STEP_HINT] {
            if !transcript.contains(marker) {
                return Err(missing_marker(marker, &transcript.tail(20)));
            }
        }

        let last_line = transcript.last_non_empty_line().unwrap_or_default();
        let hash = extract_transaction_hash(last_line).ok_or_else(|| {
            DeployError::new(
                Stage::DeployInvocation,
                DeployErrorKind::InvalidOutput,
                format!("no transaction hash at the end of '{}'", last_line),
            )
        })?;

        tracing::info!("[{}] Waiting for transaction {}", rest.request, hash);
        let inclusion = ctx
            .poller
            .wait_for_inclusion(&hash, ctx.settings.poll_interval, ctx.settings.max_wait)
            .await
            .map_err(DeployError::chain)?;

        let account = ctx
            .poller
            .fetch_account(&zkapp.public_key)
            .await
            .map_err(DeployError::chain)?;
        if !account.has_verification_key() {
            return Err(DeployError::new(
                Stage::ChainConfirmation,
                DeployErrorKind::MissingVerificationKey,
                format!("zkApp account {} has no verification key", zkapp.public_key),
            ));
        }

        Ok(Settled::Confirmed(rest.advance(|()| Confirmed {
            project,
            alias,
            zkapp: zkapp.public_key,
            inclusion,
            account,
        })))
    }
}

fn missing_marker(marker: &str, tail: &str) -> DeployError {
    DeployError::new(
        Stage::DeployInvocation,
        DeployErrorKind::MissingMarker,
        format!("deploy output lacks '{}':\n{}", marker, tail),
    )
}
