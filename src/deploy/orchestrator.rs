// ABOUTME: Runs whole deployment attempts against a shared account pool.
// ABOUTME: Tracks the current stage so a timed-out attempt reports where it stalled.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use uuid::Uuid;

use crate::config::Config;
use crate::diagnostics::Warning;
use crate::error::Result;
use crate::pool::{AccountInventory, AccountPool};

use super::context::DeployContext;
use super::deployment::{DeployRequest, Deployment, DeploymentReport};
use super::error::{DeployError, DeployErrorKind, Stage};

/// Runs deployment attempts. Cheap to clone; clones share the pool.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    pool: AccountPool,
    context: Arc<DeployContext>,
}

impl Orchestrator {
    pub fn new(pool: AccountPool, context: DeployContext) -> Self {
        Self {
            pool,
            context: Arc::new(context),
        }
    }

    /// Load the account inventory and build every collaborator from config.
    pub fn from_config(config: &Config) -> Result<Self> {
        let inventory = AccountInventory::load(&config.inventory_path()?)?;
        let pool = AccountPool::with_acquire_timeout(inventory, config.accounts.acquire_timeout);
        Ok(Self::new(pool, DeployContext::from_config(config)?))
    }

    pub fn pool(&self) -> &AccountPool {
        &self.pool
    }

    pub fn context(&self) -> &DeployContext {
        &self.context
    }

    /// Run one attempt, bounded by the configured attempt timeout if any.
    pub async fn run(&self, request: DeployRequest) -> std::result::Result<DeploymentReport, DeployError> {
        match self.context.settings.attempt_timeout {
            Some(limit) => self.run_with_timeout(request, limit).await,
            None => {
                let mut stage = Stage::AccountAcquisition;
                self.attempt(request, &mut stage).await
            }
        }
    }

    /// Run one attempt, giving up after `limit`.
    ///
    /// On expiry the attempt is dropped: the child process is killed, the
    /// fee payer released and its key cache entry purged. The error names
    /// the stage that was in progress.
    pub async fn run_with_timeout(
        &self,
        request: DeployRequest,
        limit: Duration,
    ) -> std::result::Result<DeploymentReport, DeployError> {
        let mut stage = Stage::AccountAcquisition;
        let outcome = tokio::time::timeout(limit, self.attempt(request, &mut stage)).await;

        match outcome {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("[{}] Attempt timed out during {}", request, stage);
                Err(DeployError::new(
                    stage,
                    DeployErrorKind::Timeout,
                    format!("attempt {} exceeded {}s", request, limit.as_secs()),
                ))
            }
        }
    }

    /// Run every request concurrently through the shared pool.
    ///
    /// Results come back in request order.
    pub async fn run_all(
        &self,
        requests: Vec<DeployRequest>,
    ) -> Vec<std::result::Result<DeploymentReport, DeployError>> {
        join_all(requests.into_iter().map(|request| self.run(request))).await
    }

    async fn attempt(
        &self,
        request: DeployRequest,
        stage: &mut Stage,
    ) -> std::result::Result<DeploymentReport, DeployError> {
        if request.cancel && !request.interactive {
            return Err(DeployError::new(
                Stage::AccountAcquisition,
                DeployErrorKind::InvalidRequest,
                "cancelling a deployment requires interactive mode",
            ));
        }

        let ctx = &*self.context;
        let name = format!("zkapp-{}", Uuid::new_v4().simple());
        let scratch = ScratchProject {
            root: ctx.settings.workspace.join(&name),
            keep: ctx.settings.keep_projects,
        };

        *stage = Stage::AccountAcquisition;
        let deployment = Deployment::acquire(request, &self.pool).await?;

        *stage = Stage::ProjectGeneration;
        let deployment = deployment.generate_project(ctx, &name).await?;

        *stage = Stage::Configuration;
        let deployment = deployment.configure(ctx).await?;

        *stage = Stage::DeployInvocation;
        let deployment = deployment.issue_deploy(ctx).await?;

        *stage = Stage::ChainConfirmation;
        let mut report = deployment.settle(ctx).await?.finish();

        if let Err(e) = scratch.remove() {
            let warning = Warning::project_cleanup(format!(
                "failed to remove project {}: {}",
                report.project.display(),
                e
            ));
            tracing::warn!("{}", warning.message);
            report.warnings.push(warning.message);
        }
        Ok(report)
    }
}

/// Generated project directory, removed when the attempt ends unless kept.
struct ScratchProject {
    root: PathBuf,
    keep: bool,
}

impl ScratchProject {
    fn remove(mut self) -> std::io::Result<()> {
        let keep = std::mem::replace(&mut self.keep, true);
        if keep || !self.root.exists() {
            return Ok(());
        }
        std::fs::remove_dir_all(&self.root)
    }
}

impl Drop for ScratchProject {
    fn drop(&mut self) {
        if self.keep || !self.root.exists() {
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.root) {
            tracing::warn!("Failed to remove project {}: {}", self.root.display(), e);
        }
    }
}
