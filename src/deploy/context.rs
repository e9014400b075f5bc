// ABOUTME: Collaborators and settings shared by every deployment attempt.
// ABOUTME: Built once per session from configuration or assembled directly in tests.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::chain::{ChainPoller, Endpoint};
use crate::config::Config;
use crate::error::Result;
use crate::keys::{CommandKeyGenerator, KeyGenerator};
use crate::process::ProcessDriver;
use crate::project::{CliProjectGenerator, ProjectGenerator};

/// Knobs for one deployment attempt.
#[derive(Debug, Clone)]
pub struct DeploySettings {
    /// zkApp CLI executable used for `deploy`.
    pub cli: String,
    /// Directory generated projects are created in.
    pub workspace: PathBuf,
    /// Fee payer key cache read by the zkApp CLI.
    pub key_cache_dir: PathBuf,
    pub endpoint: Endpoint,
    pub network_id: String,
    pub fee: String,
    pub poll_interval: Duration,
    pub max_wait: Duration,
    pub deploy_timeout: Duration,
    pub keep_projects: bool,
    pub attempt_timeout: Option<Duration>,
}

impl DeploySettings {
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            cli: config.cli.executable.clone(),
            workspace: config.workspace_dir(),
            key_cache_dir: config.key_cache_dir(),
            endpoint: config.endpoint()?,
            network_id: config.network.network_id.clone(),
            fee: config.network.fee.clone(),
            poll_interval: config.poll.interval,
            max_wait: config.poll.max_wait,
            deploy_timeout: config.cli.deploy_timeout,
            keep_projects: config.keep_projects,
            attempt_timeout: config.attempt_timeout,
        })
    }
}

/// Everything a deployment talks to, apart from the account pool.
pub struct DeployContext {
    pub settings: DeploySettings,
    pub driver: ProcessDriver,
    pub generator: Arc<dyn ProjectGenerator>,
    pub keys: Arc<dyn KeyGenerator>,
    pub poller: ChainPoller,
}

impl DeployContext {
    /// Poller chosen by the configured endpoint, default driver.
    pub fn new(
        settings: DeploySettings,
        generator: Arc<dyn ProjectGenerator>,
        keys: Arc<dyn KeyGenerator>,
    ) -> Result<Self> {
        let poller = ChainPoller::for_endpoint(&settings.endpoint)?;
        Ok(Self {
            settings,
            driver: ProcessDriver::default(),
            generator,
            keys,
            poller,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let settings = DeploySettings::from_config(config)?;
        let generator = CliProjectGenerator::new(&config.cli.executable, config.cli.generate_timeout);
        let keys = CommandKeyGenerator::new(&config.keygen.executable, config.keygen.args.clone())
            .with_working_dir(config.base_dir.clone());

        Ok(Self::new(settings, Arc::new(generator), Arc::new(keys))?
            .with_driver(ProcessDriver::default().with_keystroke_delay(config.cli.keystroke_delay)))
    }

    pub fn with_driver(mut self, driver: ProcessDriver) -> Self {
        self.driver = driver;
        self
    }

    pub fn with_poller(mut self, poller: ChainPoller) -> Self {
        self.poller = poller;
        self
    }
}

impl std::fmt::Debug for DeployContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeployContext")
            .field("settings", &self.settings)
            .field("driver", &self.driver)
            .field("poller", &self.poller)
            .finish()
    }
}
