// ABOUTME: Configuration types and parsing for harness.yml.
// ABOUTME: Handles YAML parsing, env var interpolation, and path resolution.

mod deserialize;
mod env_value;
mod init;

pub use env_value::EnvValue;
pub use init::init_config;

use crate::chain::Endpoint;
use crate::error::{Error, Result};
use crate::types::UiVariant;
use deserialize::{deserialize_home_path_option, deserialize_ui_variants, expand_home};
use nonempty::NonEmpty;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "harness.yml";
pub const CONFIG_FILENAME_ALT: &str = "harness.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".harness/config.yml";

/// Where the zkApp CLI looks up fee payer keys by alias.
pub const DEFAULT_KEY_CACHE_DIR: &str = "~/.cache/zkapp-cli/keys";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cli: CliConfig,

    pub accounts: AccountsConfig,

    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub poll: PollConfig,

    pub keygen: KeygenConfig,

    #[serde(default, deserialize_with = "deserialize_home_path_option")]
    pub key_cache_dir: Option<PathBuf>,

    #[serde(
        default = "default_ui_variants",
        deserialize_with = "deserialize_ui_variants"
    )]
    pub ui_variants: NonEmpty<UiVariant>,

    #[serde(default = "default_workspace")]
    pub workspace: PathBuf,

    /// Leave generated projects on disk after each attempt.
    #[serde(default)]
    pub keep_projects: bool,

    /// Upper bound on a whole attempt, acquisition included.
    #[serde(default, with = "humantime_serde")]
    pub attempt_timeout: Option<Duration>,

    /// Directory relative paths are resolved against.
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    #[serde(default = "default_executable")]
    pub executable: String,

    #[serde(default = "default_keystroke_delay", with = "humantime_serde")]
    pub keystroke_delay: Duration,

    #[serde(default = "default_generate_timeout", with = "humantime_serde")]
    pub generate_timeout: Duration,

    #[serde(default = "default_deploy_timeout", with = "humantime_serde")]
    pub deploy_timeout: Duration,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            keystroke_delay: default_keystroke_delay(),
            generate_timeout: default_generate_timeout(),
            deploy_timeout: default_deploy_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountsConfig {
    /// JSON file of `{publicKey, privateKey}` entries.
    pub inventory: EnvValue,

    #[serde(default = "default_acquire_timeout", with = "humantime_serde")]
    pub acquire_timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    /// GraphQL URL, or `mocked`.
    #[serde(default = "default_endpoint")]
    pub endpoint: EnvValue,

    #[serde(default = "default_network_id")]
    pub network_id: String,

    #[serde(default = "default_fee")]
    pub fee: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            network_id: default_network_id(),
            fee: default_fee(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub interval: Duration,

    #[serde(default = "default_max_wait", with = "humantime_serde")]
    pub max_wait: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: default_poll_interval(),
            max_wait: default_max_wait(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeygenConfig {
    pub executable: String,
    #[serde(default)]
    pub args: Vec<String>,
}

fn default_executable() -> String {
    "zk".to_string()
}

fn default_keystroke_delay() -> Duration {
    Duration::from_millis(50)
}

fn default_generate_timeout() -> Duration {
    Duration::from_secs(15 * 60)
}

fn default_deploy_timeout() -> Duration {
    Duration::from_secs(10 * 60)
}

fn default_acquire_timeout() -> Duration {
    crate::pool::DEFAULT_ACQUIRE_TIMEOUT
}

fn default_endpoint() -> EnvValue {
    EnvValue::from_env("MINA_GRAPHQL_ENDPOINT", Some("mocked"))
}

fn default_network_id() -> String {
    "testnet".to_string()
}

fn default_fee() -> String {
    "0.1".to_string()
}

fn default_poll_interval() -> Duration {
    Duration::from_secs(10)
}

fn default_max_wait() -> Duration {
    Duration::from_secs(15 * 60)
}

fn default_ui_variants() -> NonEmpty<UiVariant> {
    NonEmpty::from((UiVariant::ALL[0], UiVariant::ALL[1..].to_vec()))
}

fn default_workspace() -> PathBuf {
    PathBuf::from(".harness/projects")
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::from_yaml(&content)?;
        // `.harness/config.yml` resolves against the project root, not `.harness/`.
        let dir = path.parent().unwrap_or(Path::new("."));
        config.base_dir = if dir.ends_with(".harness") {
            dir.parent().unwrap_or(dir).to_path_buf()
        } else {
            dir.to_path_buf()
        };
        Ok(config)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!("Using config {}", path.display());
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    fn validate(&self) -> Result<()> {
        if self.cli.executable.trim().is_empty() {
            return Err(Error::InvalidConfig("cli.executable cannot be empty".into()));
        }
        if self.keygen.executable.trim().is_empty() {
            return Err(Error::InvalidConfig("keygen.executable cannot be empty".into()));
        }
        if self.poll.interval.is_zero() {
            return Err(Error::InvalidConfig("poll.interval must be positive".into()));
        }
        if self.poll.max_wait < self.poll.interval {
            return Err(Error::InvalidConfig(
                "poll.max_wait must be at least poll.interval".into(),
            ));
        }
        Ok(())
    }

    /// Resolve `path` against the config directory unless it is absolute.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }

    pub fn inventory_path(&self) -> Result<PathBuf> {
        let raw = self.accounts.inventory.resolve()?;
        Ok(self.resolve_path(&expand_home(&raw)))
    }

    pub fn endpoint(&self) -> Result<Endpoint> {
        let raw = self.network.endpoint.resolve()?;
        raw.parse()
            .map_err(|e: crate::chain::ChainError| Error::InvalidConfig(e.to_string()))
    }

    pub fn key_cache_dir(&self) -> PathBuf {
        match &self.key_cache_dir {
            Some(dir) => self.resolve_path(dir),
            None => expand_home(DEFAULT_KEY_CACHE_DIR),
        }
    }

    pub fn workspace_dir(&self) -> PathBuf {
        self.resolve_path(&self.workspace)
    }
}
