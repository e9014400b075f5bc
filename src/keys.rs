// ABOUTME: Key pair generation for freshly deployed zkApp accounts.
// ABOUTME: Delegates to an external command that prints a JSON key pair.

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;

use crate::process::{Invocation, ProcessDriver, ProcessError};
use crate::types::KeyPair;

#[derive(Debug, thiserror::Error)]
pub enum KeyError {
    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error("key generator exited with {exit}: {stderr}")]
    Failed { exit: String, stderr: String },

    #[error("key generator printed no key pair")]
    NoOutput,

    #[error("key generator output is not a key pair: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Produces key pairs for new zkApp accounts.
#[async_trait]
pub trait KeyGenerator: Send + Sync {
    async fn generate(&self, driver: &ProcessDriver) -> Result<KeyPair, KeyError>;
}

/// Runs a command whose last stdout line is `{"publicKey": ..., "privateKey": ...}`.
#[derive(Debug, Clone)]
pub struct CommandKeyGenerator {
    program: String,
    args: Vec<String>,
    working_dir: PathBuf,
    timeout: Duration,
}

impl CommandKeyGenerator {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            working_dir: std::env::temp_dir(),
            timeout: Duration::from_secs(60),
        }
    }

    /// Directory the command runs in; relative script paths resolve against it.
    pub fn with_working_dir(mut self, dir: PathBuf) -> Self {
        if !dir.as_os_str().is_empty() {
            self.working_dir = dir;
        }
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl KeyGenerator for CommandKeyGenerator {
    async fn generate(&self, driver: &ProcessDriver) -> Result<KeyPair, KeyError> {
        let invocation = Invocation::new(&self.program, &self.working_dir)
            .args(&self.args)
            .timeout(self.timeout);

        let transcript = driver.run(invocation).await?;
        transcript.check_timeout()?;
        if !transcript.success() {
            return Err(KeyError::Failed {
                exit: transcript.exit().to_string(),
                stderr: transcript.stderr_lines().join("\n"),
            });
        }

        let line = transcript.last_non_empty_line().ok_or(KeyError::NoOutput)?;
        let pair: KeyPair = serde_json::from_str(line.trim())?;
        tracing::debug!("Generated zkApp key {}", pair.public_key);
        Ok(pair)
    }
}
