// ABOUTME: Config scaffolding for new harness setups.
// ABOUTME: Creates a commented harness.yml template.

use std::path::Path;

use crate::error::{Error, Result};

use super::CONFIG_FILENAME;

pub fn init_config(dir: &Path, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    std::fs::write(&config_path, template_yaml())?;
    Ok(())
}

pub(crate) fn template_yaml() -> &'static str {
    r#"cli:
  executable: zk
  keystroke_delay: 50ms
  generate_timeout: 15m
  deploy_timeout: 10m

accounts:
  # JSON array of {"publicKey": ..., "privateKey": ...} funded fee payers
  inventory:
    env: HARNESS_ACCOUNTS
    default: accounts.json
  acquire_timeout: 5m

network:
  # GraphQL URL of a Mina node, or "mocked" to skip chain checks
  endpoint:
    env: MINA_GRAPHQL_ENDPOINT
    default: mocked
  network_id: testnet
  fee: "0.1"

poll:
  interval: 10s
  max_wait: 15m

# Prints {"publicKey": ..., "privateKey": ...} for a fresh zkApp account
keygen:
  executable: node
  args: [scripts/keypair.mjs]

ui_variants: [svelte, next, nuxt, empty, none]
workspace: .harness/projects
# attempt_timeout: 30m
"#
}
