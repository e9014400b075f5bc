// ABOUTME: Deployment alias written into a project, and the fee payer key cache entry.
// ABOUTME: The cache entry is purged when its guard is dropped.

use serde::Serialize;
use serde_json::{Map, Value, json};
use std::io;
use std::path::{Path, PathBuf};

use crate::chain::Endpoint;
use crate::types::{AliasName, KeyPair};

/// Project configuration file holding deployment aliases.
pub const PROJECT_CONFIG_FILE: &str = "config.json";
/// Directory for zkApp key files, relative to the contracts directory.
pub const KEYS_DIR: &str = "keys";

/// Named binding of a project to a network and a fee payer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentAlias {
    #[serde(skip)]
    pub name: AliasName,
    pub network_id: String,
    pub url: String,
    /// zkApp key file, relative to the contracts directory.
    pub key_path: String,
    #[serde(rename = "feepayerKeyPath")]
    pub fee_payer_key_path: String,
    #[serde(rename = "feepayerAlias")]
    pub fee_payer_alias: AliasName,
    pub fee: String,
}

impl DeploymentAlias {
    pub fn new(
        name: AliasName,
        fee_payer_alias: AliasName,
        endpoint: &Endpoint,
        network_id: impl Into<String>,
        fee: impl Into<String>,
        key_cache_dir: &Path,
    ) -> Self {
        Self {
            key_path: format!("{}/{}.json", KEYS_DIR, name),
            fee_payer_key_path: cache_path(key_cache_dir, &fee_payer_alias)
                .to_string_lossy()
                .into_owned(),
            name,
            network_id: network_id.into(),
            url: endpoint.url().to_string(),
            fee_payer_alias,
            fee: fee.into(),
        }
    }

    /// Write the zkApp key file and add this alias to `config.json`.
    ///
    /// Other aliases already in the file are preserved.
    pub fn write_into(&self, contracts_dir: &Path, zkapp_keys: &KeyPair) -> io::Result<()> {
        let key_file = contracts_dir.join(&self.key_path);
        if let Some(parent) = key_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        write_json(&key_file, &serde_json::to_value(zkapp_keys)?)?;

        let config_path = contracts_dir.join(PROJECT_CONFIG_FILE);
        let mut config = match std::fs::read_to_string(&config_path) {
            Ok(content) => serde_json::from_str::<Value>(&content)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => json!({ "version": 1 }),
            Err(e) => return Err(e),
        };

        let root = config.as_object_mut().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidData, "config.json is not an object")
        })?;
        let aliases = root
            .entry("deployAliases")
            .or_insert_with(|| Value::Object(Map::new()))
            .as_object_mut()
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidData, "deployAliases is not an object")
            })?;
        aliases.insert(self.name.to_string(), serde_json::to_value(self)?);

        write_json(&config_path, &config)?;
        tracing::debug!("Wrote deploy alias {} to {}", self.name, config_path.display());
        Ok(())
    }
}

/// Fee payer key file in the shared key cache. Removed on drop.
#[derive(Debug)]
pub struct KeyCacheEntry {
    alias: AliasName,
    path: PathBuf,
    purged: bool,
}

impl KeyCacheEntry {
    pub fn create(cache_dir: &Path, alias: AliasName, keys: &KeyPair) -> io::Result<Self> {
        std::fs::create_dir_all(cache_dir)?;
        let path = cache_path(cache_dir, &alias);
        write_json(&path, &serde_json::to_value(keys)?)?;
        Ok(Self {
            alias,
            path,
            purged: false,
        })
    }

    pub fn alias(&self) -> &AliasName {
        &self.alias
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the cache file now. A missing file counts as purged.
    pub fn purge(mut self) -> io::Result<()> {
        self.purged = true;
        remove_if_exists(&self.path)
    }
}

impl Drop for KeyCacheEntry {
    fn drop(&mut self) {
        if self.purged {
            return;
        }
        self.purged = true;
        if let Err(e) = remove_if_exists(&self.path) {
            tracing::warn!("Failed to purge fee payer key {}: {}", self.path.display(), e);
        }
    }
}

/// Path of the cached key for a fee payer alias.
pub fn cache_path(cache_dir: &Path, alias: &AliasName) -> PathBuf {
    cache_dir.join(format!("{}.json", alias))
}

fn remove_if_exists(path: &Path) -> io::Result<()> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

fn write_json(path: &Path, value: &Value) -> io::Result<()> {
    let mut content = serde_json::to_string_pretty(value)?;
    content.push('\n');
    std::fs::write(path, content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn alias(cache: &Path) -> DeploymentAlias {
        DeploymentAlias::new(
            AliasName::new("e2e").unwrap(),
            AliasName::new("payer").unwrap(),
            &Endpoint::mocked(),
            "testnet",
            "0.1",
            cache,
        )
    }

    #[test]
    fn writes_alias_and_key_file() {
        let dir = TempDir::new().unwrap();
        let alias = alias(&dir.path().join("cache"));
        alias
            .write_into(dir.path(), &KeyPair::new("B62qzk", "EKEzk"))
            .unwrap();

        let key: Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("keys/e2e.json")).unwrap())
                .unwrap();
        assert_eq!(key["publicKey"], "B62qzk");

        let config: Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("config.json")).unwrap())
                .unwrap();
        assert_eq!(config["version"], 1);
        let entry = &config["deployAliases"]["e2e"];
        assert_eq!(entry["networkId"], "testnet");
        assert_eq!(entry["keyPath"], "keys/e2e.json");
        assert_eq!(entry["feepayerAlias"], "payer");
        assert_eq!(entry["fee"], "0.1");
        assert!(entry["feepayerKeyPath"].as_str().unwrap().ends_with("payer.json"));
        assert!(entry.get("name").is_none());
    }

    #[test]
    fn keeps_existing_aliases() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("config.json"),
            r#"{"version":1,"deployAliases":{"other":{"fee":"1"}}}"#,
        )
        .unwrap();

        alias(dir.path())
            .write_into(dir.path(), &KeyPair::new("B62qzk", "EKEzk"))
            .unwrap();

        let config: Value =
            serde_json::from_str(&std::fs::read_to_string(dir.path().join("config.json")).unwrap())
                .unwrap();
        assert_eq!(config["deployAliases"]["other"]["fee"], "1");
        assert!(config["deployAliases"]["e2e"].is_object());
    }

    #[test]
    fn cache_entry_is_purged_on_drop() {
        let dir = TempDir::new().unwrap();
        let entry = KeyCacheEntry::create(
            dir.path(),
            AliasName::new("payer").unwrap(),
            &KeyPair::new("B62q", "EKE"),
        )
        .unwrap();
        let path = entry.path().to_path_buf();
        assert!(path.is_file());

        drop(entry);
        assert!(!path.exists());
    }

    #[test]
    fn purge_tolerates_missing_file() {
        let dir = TempDir::new().unwrap();
        let entry = KeyCacheEntry::create(
            dir.path(),
            AliasName::new("payer").unwrap(),
            &KeyPair::new("B62q", "EKE"),
        )
        .unwrap();
        std::fs::remove_file(entry.path()).unwrap();
        entry.purge().unwrap();
    }
}
