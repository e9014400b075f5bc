// ABOUTME: Fixed inventory of pre-funded fee payer accounts.
// ABOUTME: Loaded from a JSON file provisioned out-of-band; never created by the pool.

use nonempty::NonEmpty;
use std::collections::HashSet;
use std::path::Path;

use crate::types::{KeyPair, PrivateKey, PublicKey};

use super::{InventoryError, PoolError};

/// A funded account that can pay transaction fees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    keys: KeyPair,
}

impl Account {
    pub fn new(keys: KeyPair) -> Self {
        Self { keys }
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.keys.public_key
    }

    pub fn private_key(&self) -> &PrivateKey {
        &self.keys.private_key
    }

    pub fn key_pair(&self) -> &KeyPair {
        &self.keys
    }
}

/// The accounts a pool is built from. Always non-empty, no duplicate keys.
#[derive(Debug, Clone)]
pub struct AccountInventory {
    accounts: NonEmpty<Account>,
}

impl AccountInventory {
    pub fn new(accounts: Vec<Account>) -> Result<Self, InventoryError> {
        let mut seen = HashSet::new();
        for account in &accounts {
            if !seen.insert(account.public_key().clone()) {
                return Err(InventoryError::Duplicate(account.public_key().clone()));
            }
        }

        NonEmpty::from_vec(accounts)
            .map(|accounts| Self { accounts })
            .ok_or(InventoryError::Empty)
    }

    /// Parse a JSON array of `{ "publicKey": ..., "privateKey": ... }`.
    pub fn from_json(json: &str) -> Result<Self, InventoryError> {
        let pairs: Vec<KeyPair> = serde_json::from_str(json)?;
        Self::new(pairs.into_iter().map(Account::new).collect())
    }

    pub fn load(path: &Path) -> Result<Self, PoolError> {
        let content = std::fs::read_to_string(path).map_err(|source| PoolError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content).map_err(|source| PoolError::Inventory {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.accounts.iter()
    }

    pub(crate) fn into_vec(self) -> Vec<Account> {
        self.accounts.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_key_file_layout() {
        let json = r#"[
            {"publicKey": "B62qa", "privateKey": "EKEa"},
            {"publicKey": "B62qb", "privateKey": "EKEb"}
        ]"#;
        let inventory = AccountInventory::from_json(json).unwrap();
        assert_eq!(inventory.len(), 2);
        let keys: Vec<_> = inventory.iter().map(|a| a.public_key().as_str()).collect();
        assert_eq!(keys, vec!["B62qa", "B62qb"]);
    }

    #[test]
    fn rejects_empty_inventory() {
        let err = AccountInventory::from_json("[]").unwrap_err();
        assert!(matches!(err, InventoryError::Empty));
        assert!(err.to_string().contains("at least one account"));
    }

    #[test]
    fn rejects_duplicate_keys() {
        let json = r#"[
            {"publicKey": "B62qa", "privateKey": "EKEa"},
            {"publicKey": "B62qa", "privateKey": "EKEb"}
        ]"#;
        let err = AccountInventory::from_json(json).unwrap_err();
        assert!(matches!(&err, InventoryError::Duplicate(key) if key.as_str() == "B62qa"));
        assert_eq!(err.to_string(), "duplicate account B62qa");
    }
}
