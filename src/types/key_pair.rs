// ABOUTME: Key pair as stored in zkApp CLI key files and the account inventory.
// ABOUTME: The private key is redacted from Debug output.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::PublicKey;

/// Base58 private key. Never printed.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrivateKey(String);

impl PrivateKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// `{ "publicKey": ..., "privateKey": ... }`, the zkApp CLI key file layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyPair {
    pub public_key: PublicKey,
    pub private_key: PrivateKey,
}

impl KeyPair {
    pub fn new(public_key: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            public_key: PublicKey::new(public_key),
            private_key: PrivateKey::new(private_key),
        }
    }
}
