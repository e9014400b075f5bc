// ABOUTME: Ledger query trait and the records it returns.
// ABOUTME: Implemented by the GraphQL client and the offline mocked ledger.

use async_trait::async_trait;
use serde::Serialize;

use super::ChainError;
use crate::types::{PublicKey, TransactionHash};

/// Inclusion state of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TransactionStatus {
    /// The ledger has no record of the hash yet.
    Unknown,
    /// Seen in the mempool, not yet in a block.
    Pending,
    Included,
    Failed { reason: String },
}

impl TransactionStatus {
    /// Included or failed; polling stops.
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Included | Self::Failed { .. })
    }
}

/// Transaction as read from the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    pub hash: TransactionHash,
    pub status: TransactionStatus,
}

impl TransactionRecord {
    pub fn failure_reason(&self) -> Option<&str> {
        match &self.status {
            TransactionStatus::Failed { reason } => Some(reason),
            _ => None,
        }
    }
}

/// Verification key stored on a zkApp account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationKey {
    pub hash: String,
    pub data: String,
}

/// Account state relevant to a deployment check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountDetails {
    pub public_key: PublicKey,
    pub verification_key: Option<VerificationKey>,
    pub balance: Option<String>,
}

impl AccountDetails {
    /// True once a contract has been deployed to the account.
    pub fn has_verification_key(&self) -> bool {
        self.verification_key
            .as_ref()
            .is_some_and(|vk| !vk.data.trim().is_empty())
    }
}

/// Read-only queries against a ledger.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Look up a transaction by hash.
    async fn transaction(&self, hash: &TransactionHash) -> Result<TransactionRecord, ChainError>;

    /// Fetch an account by public key. Missing accounts are `AccountNotFound`.
    async fn account(&self, public_key: &PublicKey) -> Result<AccountDetails, ChainError>;

    /// Whether answers are synthetic.
    fn is_mocked(&self) -> bool {
        false
    }
}
