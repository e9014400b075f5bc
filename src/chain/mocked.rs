// ABOUTME: Offline ledger that answers every query with a synthetic success.
// ABOUTME: Never opens a network connection.

use async_trait::async_trait;

use super::{AccountDetails, ChainError, LedgerClient, TransactionRecord, TransactionStatus, VerificationKey};
use crate::types::{PublicKey, TransactionHash};

/// Verification key hash reported for every mocked account.
pub const MOCKED_VERIFICATION_KEY_HASH: &str = "mocked-verification-key";

#[derive(Debug, Clone, Copy, Default)]
pub struct MockedLedger;

impl MockedLedger {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LedgerClient for MockedLedger {
    async fn transaction(&self, hash: &TransactionHash) -> Result<TransactionRecord, ChainError> {
        tracing::debug!("Mocked ledger reports {} as included", hash);
        Ok(TransactionRecord {
            hash: hash.clone(),
            status: TransactionStatus::Included,
        })
    }

    async fn account(&self, public_key: &PublicKey) -> Result<AccountDetails, ChainError> {
        Ok(AccountDetails {
            public_key: public_key.clone(),
            verification_key: Some(VerificationKey {
                hash: MOCKED_VERIFICATION_KEY_HASH.to_string(),
                data: format!("mocked:{}", public_key),
            }),
            balance: None,
        })
    }

    fn is_mocked(&self) -> bool {
        true
    }
}
