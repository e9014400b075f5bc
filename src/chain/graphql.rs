// ABOUTME: Ledger client speaking GraphQL over HTTP to a Mina node.
// ABOUTME: Inclusion comes from recent blocks, falling back to the pool status query.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use url::Url;

use super::{AccountDetails, ChainError, LedgerClient, TransactionRecord, TransactionStatus, VerificationKey};
use crate::types::{PublicKey, TransactionHash};

/// Per-request timeout; the poller bounds the overall wait.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Number of recent blocks searched for the transaction.
const BEST_CHAIN_LENGTH: u32 = 10;

const BEST_CHAIN_QUERY: &str = r#"query BestChain($maxLength: Int!) {
  bestChain(maxLength: $maxLength) {
    transactions {
      zkappCommands {
        hash
        failureReason {
          index
          failures
        }
      }
    }
  }
}"#;

const TX_STATUS_QUERY: &str = r#"query TxStatus($hash: String!) {
  transactionStatus(zkappTransaction: $hash)
}"#;

const ACCOUNT_QUERY: &str = r#"query Account($publicKey: PublicKey!) {
  account(publicKey: $publicKey) {
    publicKey
    balance {
      total
    }
    verificationKey {
      hash
      verificationKey
    }
  }
}"#;

#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BestChainData {
    #[serde(default)]
    best_chain: Option<Vec<Block>>,
}

#[derive(Debug, Deserialize)]
struct Block {
    transactions: BlockTransactions,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockTransactions {
    #[serde(default)]
    zkapp_commands: Vec<ZkappCommand>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ZkappCommand {
    hash: String,
    #[serde(default)]
    failure_reason: Option<Vec<FailureReason>>,
}

#[derive(Debug, Deserialize)]
struct FailureReason {
    #[serde(default)]
    failures: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TxStatusData {
    transaction_status: String,
}

#[derive(Debug, Deserialize)]
struct AccountData {
    account: Option<AccountNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountNode {
    public_key: String,
    balance: Option<Balance>,
    verification_key: Option<VerificationKeyNode>,
}

#[derive(Debug, Deserialize)]
struct Balance {
    total: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerificationKeyNode {
    hash: String,
    verification_key: String,
}

/// GraphQL ledger client.
#[derive(Debug, Clone)]
pub struct GraphQlLedger {
    url: Url,
    http: reqwest::Client,
}

impl GraphQlLedger {
    pub fn new(url: Url) -> Result<Self, ChainError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { url, http })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, ChainError> {
        let response = self
            .http
            .post(self.url.clone())
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?
            .error_for_status()?;

        let body: GraphQlResponse<T> = response.json().await?;
        if !body.errors.is_empty() {
            let messages: Vec<_> = body.errors.into_iter().map(|e| e.message).collect();
            return Err(ChainError::Query(messages.join("; ")));
        }
        body.data
            .ok_or_else(|| ChainError::Query("response carries no data".to_string()))
    }

    /// Search recent blocks. `None` when the hash is not in any of them.
    async fn find_in_best_chain(
        &self,
        hash: &TransactionHash,
    ) -> Result<Option<TransactionStatus>, ChainError> {
        let data: BestChainData = self
            .query(BEST_CHAIN_QUERY, json!({ "maxLength": BEST_CHAIN_LENGTH }))
            .await?;

        let found = data
            .best_chain
            .unwrap_or_default()
            .into_iter()
            .flat_map(|block| block.transactions.zkapp_commands)
            .find(|command| command.hash == hash.as_str());

        Ok(found.map(|command| {
            let failures: Vec<String> = command
                .failure_reason
                .unwrap_or_default()
                .into_iter()
                .flat_map(|reason| reason.failures)
                .collect();
            if failures.is_empty() {
                TransactionStatus::Included
            } else {
                TransactionStatus::Failed {
                    reason: failures.join(", "),
                }
            }
        }))
    }

    async fn pool_status(&self, hash: &TransactionHash) -> Result<TransactionStatus, ChainError> {
        let result: Result<TxStatusData, _> = self
            .query(TX_STATUS_QUERY, json!({ "hash": hash.as_str() }))
            .await;

        match result {
            Ok(data) => Ok(parse_status(&data.transaction_status)),
            // Nodes answer unknown hashes with a GraphQL error.
            Err(ChainError::Query(message)) => {
                tracing::debug!("Status query for {} rejected: {}", hash, message);
                Ok(TransactionStatus::Unknown)
            }
            Err(e) => Err(e),
        }
    }
}

fn parse_status(value: &str) -> TransactionStatus {
    match value.to_ascii_uppercase().as_str() {
        "INCLUDED" => TransactionStatus::Included,
        "PENDING" => TransactionStatus::Pending,
        _ => TransactionStatus::Unknown,
    }
}

#[async_trait]
impl LedgerClient for GraphQlLedger {
    async fn transaction(&self, hash: &TransactionHash) -> Result<TransactionRecord, ChainError> {
        let status = match self.find_in_best_chain(hash).await? {
            Some(status) => status,
            None => self.pool_status(hash).await?,
        };
        Ok(TransactionRecord {
            hash: hash.clone(),
            status,
        })
    }

    async fn account(&self, public_key: &PublicKey) -> Result<AccountDetails, ChainError> {
        let data: AccountData = self
            .query(ACCOUNT_QUERY, json!({ "publicKey": public_key.as_str() }))
            .await?;

        let node = data
            .account
            .ok_or_else(|| ChainError::AccountNotFound(public_key.clone()))?;

        Ok(AccountDetails {
            public_key: PublicKey::new(node.public_key),
            verification_key: node.verification_key.map(|vk| VerificationKey {
                hash: vk.hash,
                data: vk.verification_key,
            }),
            balance: node.balance.map(|b| b.total),
        })
    }
}
