// ABOUTME: Error types for ledger queries and inclusion polling.
// ABOUTME: Transport failures are wrapped; on-chain failures carry the reason.

use std::time::Duration;

use crate::types::{PublicKey, TransactionHash};

#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// The transaction did not settle within the poll budget.
    #[error("transaction {hash} not settled after {}s ({polls} polls)", .waited.as_secs())]
    Timeout {
        hash: TransactionHash,
        waited: Duration,
        polls: u32,
    },

    /// The transaction was observed on-chain but failed.
    #[error("transaction {hash} failed on-chain: {reason}")]
    InclusionFailure {
        hash: TransactionHash,
        reason: String,
    },

    #[error("account {0} does not exist on the ledger")]
    AccountNotFound(PublicKey),

    #[error("ledger request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with GraphQL errors or an unexpected shape.
    #[error("ledger query failed: {0}")]
    Query(String),

    #[error("invalid ledger endpoint '{value}': {message}")]
    InvalidEndpoint { value: String, message: String },
}
