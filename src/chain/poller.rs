// ABOUTME: Polls a ledger until a transaction settles or the wait runs out.
// ABOUTME: Also performs the one-shot account lookup used after inclusion.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use super::{AccountDetails, ChainError, Endpoint, GraphQlLedger, LedgerClient, MockedLedger, TransactionStatus};
use crate::types::{PublicKey, TransactionHash};

/// A transaction observed as included.
#[derive(Debug, Clone, Serialize)]
pub struct Inclusion {
    pub hash: TransactionHash,
    /// Number of ledger queries made, at least one.
    pub polls: u32,
    #[serde(with = "humantime_serde")]
    pub elapsed: Duration,
    /// Resolved by the mocked ledger without a network call.
    pub synthetic: bool,
}

/// Waits for transactions to settle on a ledger.
#[derive(Clone)]
pub struct ChainPoller {
    ledger: Arc<dyn LedgerClient>,
}

impl std::fmt::Debug for ChainPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainPoller")
            .field("mocked", &self.is_mocked())
            .finish()
    }
}

impl ChainPoller {
    pub fn new(ledger: Arc<dyn LedgerClient>) -> Self {
        Self { ledger }
    }

    /// Pick the ledger implementation the endpoint calls for.
    pub fn for_endpoint(endpoint: &Endpoint) -> Result<Self, ChainError> {
        let ledger: Arc<dyn LedgerClient> = match endpoint {
            Endpoint::Live(url) => Arc::new(GraphQlLedger::new(url.clone())?),
            Endpoint::Mocked(_) => Arc::new(MockedLedger::new()),
        };
        Ok(Self::new(ledger))
    }

    pub fn mocked() -> Self {
        Self::new(Arc::new(MockedLedger::new()))
    }

    pub fn is_mocked(&self) -> bool {
        self.ledger.is_mocked()
    }

    /// Poll every `interval` until the transaction is included or failed.
    ///
    /// The first query is made immediately. Transport errors on a single
    /// poll are logged and retried on the next tick; only `max_wait` ends
    /// the wait without a verdict.
    pub async fn wait_for_inclusion(
        &self,
        hash: &TransactionHash,
        interval: Duration,
        max_wait: Duration,
    ) -> Result<Inclusion, ChainError> {
        let started = Instant::now();
        let mut polls = 0u32;

        let outcome = tokio::time::timeout(max_wait, self.poll(hash, interval, &mut polls)).await;

        match outcome {
            Ok(Ok(())) => {
                let inclusion = Inclusion {
                    hash: hash.clone(),
                    polls,
                    elapsed: started.elapsed(),
                    synthetic: self.is_mocked(),
                };
                tracing::info!(
                    "Transaction {} included after {} poll(s) in {:?}",
                    hash,
                    polls,
                    inclusion.elapsed
                );
                Ok(inclusion)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => {
                tracing::warn!("Gave up waiting for {} after {} poll(s)", hash, polls);
                Err(ChainError::Timeout {
                    hash: hash.clone(),
                    waited: max_wait,
                    polls,
                })
            }
        }
    }

    async fn poll(
        &self,
        hash: &TransactionHash,
        interval: Duration,
        polls: &mut u32,
    ) -> Result<(), ChainError> {
        loop {
            *polls += 1;
            match self.ledger.transaction(hash).await {
                Ok(record) => match record.status {
                    TransactionStatus::Included => return Ok(()),
                    TransactionStatus::Failed { reason } => {
                        return Err(ChainError::InclusionFailure {
                            hash: hash.clone(),
                            reason,
                        });
                    }
                    status => {
                        tracing::debug!("Poll #{} for {}: {:?}", polls, hash, status);
                    }
                },
                Err(e) => {
                    tracing::warn!("Poll #{} for {} failed, retrying: {}", polls, hash, e);
                }
            }
            tokio::time::sleep(interval).await;
        }
    }

    /// Single lookup of an account; fails fast when it does not exist.
    pub async fn fetch_account(&self, public_key: &PublicKey) -> Result<AccountDetails, ChainError> {
        self.ledger.account(public_key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::TransactionRecord;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    /// Ledger that replays a fixed sequence of answers, then repeats the last.
    struct ScriptedLedger {
        answers: Mutex<VecDeque<Result<TransactionStatus, String>>>,
    }

    impl ScriptedLedger {
        fn new(answers: Vec<Result<TransactionStatus, String>>) -> Arc<Self> {
            Arc::new(Self {
                answers: Mutex::new(answers.into()),
            })
        }
    }

    #[async_trait]
    impl LedgerClient for ScriptedLedger {
        async fn transaction(&self, hash: &TransactionHash) -> Result<TransactionRecord, ChainError> {
            let mut answers = self.answers.lock();
            let answer = if answers.len() > 1 {
                answers.pop_front()
            } else {
                answers.front().cloned()
            };
            match answer {
                Some(Ok(status)) => Ok(TransactionRecord {
                    hash: hash.clone(),
                    status,
                }),
                Some(Err(message)) => Err(ChainError::Query(message)),
                None => Ok(TransactionRecord {
                    hash: hash.clone(),
                    status: TransactionStatus::Unknown,
                }),
            }
        }

        async fn account(&self, public_key: &PublicKey) -> Result<AccountDetails, ChainError> {
            Err(ChainError::AccountNotFound(public_key.clone()))
        }
    }

    fn hash() -> TransactionHash {
        TransactionHash::new("5JuTestHash")
    }

    #[tokio::test]
    async fn stops_on_inclusion_and_counts_polls() {
        let ledger = ScriptedLedger::new(vec![
            Ok(TransactionStatus::Unknown),
            Ok(TransactionStatus::Pending),
            Ok(TransactionStatus::Included),
        ]);
        let poller = ChainPoller::new(ledger);

        let inclusion = poller
            .wait_for_inclusion(&hash(), Duration::from_millis(5), Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(inclusion.polls, 3);
        assert!(!inclusion.synthetic);
    }

    #[tokio::test]
    async fn transport_errors_do_not_abort_the_wait() {
        let ledger = ScriptedLedger::new(vec![
            Err("connection refused".into()),
            Err("connection refused".into()),
            Ok(TransactionStatus::Included),
        ]);
        let poller = ChainPoller::new(ledger);

        let inclusion = poller
            .wait_for_inclusion(&hash(), Duration::from_millis(5), Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(inclusion.polls, 3);
    }

    #[tokio::test]
    async fn failure_reason_is_reported() {
        let ledger = ScriptedLedger::new(vec![Ok(TransactionStatus::Failed {
            reason: "Account_nonce_precondition_unsatisfied".into(),
        })]);
        let poller = ChainPoller::new(ledger);

        let err = poller
            .wait_for_inclusion(&hash(), Duration::from_millis(5), Duration::from_secs(5))
            .await
            .unwrap_err();

        match err {
            ChainError::InclusionFailure { reason, .. } => {
                assert_eq!(reason, "Account_nonce_precondition_unsatisfied")
            }
            other => panic!("expected InclusionFailure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn wait_is_bounded() {
        let ledger = ScriptedLedger::new(vec![Ok(TransactionStatus::Pending)]);
        let poller = ChainPoller::new(ledger);

        let err = poller
            .wait_for_inclusion(&hash(), Duration::from_millis(10), Duration::from_millis(100))
            .await
            .unwrap_err();

        match err {
            ChainError::Timeout { polls, waited, .. } => {
                assert!(polls >= 2);
                assert_eq!(waited, Duration::from_millis(100));
            }
            other => panic!("expected Timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn mocked_resolves_on_first_poll() {
        let poller = ChainPoller::mocked();
        assert!(poller.is_mocked());

        let inclusion = poller
            .wait_for_inclusion(&hash(), Duration::from_secs(30), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(inclusion.polls, 1);
        assert!(inclusion.synthetic);
    }

    #[tokio::test]
    async fn mocked_endpoint_selects_mocked_ledger() {
        let poller = ChainPoller::for_endpoint(&Endpoint::mocked()).unwrap();
        assert!(poller.is_mocked());

        let details = poller.fetch_account(&PublicKey::new("B62qzk")).await.unwrap();
        assert!(details.has_verification_key());
    }
}
