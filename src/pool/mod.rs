// ABOUTME: Bounded pool of fee payer accounts shared by concurrent deployments.
// ABOUTME: Acquire suspends until an account is free; release is idempotent.

mod error;
mod inventory;
mod lease;

pub use error::{InventoryError, PoolError};
pub use inventory::{Account, AccountInventory};
pub use lease::{AccountLease, LeaseInfo};

use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::types::PublicKey;

/// Default bound on how long `acquire` waits for a free account.
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(300);

/// Handle to the shared pool. Clones refer to the same accounts.
///
/// At most one lease exists per account. The semaphore counts free accounts
/// and hands permits out in FIFO order, so each release is observed by
/// exactly one waiting `acquire`.
#[derive(Clone)]
pub struct AccountPool {
    inner: Arc<PoolInner>,
}

struct PoolInner {
    accounts: Vec<Account>,
    state: Mutex<PoolState>,
    available: Semaphore,
    acquire_timeout: Duration,
}

struct PoolState {
    free: VecDeque<usize>,
    leases: HashMap<usize, LeaseInfo>,
}

impl std::fmt::Debug for AccountPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountPool")
            .field("size", &self.size())
            .field("leased", &self.leased_count())
            .finish()
    }
}

impl AccountPool {
    pub fn new(inventory: AccountInventory) -> Self {
        Self::with_acquire_timeout(inventory, DEFAULT_ACQUIRE_TIMEOUT)
    }

    pub fn with_acquire_timeout(inventory: AccountInventory, acquire_timeout: Duration) -> Self {
        let accounts = inventory.into_vec();
        let size = accounts.len();
        Self {
            inner: Arc::new(PoolInner {
                accounts,
                state: Mutex::new(PoolState {
                    free: (0..size).collect(),
                    leases: HashMap::new(),
                }),
                available: Semaphore::new(size),
                acquire_timeout,
            }),
        }
    }

    /// Lease a free account, waiting up to the acquire timeout for one.
    pub async fn acquire(&self) -> Result<AccountLease, PoolError> {
        let waited = self.inner.acquire_timeout;
        let permit =
            match tokio::time::timeout(waited, self.inner.available.acquire()).await {
                Ok(Ok(permit)) => permit,
                Ok(Err(_)) => return Err(PoolError::Closed),
                Err(_) => {
                    tracing::warn!(
                        "No fee payer account free after {}s ({} leased)",
                        waited.as_secs(),
                        self.leased_count()
                    );
                    return Err(PoolError::Exhausted {
                        size: self.size(),
                        waited,
                    });
                }
            };

        let mut state = self.inner.state.lock();
        // A permit exists only while a free index is queued.
        let Some(index) = state.free.pop_front() else {
            return Err(PoolError::Closed);
        };
        permit.forget();

        let info = LeaseInfo::new();
        state.leases.insert(index, info.clone());
        drop(state);

        let account = self.inner.accounts[index].clone();
        tracing::debug!(
            "Leased fee payer {} (token {})",
            account.public_key(),
            info.token
        );

        Ok(AccountLease {
            pool: self.clone(),
            index,
            account,
            info,
            released: false,
        })
    }

    /// Return an account to the pool.
    ///
    /// Releasing a free or unknown account is a no-op, so cleanup paths can
    /// call this unconditionally.
    pub fn release(&self, account: &Account) {
        match self.index_of(account.public_key()) {
            Some(index) => {
                self.release_index(index, None);
            }
            None => {
                tracing::debug!("Ignoring release of unknown account {}", account.public_key());
            }
        }
    }

    /// Release on behalf of a lease guard; only the matching token frees the account.
    pub(crate) fn release_lease(&self, index: usize, token: Uuid) {
        self.release_index(index, Some(token));
    }

    fn release_index(&self, index: usize, token: Option<Uuid>) -> bool {
        let mut state = self.inner.state.lock();

        let matches = match (state.leases.get(&index), token) {
            (Some(info), Some(token)) => info.token == token,
            (Some(_), None) => true,
            (None, _) => false,
        };
        if !matches {
            tracing::debug!("Account #{} not leased by caller, release ignored", index);
            return false;
        }

        state.leases.remove(&index);
        state.free.push_back(index);
        self.inner.available.add_permits(1);
        drop(state);

        tracing::debug!("Released fee payer {}", self.inner.accounts[index].public_key());
        true
    }

    fn index_of(&self, public_key: &PublicKey) -> Option<usize> {
        self.inner
            .accounts
            .iter()
            .position(|a| a.public_key() == public_key)
    }

    pub fn size(&self) -> usize {
        self.inner.accounts.len()
    }

    pub fn free_count(&self) -> usize {
        self.inner.state.lock().free.len()
    }

    pub fn leased_count(&self) -> usize {
        self.inner.state.lock().leases.len()
    }

    pub fn is_leased(&self, public_key: &PublicKey) -> bool {
        self.index_of(public_key)
            .is_some_and(|index| self.inner.state.lock().leases.contains_key(&index))
    }

    /// Usage token of the current lease on an account, if any.
    pub fn lease_info(&self, public_key: &PublicKey) -> Option<LeaseInfo> {
        let index = self.index_of(public_key)?;
        self.inner.state.lock().leases.get(&index).cloned()
    }

    pub fn acquire_timeout(&self) -> Duration {
        self.inner.acquire_timeout
    }

    pub fn accounts(&self) -> &[Account] {
        &self.inner.accounts
    }
}
