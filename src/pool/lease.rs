// ABOUTME: Lease on a pooled account that releases on drop.
// ABOUTME: Lease info records who holds the account and since when.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{Account, AccountPool};

/// Usage token tying a leased account to the run that holds it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaseInfo {
    /// Unique per acquisition; a stale guard can't release someone else's lease.
    pub token: Uuid,
    /// Hostname of the machine running the harness.
    pub holder: String,
    /// Process ID of the harness.
    pub pid: u32,
    /// When the lease was taken.
    pub acquired_at: DateTime<Utc>,
}

impl LeaseInfo {
    pub fn new() -> Self {
        Self {
            token: Uuid::new_v4(),
            holder: gethostname::gethostname().to_string_lossy().into_owned(),
            pid: std::process::id(),
            acquired_at: Utc::now(),
        }
    }

    pub fn age(&self) -> chrono::Duration {
        Utc::now() - self.acquired_at
    }
}

impl Default for LeaseInfo {
    fn default() -> Self {
        Self::new()
    }
}

/// A held account. Returned to the pool on drop.
pub struct AccountLease {
    pub(super) pool: AccountPool,
    pub(super) index: usize,
    pub(super) account: Account,
    pub(super) info: LeaseInfo,
    pub(super) released: bool,
}

impl std::fmt::Debug for AccountLease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountLease")
            .field("account", self.account.public_key())
            .field("token", &self.info.token)
            .finish()
    }
}

impl AccountLease {
    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn info(&self) -> &LeaseInfo {
        &self.info
    }

    /// Return the account to the pool now.
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if !self.released {
            self.released = true;
            self.pool.release_lease(self.index, self.info.token);
        }
    }
}

impl Drop for AccountLease {
    fn drop(&mut self) {
        self.release_inner();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lease_info_records_current_process() {
        let info = LeaseInfo::new();
        assert_eq!(info.pid, std::process::id());
        assert!(!info.holder.is_empty());
        assert!(info.age().num_seconds() < 5);
    }

    #[test]
    fn tokens_are_unique() {
        assert_ne!(LeaseInfo::new().token, LeaseInfo::new().token);
    }

    #[test]
    fn serializes_token_as_hyphenated_string() {
        let info = LeaseInfo::new();
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["token"], info.token.to_string());
        assert_eq!(json["pid"], std::process::id());
    }
}
