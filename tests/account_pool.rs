// ABOUTME: Integration tests for the fee payer account pool.
// ABOUTME: Exercises exclusive leasing under contention, waiting and release paths.

mod support;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use zkapp_harness::pool::*;

#[tokio::test]
async fn concurrent_leases_never_share_an_account() {
    support::init_tracing();
    let pool = support::pool(3, Duration::from_secs(10));
    let held: Arc<Mutex<HashSet<String>>> = Arc::new(Mutex::new(HashSet::new()));
    let max_held = Arc::new(Mutex::new(0usize));

    let tasks: Vec<_> = (0..12)
        .map(|_| {
            let pool = pool.clone();
            let held = held.clone();
            let max_held = max_held.clone();
            tokio::spawn(async move {
                let lease = pool.acquire().await.unwrap();
                let key = lease.account().public_key().to_string();
                {
                    let mut held = held.lock();
                    assert!(held.insert(key.clone()), "{} leased twice", key);
                    let mut max = max_held.lock();
                    *max = (*max).max(held.len());
                }
                tokio::time::sleep(Duration::from_millis(20)).await;
                held.lock().remove(&key);
                drop(lease);
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap();
    }

    assert!(*max_held.lock() <= 3);
    assert_eq!(pool.free_count(), 3);
    assert_eq!(pool.leased_count(), 0);
}

#[tokio::test]
async fn second_acquire_waits_for_release() {
    let pool = support::pool(1, Duration::from_secs(10));
    let first = pool.acquire().await.unwrap();

    let waiter = {
        let pool = pool.clone();
        tokio::spawn(async move { pool.acquire().await })
    };

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(!waiter.is_finished(), "acquire should block while the only account is leased");

    let key = first.account().public_key().clone();
    first.release();

    let second = waiter.await.unwrap().unwrap();
    assert_eq!(second.account().public_key(), &key);
    assert!(pool.is_leased(&key));
}

#[tokio::test]
async fn acquire_times_out_when_pool_stays_exhausted() {
    let pool = support::pool(1, Duration::from_millis(100));
    let _held = pool.acquire().await.unwrap();

    match pool.acquire().await {
        Err(PoolError::Exhausted { size, waited }) => {
            assert_eq!(size, 1);
            assert_eq!(waited, Duration::from_millis(100));
        }
        other => panic!("expected Exhausted, got {:?}", other),
    }
}

#[tokio::test]
async fn dropping_a_lease_frees_the_account() {
    let pool = support::pool(2, Duration::from_secs(1));
    {
        let _a = pool.acquire().await.unwrap();
        let _b = pool.acquire().await.unwrap();
        assert_eq!(pool.free_count(), 0);
    }
    assert_eq!(pool.free_count(), 2);
}

#[tokio::test]
async fn double_release_is_harmless() {
    let pool = support::pool(2, Duration::from_secs(1));
    let lease = pool.acquire().await.unwrap();
    let account = lease.account().clone();

    pool.release(&account);
    pool.release(&account);
    drop(lease);

    assert_eq!(pool.free_count(), 2);
    assert_eq!(pool.leased_count(), 0);

    // The pool still hands out each account once.
    let a = pool.acquire().await.unwrap();
    let b = pool.acquire().await.unwrap();
    assert_ne!(a.account().public_key(), b.account().public_key());
}

#[tokio::test]
async fn releasing_an_unknown_account_is_ignored() {
    let pool = support::pool(1, Duration::from_secs(1));
    let stranger = Account::new(zkapp_harness::types::KeyPair::new("B62qstranger", "EKEx"));
    pool.release(&stranger);
    assert_eq!(pool.free_count(), 1);
}

#[tokio::test]
async fn lease_info_identifies_the_holder() {
    let pool = support::pool(1, Duration::from_secs(1));
    let lease = pool.acquire().await.unwrap();
    let info = pool.lease_info(lease.account().public_key()).unwrap();

    assert_eq!(&info, lease.info());
    assert_eq!(info.pid, std::process::id());
}

#[test]
fn inventory_loads_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = support::write_inventory(dir.path(), 3);

    let inventory = AccountInventory::load(&path).unwrap();
    assert_eq!(inventory.len(), 3);
    assert_eq!(AccountPool::new(inventory).size(), 3);
}

#[test]
fn missing_inventory_is_an_io_error() {
    let result = AccountInventory::load(std::path::Path::new("/nonexistent/accounts.json"));
    assert!(matches!(result, Err(PoolError::Io { .. })));
}

#[test]
fn malformed_inventory_names_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("accounts.json");
    std::fs::write(&path, "{not json").unwrap();

    let err = AccountInventory::load(&path).unwrap_err();
    assert!(matches!(
        err,
        PoolError::Inventory { source: InventoryError::Json(_), .. }
    ));
    assert!(err.to_string().contains("accounts.json"));
}

#[test]
fn empty_inventory_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("accounts.json");
    std::fs::write(&path, "[]").unwrap();

    let err = AccountInventory::load(&path).unwrap_err();
    assert!(matches!(
        err,
        PoolError::Inventory { source: InventoryError::Empty, .. }
    ));
}
