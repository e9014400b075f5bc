// ABOUTME: Error types for the fee payer account pool.
// ABOUTME: Covers inventory loading and bounded acquisition.

use std::path::PathBuf;
use std::time::Duration;

use crate::types::PublicKey;

#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    /// No account became free within the acquire timeout.
    #[error("no fee payer account became free within {}s (pool size {size})", .waited.as_secs())]
    Exhausted { size: usize, waited: Duration },

    /// The pool was closed while waiting.
    #[error("account pool is closed")]
    Closed,

    #[error("invalid account inventory {path}: {source}")]
    Inventory {
        path: PathBuf,
        #[source]
        source: InventoryError,
    },

    #[error("failed to read account inventory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why an account inventory was rejected.
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("at least one account is required")]
    Empty,

    #[error("duplicate account {0}")]
    Duplicate(PublicKey),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}
