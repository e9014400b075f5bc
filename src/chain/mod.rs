// ABOUTME: Chain poller and ledger clients for confirming deployments.
// ABOUTME: GraphQL over HTTP for live endpoints, synthetic answers when mocked.

mod endpoint;
mod error;
mod graphql;
mod ledger;
mod mocked;
mod poller;

pub use endpoint::{DEFAULT_MOCKED_URL, Endpoint};
pub use error::ChainError;
pub use graphql::GraphQlLedger;
pub use ledger::{AccountDetails, LedgerClient, TransactionRecord, TransactionStatus, VerificationKey};
pub use mocked::{MOCKED_VERIFICATION_KEY_HASH, MockedLedger};
pub use poller::{ChainPoller, Inclusion};
