// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Uses phantom types to prevent ID confusion at compile time.

mod alias_name;
mod id;
mod key_pair;
mod ui_variant;

pub use alias_name::{AliasName, AliasNameError};
pub use id::{Id, PublicKey, TransactionHash};
pub use key_pair::{KeyPair, PrivateKey};
pub use ui_variant::{UiVariant, UnknownUiVariant};
