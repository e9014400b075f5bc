// ABOUTME: Markers and parsing rules for the deploy command's output.
// ABOUTME: The transaction hash is the fixed-length tail of the last output line.

use crate::types::TransactionHash;

/// Printed once the deploy transaction has been sent.
pub const SUCCESS_MARKER: &str = "Success! Deploy transaction sent.";
/// Printed after a successful deploy, ahead of the explorer link.
pub const NEXT_STEP_HINT: &str = "Next step:";
/// Printed when the confirmation prompt is declined.
pub const ABORT_MARKER: &str = "Aborted. Transaction not sent.";
/// Interactive confirmation asked before sending.
pub const CONFIRM_PROMPT: &str = "Are you sure you want to send (yes/no)?";

/// Length of a transaction hash at the end of the explorer link.
///
/// The deploy command ends its output with a link whose last path segment
/// is the hash. Any change to that message format breaks this contract.
pub const TX_HASH_LEN: usize = 52;

/// Take the trailing `TX_HASH_LEN` characters of `line` as a transaction hash.
///
/// Returns `None` when the line is too short or its tail is not an
/// alphanumeric hash.
pub fn extract_transaction_hash(line: &str) -> Option<TransactionHash> {
    let line = line.trim_end();
    let count = line.chars().count();
    if count < TX_HASH_LEN {
        return None;
    }

    let tail: String = line.chars().skip(count - TX_HASH_LEN).collect();
    tail.chars()
        .all(|c| c.is_ascii_alphanumeric())
        .then(|| TransactionHash::new(tail))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "5JuSGvgJ4Nrk5gCmqPhnbnVLwTNvoZeTkMpfNJwdUHJKSgpCEDyY";

    #[test]
    fn hash_constant_has_contract_length() {
        assert_eq!(HASH.len(), TX_HASH_LEN);
    }

    #[test]
    fn takes_tail_of_explorer_link() {
        let line = format!("https://minascan.io/devnet/tx/{}?type=zk-tx", HASH);
        // Query strings break the contract; the tail is no longer the hash.
        assert!(extract_transaction_hash(&line).is_none());

        let line = format!("https://minascan.io/devnet/tx/{}", HASH);
        let hash = extract_transaction_hash(&line).unwrap();
        assert_eq!(hash.as_str(), HASH);
    }

    #[test]
    fn ignores_trailing_whitespace() {
        let line = format!("  {}   ", HASH);
        assert_eq!(extract_transaction_hash(&line).unwrap().as_str(), HASH);
    }

    #[test]
    fn short_lines_have_no_hash() {
        assert!(extract_transaction_hash("Next step:").is_none());
        assert!(extract_transaction_hash("").is_none());
    }
}
