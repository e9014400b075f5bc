// ABOUTME: Command module aggregator for the harness CLI.
// ABOUTME: Re-exports run and accounts command handlers.

mod accounts;
mod run;

pub use accounts::accounts;
pub use run::{RunOptions, run};
