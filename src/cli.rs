// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use zkapp_harness::types::UiVariant;

#[derive(Parser)]
#[command(name = "zkapp-harness")]
#[command(about = "End-to-end project generation and deployment checks for the zkApp CLI")]
#[command(version)]
pub struct Cli {
    /// Show debug logs, including child process output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new harness.yml configuration file
    Init {
        /// Overwrite an existing harness.yml
        #[arg(long)]
        force: bool,
    },

    /// Generate, configure and deploy projects for each UI variant
    Run {
        /// UI variants to cover (default: ui_variants from config)
        #[arg(long = "ui", value_name = "VARIANT")]
        ui: Vec<UiVariant>,

        /// Only drive the interactive prompts
        #[arg(long, conflicts_with = "non_interactive")]
        interactive: bool,

        /// Only pass flags, no prompts
        #[arg(long)]
        non_interactive: bool,

        /// Decline the deploy confirmation in interactive attempts
        #[arg(long, conflicts_with = "non_interactive")]
        cancel: bool,

        /// Minimal output for CI
        #[arg(short, long, conflicts_with = "json")]
        quiet: bool,

        /// JSON lines output
        #[arg(long)]
        json: bool,
    },

    /// Show the fee payer inventory and ledger endpoint
    Accounts,
}
