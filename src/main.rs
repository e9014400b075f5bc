// ABOUTME: Entry point for the zkapp-harness CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use commands::RunOptions;
use std::env;
use tracing_subscriber::EnvFilter;
use zkapp_harness::config::{self, Config};
use zkapp_harness::error::Result;
use zkapp_harness::output::{Output, OutputMode};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let cwd = env::current_dir()?;

    match cli.command {
        Commands::Init { force } => {
            config::init_config(&cwd, force)?;
            println!("Created {}", config::CONFIG_FILENAME);
            Ok(())
        }
        Commands::Run {
            ui,
            interactive,
            non_interactive,
            cancel,
            quiet,
            json,
        } => {
            let config = Config::discover(&cwd)?;
            let mode = if json {
                OutputMode::Json
            } else if quiet {
                OutputMode::Quiet
            } else {
                OutputMode::Normal
            };
            let options = RunOptions {
                ui,
                interactive,
                non_interactive,
                cancel,
            };
            commands::run(config, options, Output::new(mode)).await
        }
        Commands::Accounts => {
            let config = Config::discover(&cwd)?;
            commands::accounts(&config)
        }
    }
}
