// ABOUTME: Library root for zkapp-harness - exposes the orchestration engine for tests.
// ABOUTME: The main binary is in main.rs.

pub mod chain;
pub mod config;
pub mod deploy;
pub mod diagnostics;
pub mod error;
pub mod keys;
pub mod output;
pub mod pool;
pub mod process;
pub mod project;
pub mod types;
