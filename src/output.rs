// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (CI), and JSON lines output modes.

use serde::Serialize;
use std::time::Instant;

use crate::deploy::{DeployError, DeployRequest, DeploymentReport};

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output for CI (only final results)
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn duration(&self) -> Option<f64> {
        self.start_time.map(|_| self.elapsed_secs())
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Report a finished attempt.
    pub fn report(&self, report: &DeploymentReport) {
        match self.mode {
            OutputMode::Normal => {
                println!(
                    "  ✓ {} {} ({:.1}s)",
                    report.request,
                    report.outcome,
                    report.elapsed.as_secs_f64()
                );
                if let Some(tx) = &report.transaction {
                    let note = if report.synthetic { " (mocked ledger)" } else { "" };
                    println!("    transaction {}{}", tx, note);
                }
                for warning in &report.warnings {
                    println!("    warning: {}", warning);
                }
            }
            OutputMode::Quiet => {
                println!("ok {} {}", report.request, report.outcome);
            }
            OutputMode::Json => print_json(&JsonEvent {
                event: "attempt",
                message: &report.outcome.to_string(),
                duration_secs: Some(report.elapsed.as_secs_f64()),
                report: Some(report),
                stage: None,
                request: Some(report.request),
            }),
        }
    }

    /// Report a failed attempt.
    pub fn attempt_failed(&self, request: &DeployRequest, error: &DeployError) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                eprintln!("  ✗ {}: {}", request, error);
            }
            OutputMode::Json => print_json(&JsonEvent {
                event: "attempt_failed",
                message: error.message(),
                duration_secs: None,
                report: None,
                stage: Some(error.stage().to_string()),
                request: Some(*request),
            }),
        }
    }

    /// Print a success message with optional timing.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => {
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    println!("{message} ({:.1}s)", elapsed);
                } else {
                    println!("{message}");
                }
            }
            OutputMode::Quiet => {
                println!("{message}");
            }
            OutputMode::Json => print_json(&JsonEvent {
                event: "success",
                message,
                duration_secs: self.duration(),
                report: None,
                stage: None,
                request: None,
            }),
        }
    }
}

fn print_json(event: &JsonEvent<'_>) {
    if let Ok(json) = serde_json::to_string(event) {
        println!("{json}");
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    request: Option<DeployRequest>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<&'a DeploymentReport>,
}
