// ABOUTME: Run command implementation.
// ABOUTME: Builds the attempt matrix and runs it concurrently through one account pool.

use zkapp_harness::config::Config;
use zkapp_harness::deploy::{DeployRequest, Orchestrator};
use zkapp_harness::error::{Error, Result};
use zkapp_harness::output::Output;
use zkapp_harness::types::UiVariant;

/// Which attempts to run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub ui: Vec<UiVariant>,
    pub interactive: bool,
    pub non_interactive: bool,
    pub cancel: bool,
}

pub async fn run(config: Config, options: RunOptions, mut output: Output) -> Result<()> {
    output.start_timer();

    let orchestrator = Orchestrator::from_config(&config)?;
    let variants = if options.ui.is_empty() {
        config.ui_variants.iter().copied().collect()
    } else {
        options.ui.clone()
    };
    let requests = matrix(&variants, &options);

    let settings = &orchestrator.context().settings;
    output.progress(&format!(
        "Running {} attempt(s) with {} fee payer(s) against {}",
        requests.len(),
        orchestrator.pool().size(),
        settings.endpoint
    ));

    let results = orchestrator.run_all(requests.clone()).await;

    let total = results.len();
    let mut failed = 0;
    for (request, result) in requests.iter().zip(results) {
        match result {
            Ok(report) => output.report(&report),
            Err(e) => {
                failed += 1;
                output.attempt_failed(request, &e);
            }
        }
    }

    if failed > 0 {
        return Err(Error::AttemptsFailed { failed, total });
    }

    output.success(&format!("All {} attempt(s) passed", total));
    Ok(())
}

/// One request per variant and mode. Without a mode flag both modes run.
fn matrix(variants: &[UiVariant], options: &RunOptions) -> Vec<DeployRequest> {
    let flags = !options.interactive;
    let prompts = !options.non_interactive;

    let mut requests = Vec::new();
    for &ui in variants {
        if flags && !options.cancel {
            requests.push(DeployRequest::non_interactive(ui));
        }
        if prompts {
            requests.push(if options.cancel {
                DeployRequest::cancelling(ui)
            } else {
                DeployRequest::interactive(ui)
            });
        }
    }
    requests
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_modes_by_default() {
        let requests = matrix(&[UiVariant::Svelte, UiVariant::None], &RunOptions::default());
        assert_eq!(
            requests,
            vec![
                DeployRequest::non_interactive(UiVariant::Svelte),
                DeployRequest::interactive(UiVariant::Svelte),
                DeployRequest::non_interactive(UiVariant::None),
                DeployRequest::interactive(UiVariant::None),
            ]
        );
    }

    #[test]
    fn cancel_only_runs_interactive_attempts() {
        let options = RunOptions {
            cancel: true,
            ..Default::default()
        };
        let requests = matrix(&[UiVariant::Next], &options);
        assert_eq!(requests, vec![DeployRequest::cancelling(UiVariant::Next)]);
    }

    #[test]
    fn non_interactive_flag_limits_modes() {
        let options = RunOptions {
            non_interactive: true,
            ..Default::default()
        };
        let requests = matrix(&[UiVariant::Nuxt], &options);
        assert_eq!(requests, vec![DeployRequest::non_interactive(UiVariant::Nuxt)]);
    }
}
