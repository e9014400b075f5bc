// ABOUTME: Project generator backed by the zkApp CLI's `project` command.
// ABOUTME: Selects the UI variant with flags or by driving the interactive menu.

use async_trait::async_trait;
use std::time::Duration;

use super::{GeneratedProject, GenerationError, ProjectGenerator, ProjectRequest};
use crate::process::{Dialog, Invocation, Key, ProcessDriver, Token};

/// Menu prompt asking for the UI variant.
pub const UI_PROMPT: &str = "Create an accompanying UI project too?";
pub const SUCCESS_MARKER: &str = "Success!";
pub const NEXT_STEPS_MARKER: &str = "Next steps:";

/// Runs `<executable> project <name>`.
#[derive(Debug, Clone)]
pub struct CliProjectGenerator {
    executable: String,
    timeout: Duration,
}

impl CliProjectGenerator {
    pub fn new(executable: impl Into<String>, timeout: Duration) -> Self {
        Self {
            executable: executable.into(),
            timeout,
        }
    }

    fn invocation(&self, request: &ProjectRequest) -> Invocation {
        let invocation = Invocation::new(&self.executable, &request.parent_dir)
            .arg("project")
            .arg(&request.name)
            .timeout(self.timeout);

        if !request.interactive {
            return invocation.arg("--ui").arg(request.ui.as_str());
        }

        let mut select = vec![Token::Key(Key::ArrowDown); request.ui.menu_index()];
        select.push(Token::submit());

        let dialog = request
            .ui
            .follow_up_prompts()
            .iter()
            .fold(Dialog::new().expect(UI_PROMPT, select), |dialog, prompt| {
                dialog.expect(*prompt, vec![Token::submit()])
            });

        invocation.dialog(dialog).require_dialog()
    }
}

#[async_trait]
impl ProjectGenerator for CliProjectGenerator {
    async fn generate(
        &self,
        request: &ProjectRequest,
        driver: &ProcessDriver,
    ) -> Result<GeneratedProject, GenerationError> {
        std::fs::create_dir_all(&request.parent_dir).map_err(|source| GenerationError::Io {
            path: request.parent_dir.clone(),
            source,
        })?;

        tracing::info!(
            "Generating project {} (ui: {}, interactive: {})",
            request.name,
            request.ui,
            request.interactive
        );

        let transcript = driver.run(self.invocation(request)).await?;
        transcript.check_timeout()?;
        transcript.check_dialog()?;

        if !transcript.success() {
            return Err(GenerationError::Failed {
                exit: transcript.exit(),
                tail: transcript.tail(20),
            });
        }
        for marker in [SUCCESS_MARKER, NEXT_STEPS_MARKER] {
            if !transcript.contains(marker) {
                return Err(GenerationError::MissingMarker { marker });
            }
        }

        let project = GeneratedProject {
            name: request.name.clone(),
            root: request.root(),
            ui: request.ui,
            exit_code: transcript.exit_code().unwrap_or_default(),
            stdout: transcript.stdout(),
        };
        project.verify_layout()?;
        Ok(project)
    }
}
