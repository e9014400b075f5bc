// ABOUTME: Project generation collaborator used by the deployment workflow.
// ABOUTME: The trait hides how a zkApp project directory comes to exist.

mod cli;
mod error;

pub use cli::{CliProjectGenerator, NEXT_STEPS_MARKER, SUCCESS_MARKER, UI_PROMPT};
pub use error::GenerationError;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::process::ProcessDriver;
use crate::types::UiVariant;

/// What to generate and where.
#[derive(Debug, Clone)]
pub struct ProjectRequest {
    pub name: String,
    pub ui: UiVariant,
    /// Drive the generator's prompts instead of passing flags.
    pub interactive: bool,
    /// Directory the project is created in.
    pub parent_dir: PathBuf,
}

impl ProjectRequest {
    pub fn root(&self) -> PathBuf {
        self.parent_dir.join(&self.name)
    }
}

/// A project directory ready for configuration.
#[derive(Debug, Clone)]
pub struct GeneratedProject {
    pub name: String,
    pub root: PathBuf,
    pub ui: UiVariant,
    pub exit_code: i32,
    pub stdout: String,
}

impl GeneratedProject {
    /// Where `config.json` and `keys/` live and where deploy runs.
    pub fn contracts_dir(&self) -> PathBuf {
        contracts_dir(&self.root, self.ui)
    }

    pub fn ui_dir(&self) -> Option<PathBuf> {
        self.ui.has_ui_project().then(|| self.root.join("ui"))
    }

    /// Check the directory tree matches the UI variant.
    pub fn verify_layout(&self) -> Result<(), GenerationError> {
        let package = self.contracts_dir().join("package.json");
        if !package.is_file() {
            return Err(GenerationError::Layout {
                path: package,
                message: "is missing".to_string(),
            });
        }

        if let Some(ui) = self.ui_dir() {
            if !ui.is_dir() {
                return Err(GenerationError::Layout {
                    path: ui,
                    message: format!("is missing for the {} UI", self.ui),
                });
            }
        } else if self.root.join("ui").exists() {
            return Err(GenerationError::Layout {
                path: self.root.join("ui"),
                message: "exists although no UI was requested".to_string(),
            });
        }

        Ok(())
    }
}

pub(crate) fn contracts_dir(root: &Path, ui: UiVariant) -> PathBuf {
    if ui.has_ui_project() {
        root.join("contracts")
    } else {
        root.to_path_buf()
    }
}

/// Creates zkApp project directories.
#[async_trait]
pub trait ProjectGenerator: Send + Sync {
    async fn generate(
        &self,
        request: &ProjectRequest,
        driver: &ProcessDriver,
    ) -> Result<GeneratedProject, GenerationError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project(root: &Path, ui: UiVariant) -> GeneratedProject {
        GeneratedProject {
            name: "demo".into(),
            root: root.to_path_buf(),
            ui,
            exit_code: 0,
            stdout: String::new(),
        }
    }

    #[test]
    fn contracts_live_in_subdir_with_ui() {
        let root = Path::new("/tmp/demo");
        assert_eq!(contracts_dir(root, UiVariant::Next), root.join("contracts"));
        assert_eq!(contracts_dir(root, UiVariant::None), root);
    }

    #[test]
    fn layout_requires_ui_dir_for_ui_variants() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("contracts")).unwrap();
        std::fs::write(dir.path().join("contracts/package.json"), "{}").unwrap();

        let err = project(dir.path(), UiVariant::Svelte)
            .verify_layout()
            .unwrap_err();
        assert!(err.to_string().contains("svelte UI"));

        std::fs::create_dir(dir.path().join("ui")).unwrap();
        project(dir.path(), UiVariant::Svelte).verify_layout().unwrap();
    }

    #[test]
    fn bare_project_must_not_have_ui() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("package.json"), "{}").unwrap();
        project(dir.path(), UiVariant::None).verify_layout().unwrap();

        std::fs::create_dir(dir.path().join("ui")).unwrap();
        assert!(project(dir.path(), UiVariant::None).verify_layout().is_err());
    }
}
