// ABOUTME: Diagnostics accumulator for non-fatal warnings during a deployment attempt.
// ABOUTME: Collects cleanup problems that shouldn't fail an attempt but should be reported.

/// Collects non-fatal warnings during a deployment attempt.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning, auto-logging it via tracing.
    pub fn warn(&mut self, warning: Warning) {
        tracing::warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn into_messages(self) -> Vec<String> {
        self.warnings.into_iter().map(|w| w.message).collect()
    }
}

/// A non-fatal warning collected during an attempt.
#[derive(Debug, Clone)]
pub struct Warning {
    pub kind: WarningKind,
    pub message: String,
}

impl Warning {
    /// The fee payer key file could not be removed from the key cache.
    pub fn key_cache_purge(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::KeyCachePurge,
            message: message.into(),
        }
    }

    /// The generated project directory could not be removed.
    pub fn project_cleanup(message: impl Into<String>) -> Self {
        Self {
            kind: WarningKind::ProjectCleanup,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    KeyCachePurge,
    ProjectCleanup,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostics_starts_empty() {
        let diag = Diagnostics::default();
        assert!(!diag.has_warnings());
        assert!(diag.warnings().is_empty());
    }

    #[test]
    fn diagnostics_collects_warnings_in_order() {
        let mut diag = Diagnostics::default();

        diag.warn(Warning::key_cache_purge("permission denied"));
        diag.warn(Warning::project_cleanup("directory busy"));

        assert_eq!(diag.warnings()[0].kind, WarningKind::KeyCachePurge);
        assert_eq!(diag.warnings()[1].kind, WarningKind::ProjectCleanup);
        assert_eq!(
            diag.into_messages(),
            vec!["permission denied".to_string(), "directory busy".to_string()]
        );
    }
}
