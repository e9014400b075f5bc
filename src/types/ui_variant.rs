// ABOUTME: UI project variants offered by the zkApp project scaffolder.
// ABOUTME: Order matches the scaffolder's interactive selection menu.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiVariant {
    Svelte,
    Next,
    Nuxt,
    Empty,
    None,
}

#[derive(Debug, Error)]
#[error("unknown UI variant: {0} (expected one of svelte, next, nuxt, empty, none)")]
pub struct UnknownUiVariant(String);

impl UiVariant {
    pub const ALL: [UiVariant; 5] = [
        UiVariant::Svelte,
        UiVariant::Next,
        UiVariant::Nuxt,
        UiVariant::Empty,
        UiVariant::None,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UiVariant::Svelte => "svelte",
            UiVariant::Next => "next",
            UiVariant::Nuxt => "nuxt",
            UiVariant::Empty => "empty",
            UiVariant::None => "none",
        }
    }

    /// Position in the scaffolder's selection menu (0 = preselected).
    pub fn menu_index(&self) -> usize {
        Self::ALL
            .iter()
            .position(|v| v == self)
            .unwrap_or_default()
    }

    /// Whether the generated project has a separate `ui/` directory next to `contracts/`.
    pub fn has_ui_project(&self) -> bool {
        !matches!(self, UiVariant::None)
    }

    /// Extra prompts the scaffolder asks for this variant after the menu.
    pub fn follow_up_prompts(&self) -> &'static [&'static str] {
        match self {
            UiVariant::Next => &["Do you want to set up your project for deployment to GitHub Pages?"],
            _ => &[],
        }
    }
}

impl fmt::Display for UiVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UiVariant {
    type Err = UnknownUiVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownUiVariant(s.to_string()))
    }
}
