// ABOUTME: Custom serde deserializers for config types.
// ABOUTME: Handles the UI variant list and home-relative paths.

use nonempty::NonEmpty;
use serde::Deserialize;
use std::path::PathBuf;

use crate::types::UiVariant;

/// Non-empty list of UI variants. Duplicates are dropped, order kept.
pub fn deserialize_ui_variants<'de, D>(deserializer: D) -> Result<NonEmpty<UiVariant>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let values: Vec<String> = Vec::deserialize(deserializer)?;
    let mut variants: Vec<UiVariant> = Vec::with_capacity(values.len());
    for value in values {
        let variant: UiVariant = value.parse().map_err(serde::de::Error::custom)?;
        if !variants.contains(&variant) {
            variants.push(variant);
        }
    }

    NonEmpty::from_vec(variants)
        .ok_or_else(|| serde::de::Error::custom("at least one UI variant is required"))
}

pub fn deserialize_home_path_option<'de, D>(deserializer: D) -> Result<Option<PathBuf>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.map(|s| expand_home(&s)))
}

/// Expand a leading `~/` using `$HOME`.
pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), std::env::var_os("HOME")) {
        (Some(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => PathBuf::from(path),
    }
}
