// ABOUTME: Config values that may be read from the environment.
// ABOUTME: Either a literal string or `{ env: NAME, default: ... }`.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
    Literal(String),
    FromEnv {
        #[serde(rename = "env")]
        var: String,
        #[serde(default)]
        default: Option<String>,
    },
}

impl EnvValue {
    pub fn literal(value: impl Into<String>) -> Self {
        EnvValue::Literal(value.into())
    }

    pub fn from_env(var: impl Into<String>, default: Option<&str>) -> Self {
        EnvValue::FromEnv {
            var: var.into(),
            default: default.map(str::to_string),
        }
    }

    /// The variable consulted, if any.
    pub fn var_name(&self) -> Option<&str> {
        match self {
            EnvValue::Literal(_) => None,
            EnvValue::FromEnv { var, .. } => Some(var),
        }
    }

    /// Resolve to a string. Empty variables count as unset.
    pub fn resolve(&self) -> Result<String> {
        match self {
            EnvValue::Literal(s) => Ok(s.clone()),
            EnvValue::FromEnv { var, default } => match std::env::var(var) {
                Ok(val) if !val.trim().is_empty() => Ok(val),
                _ => default
                    .clone()
                    .ok_or_else(|| Error::MissingEnvVar(var.clone())),
            },
        }
    }
}

impl fmt::Display for EnvValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvValue::Literal(s) => write!(f, "{}", s),
            EnvValue::FromEnv { var, default: None } => write!(f, "${}", var),
            EnvValue::FromEnv {
                var,
                default: Some(d),
            } => write!(f, "${} (default {})", var, d),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_resolves_to_itself() {
        assert_eq!(EnvValue::literal("mocked").resolve().unwrap(), "mocked");
    }

    #[test]
    fn env_overrides_default() {
        let value = EnvValue::from_env("ZKH_TEST_ENDPOINT", Some("mocked"));
        temp_env::with_var("ZKH_TEST_ENDPOINT", Some("http://node:3085/graphql"), || {
            assert_eq!(value.resolve().unwrap(), "http://node:3085/graphql");
        });
    }

    #[test]
    fn empty_env_falls_back_to_default() {
        let value = EnvValue::from_env("ZKH_TEST_EMPTY", Some("mocked"));
        temp_env::with_var("ZKH_TEST_EMPTY", Some(""), || {
            assert_eq!(value.resolve().unwrap(), "mocked");
        });
    }

    #[test]
    fn missing_env_without_default_errors() {
        let value = EnvValue::from_env("ZKH_TEST_MISSING", None);
        temp_env::with_var_unset("ZKH_TEST_MISSING", || {
            let err = value.resolve().unwrap_err();
            assert!(err.to_string().contains("ZKH_TEST_MISSING"));
        });
    }

    #[test]
    fn parses_both_yaml_forms() {
        let literal: EnvValue = serde_yaml::from_str("accounts.json").unwrap();
        assert_eq!(literal, EnvValue::literal("accounts.json"));

        let from_env: EnvValue = serde_yaml::from_str("{ env: ACCOUNTS, default: a.json }").unwrap();
        assert_eq!(from_env.var_name(), Some("ACCOUNTS"));
    }
}
