// ABOUTME: Validated names for deployment aliases, fee payer aliases and projects.
// ABOUTME: Names end up as file names and JSON keys, so the character set is restricted.

use serde::Serialize;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

const MAX_LEN: usize = 64;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AliasNameError {
    #[error("alias name cannot be empty")]
    Empty,

    #[error("alias name exceeds maximum length of {MAX_LEN} characters")]
    TooLong,

    #[error("alias name cannot start with '{0}'")]
    InvalidStart(char),

    #[error("invalid character in alias name: '{0}'")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AliasName(String);

impl AliasName {
    pub fn new(value: &str) -> Result<Self, AliasNameError> {
        let first = value.chars().next().ok_or(AliasNameError::Empty)?;

        if value.len() > MAX_LEN {
            return Err(AliasNameError::TooLong);
        }

        if first == '-' || first == '.' {
            return Err(AliasNameError::InvalidStart(first));
        }

        for c in value.chars() {
            if !c.is_ascii_alphanumeric() && c != '-' && c != '_' && c != '.' {
                return Err(AliasNameError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    /// A fresh random name, so parallel runs never share an alias.
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// A fresh random name with a readable prefix.
    pub fn random_with_prefix(prefix: &str) -> Self {
        Self(format!("{}-{}", prefix, Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AliasName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_uuid_names() {
        let name = AliasName::random();
        assert!(AliasName::new(name.as_str()).is_ok());
    }

    #[test]
    fn prefixed_names_are_valid_and_distinct() {
        let a = AliasName::random_with_prefix("fee-payer");
        let b = AliasName::random_with_prefix("fee-payer");
        assert!(a.as_str().starts_with("fee-payer-"));
        assert_ne!(a, b);
        assert!(AliasName::new(a.as_str()).is_ok());
    }

    #[test]
    fn rejects_path_separators() {
        assert_eq!(
            AliasName::new("../etc"),
            Err(AliasNameError::InvalidStart('.'))
        );
        assert_eq!(
            AliasName::new("a/b"),
            Err(AliasNameError::InvalidChar('/'))
        );
    }

    #[test]
    fn rejects_empty_and_long() {
        assert_eq!(AliasName::new(""), Err(AliasNameError::Empty));
        assert_eq!(
            AliasName::new(&"a".repeat(65)),
            Err(AliasNameError::TooLong)
        );
    }
}
