//! Error types for configuration sets.
//!
//! Responsibilities:
//! - Define error variants for declaring, populating, validating and resolving
//!   configuration items.
//! - Define the dotenv loading failures surfaced by [`crate::load_dotenv`].
//!
//! Does NOT handle:
//! - Provider-level failures (see the `kconnect-provider` crate).
//!
//! Invariants:
//! - Every item-related variant names the offending item.
//! - Errors NEVER include the value of an item, which may be a secret.
//! - Dotenv errors NEVER include raw .env line contents to prevent secret leakage.

use std::io::ErrorKind;
use thiserror::Error;

use crate::item::ConfigItemType;

/// Errors that can occur while working with a [`crate::ConfigurationSet`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration item '{0}' is already declared")]
    DuplicateItem(String),

    #[error("Short alias '-{alias}' for '{name}' is already used by '{existing}'")]
    DuplicateShort {
        name: String,
        alias: char,
        existing: String,
    },

    #[error("Configuration item '{0}' not found")]
    ItemNotFound(String),

    #[error("Missing required value for '{0}'")]
    MissingRequiredValue(String),

    #[error("Type mismatch for '{name}': expected {expected}, got {actual}")]
    TypeMismatch {
        name: String,
        expected: ConfigItemType,
        actual: ConfigItemType,
    },

    #[error("Invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },

    #[error("Failed to resolve configuration: {0}")]
    Deserialize(#[source] serde_json::Error),

    /// Failed to parse the `.env` file due to invalid syntax.
    ///
    /// SAFETY: This error only includes the byte index of the parse failure,
    /// NOT the offending line content, to prevent leaking secrets.
    #[error(
        "Failed to parse .env file at position {error_index}. Hint: set DOTENV_DISABLED=1 to skip .env loading"
    )]
    DotenvParse { error_index: usize },

    /// Failed to read the `.env` file due to an I/O error.
    #[error("Failed to read .env file: {kind}")]
    DotenvIo { kind: ErrorKind },

    /// Unknown dotenv error (future variants from dotenvy crate).
    #[error("Failed to load .env file. Hint: set DOTENV_DISABLED=1 to skip .env loading")]
    DotenvUnknown,
}

impl ConfigError {
    /// Name of the item this error refers to, when there is one.
    pub fn item_name(&self) -> Option<&str> {
        match self {
            Self::DuplicateItem(name)
            | Self::ItemNotFound(name)
            | Self::MissingRequiredValue(name)
            | Self::DuplicateShort { name, .. }
            | Self::TypeMismatch { name, .. }
            | Self::InvalidValue { name, .. } => Some(name),
            Self::Deserialize(_)
            | Self::DotenvParse { .. }
            | Self::DotenvIo { .. }
            | Self::DotenvUnknown => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_name_for_item_errors() {
        let err = ConfigError::MissingRequiredValue("tenant-id".to_string());
        assert_eq!(err.item_name(), Some("tenant-id"));

        let err = ConfigError::DuplicateShort {
            name: "region".to_string(),
            alias: 'r',
            existing: "role".to_string(),
        };
        assert_eq!(err.item_name(), Some("region"));
        assert!(err.to_string().contains("-r"));
    }

    #[test]
    fn test_item_name_for_dotenv_errors() {
        assert_eq!(ConfigError::DotenvUnknown.item_name(), None);
        assert_eq!(
            ConfigError::DotenvParse { error_index: 3 }.item_name(),
            None
        );
    }
}
