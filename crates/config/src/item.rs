//! Configuration item types.
//!
//! Responsibilities:
//! - Define the type tag and value representation for a single option.
//! - Parse raw strings (flags, environment) into typed values.
//!
//! Does NOT handle:
//! - Uniqueness of names or aliases (see `set.rs`).
//!
//! Invariants:
//! - A value stored on an item always matches the item's type tag.
//! - `Debug` output of a sensitive item never contains its value.

use std::fmt;

use serde::Serialize;

use crate::error::ConfigError;

/// Type tag of a configuration item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigItemType {
    String,
    Bool,
    Int,
}

impl fmt::Display for ConfigItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::Int => "int",
        };
        f.write_str(name)
    }
}

/// A typed configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    String(String),
    Bool(bool),
    Int(i64),
}

impl ConfigValue {
    /// The type tag this value satisfies.
    pub fn item_type(&self) -> ConfigItemType {
        match self {
            Self::String(_) => ConfigItemType::String,
            Self::Bool(_) => ConfigItemType::Bool,
            Self::Int(_) => ConfigItemType::Int,
        }
    }

    /// Parse a raw string into a value of the given type.
    ///
    /// Booleans accept `true`/`false`/`1`/`0`/`yes`/`no` (case-insensitive).
    pub fn parse(name: &str, item_type: ConfigItemType, raw: &str) -> Result<Self, ConfigError> {
        let raw = raw.trim();
        match item_type {
            ConfigItemType::String => Ok(Self::String(raw.to_string())),
            ConfigItemType::Bool => match raw.to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(Self::Bool(true)),
                "false" | "0" | "no" => Ok(Self::Bool(false)),
                _ => Err(ConfigError::InvalidValue {
                    name: name.to_string(),
                    message: "must be true or false".to_string(),
                }),
            },
            ConfigItemType::Int => {
                raw.parse()
                    .map(Self::Int)
                    .map_err(|_| ConfigError::InvalidValue {
                        name: name.to_string(),
                        message: "must be an integer".to_string(),
                    })
            }
        }
    }

    pub(crate) fn to_json(&self) -> serde_json::Value {
        match self {
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Int(i) => serde_json::Value::from(*i),
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

/// A single named option declared by a plugin.
#[derive(Clone)]
pub struct ConfigurationItem {
    pub(crate) name: String,
    pub(crate) item_type: ConfigItemType,
    pub(crate) description: String,
    pub(crate) default: Option<ConfigValue>,
    pub(crate) required: bool,
    pub(crate) short: Option<char>,
    pub(crate) sensitive: bool,
    pub(crate) value: Option<ConfigValue>,
}

impl ConfigurationItem {
    pub(crate) fn new(
        name: &str,
        item_type: ConfigItemType,
        default: Option<ConfigValue>,
        description: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            item_type,
            description: description.to_string(),
            default,
            required: false,
            short: None,
            sensitive: false,
            value: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn item_type(&self) -> ConfigItemType {
        self.item_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn default_value(&self) -> Option<&ConfigValue> {
        self.default.as_ref()
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn short(&self) -> Option<char> {
        self.short
    }

    /// Sensitive items hold secrets and must not be logged or echoed.
    pub fn is_sensitive(&self) -> bool {
        self.sensitive
    }

    /// Value explicitly supplied by the caller, ignoring the default.
    pub fn value(&self) -> Option<&ConfigValue> {
        self.value.as_ref()
    }

    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// Supplied value, falling back to the declared default.
    pub fn resolved(&self) -> Option<&ConfigValue> {
        self.value.as_ref().or(self.default.as_ref())
    }

    /// An item is satisfied when it is optional or resolves to a non-empty value.
    pub fn is_satisfied(&self) -> bool {
        if !self.required {
            return true;
        }
        match self.resolved() {
            Some(ConfigValue::String(s)) => !s.is_empty(),
            Some(_) => true,
            None => false,
        }
    }
}

impl fmt::Debug for ConfigurationItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("ConfigurationItem");
        out.field("name", &self.name)
            .field("item_type", &self.item_type)
            .field("required", &self.required)
            .field("short", &self.short)
            .field("sensitive", &self.sensitive);
        if self.sensitive {
            out.field("default", &self.default.as_ref().map(|_| "[REDACTED]"))
                .field("value", &self.value.as_ref().map(|_| "[REDACTED]"));
        } else {
            out.field("default", &self.default)
                .field("value", &self.value);
        }
        out.finish()
    }
}
