//! The configuration set plugins use to declare and consume options.
//!
//! Responsibilities:
//! - Declare typed items (string/bool/int) with defaults, required flags,
//!   short aliases and sensitivity.
//! - Accept caller-supplied values (typed or raw strings) for declared items.
//! - Validate that every required item resolves to a value.
//! - Resolve the set into a plugin's typed configuration struct.
//!
//! Does NOT handle:
//! - Reading values from the environment (see `env.rs`).
//! - Generating CLI flags (done by the CLI crate from [`ConfigurationSet::items`]).
//!
//! Invariants:
//! - Item names are unique within a set; short aliases are unique within a set.
//! - Items keep their declaration order.
//! - No I/O happens here.

use secrecy::SecretString;
use serde::de::DeserializeOwned;

use crate::error::ConfigError;
use crate::item::{ConfigItemType, ConfigValue, ConfigurationItem};

/// Ordered collection of named, typed configuration items.
#[derive(Debug, Clone, Default)]
pub struct ConfigurationSet {
    items: Vec<ConfigurationItem>,
}

impl ConfigurationSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a new item.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateItem`] if `name` is already declared and
    /// [`ConfigError::TypeMismatch`] if `default` does not match `item_type`.
    pub fn add(
        &mut self,
        name: &str,
        item_type: ConfigItemType,
        default: Option<ConfigValue>,
        description: &str,
    ) -> Result<(), ConfigError> {
        if self.exists(name) {
            return Err(ConfigError::DuplicateItem(name.to_string()));
        }
        if let Some(value) = &default
            && value.item_type() != item_type
        {
            return Err(ConfigError::TypeMismatch {
                name: name.to_string(),
                expected: item_type,
                actual: value.item_type(),
            });
        }
        self.items
            .push(ConfigurationItem::new(name, item_type, default, description));
        Ok(())
    }

    /// Declare a string item. An empty default means "no default".
    pub fn string(
        &mut self,
        name: &str,
        default: &str,
        description: &str,
    ) -> Result<(), ConfigError> {
        let default = (!default.is_empty()).then(|| ConfigValue::from(default));
        self.add(name, ConfigItemType::String, default, description)
    }

    /// Declare a boolean item.
    pub fn bool(
        &mut self,
        name: &str,
        default: bool,
        description: &str,
    ) -> Result<(), ConfigError> {
        self.add(
            name,
            ConfigItemType::Bool,
            Some(ConfigValue::Bool(default)),
            description,
        )
    }

    /// Declare an integer item.
    pub fn int(&mut self, name: &str, default: i64, description: &str) -> Result<(), ConfigError> {
        self.add(
            name,
            ConfigItemType::Int,
            Some(ConfigValue::Int(default)),
            description,
        )
    }

    /// Mark an item as required.
    pub fn set_required(&mut self, name: &str) -> Result<(), ConfigError> {
        self.get_mut(name)?.required = true;
        Ok(())
    }

    /// Mark an item as holding a secret.
    pub fn set_sensitive(&mut self, name: &str) -> Result<(), ConfigError> {
        self.get_mut(name)?.sensitive = true;
        Ok(())
    }

    /// Assign a single-character alias to an item.
    pub fn set_short(&mut self, name: &str, alias: char) -> Result<(), ConfigError> {
        if !self.exists(name) {
            return Err(ConfigError::ItemNotFound(name.to_string()));
        }
        if let Some(owner) = self
            .items
            .iter()
            .find(|item| item.short == Some(alias) && item.name != name)
        {
            return Err(ConfigError::DuplicateShort {
                name: name.to_string(),
                alias,
                existing: owner.name.clone(),
            });
        }
        self.get_mut(name)?.short = Some(alias);
        Ok(())
    }

    /// Look up an item by name.
    pub fn get(&self, name: &str) -> Result<&ConfigurationItem, ConfigError> {
        self.items
            .iter()
            .find(|item| item.name == name)
            .ok_or_else(|| ConfigError::ItemNotFound(name.to_string()))
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut ConfigurationItem, ConfigError> {
        self.items
            .iter_mut()
            .find(|item| item.name == name)
            .ok_or_else(|| ConfigError::ItemNotFound(name.to_string()))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.items.iter().any(|item| item.name == name)
    }

    /// Items in declaration order.
    pub fn items(&self) -> impl Iterator<Item = &ConfigurationItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Supply a typed value for a declared item.
    pub fn set_value(&mut self, name: &str, value: ConfigValue) -> Result<(), ConfigError> {
        let item = self.get_mut(name)?;
        if value.item_type() != item.item_type {
            return Err(ConfigError::TypeMismatch {
                name: name.to_string(),
                expected: item.item_type,
                actual: value.item_type(),
            });
        }
        item.value = Some(value);
        Ok(())
    }

    /// Supply a raw string value, parsed according to the item's type.
    pub fn set_value_str(&mut self, name: &str, raw: &str) -> Result<(), ConfigError> {
        let item_type = self.get(name)?.item_type;
        let value = ConfigValue::parse(name, item_type, raw)?;
        self.set_value(name, value)
    }

    /// Resolved value (supplied, else default) of an item.
    pub fn value(&self, name: &str) -> Result<Option<&ConfigValue>, ConfigError> {
        Ok(self.get(name)?.resolved())
    }

    /// Resolved string value; `None` when unset or empty.
    pub fn string_value(&self, name: &str) -> Result<Option<String>, ConfigError> {
        match self.value(name)? {
            Some(ConfigValue::String(s)) if !s.is_empty() => Ok(Some(s.clone())),
            Some(ConfigValue::String(_)) | None => Ok(None),
            Some(other) => Err(type_mismatch(name, ConfigItemType::String, other)),
        }
    }

    /// Resolved string value wrapped as a secret.
    pub fn secret_value(&self, name: &str) -> Result<Option<SecretString>, ConfigError> {
        Ok(self
            .string_value(name)?
            .map(|s| SecretString::new(s.into())))
    }

    pub fn bool_value(&self, name: &str) -> Result<Option<bool>, ConfigError> {
        match self.value(name)? {
            Some(ConfigValue::Bool(b)) => Ok(Some(*b)),
            None => Ok(None),
            Some(other) => Err(type_mismatch(name, ConfigItemType::Bool, other)),
        }
    }

    pub fn int_value(&self, name: &str) -> Result<Option<i64>, ConfigError> {
        match self.value(name)? {
            Some(ConfigValue::Int(i)) => Ok(Some(*i)),
            None => Ok(None),
            Some(other) => Err(type_mismatch(name, ConfigItemType::Int, other)),
        }
    }

    /// Check that every required item resolves to a value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredValue`] naming the first
    /// unsatisfied item in declaration order.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.items.iter().find(|item| !item.is_satisfied()) {
            Some(item) => Err(ConfigError::MissingRequiredValue(item.name.clone())),
            None => Ok(()),
        }
    }

    /// Merge the items of `other` into this set.
    ///
    /// Nothing is merged if any name collides.
    pub fn extend(&mut self, other: ConfigurationSet) -> Result<(), ConfigError> {
        if let Some(dup) = other.items.iter().find(|item| self.exists(&item.name)) {
            return Err(ConfigError::DuplicateItem(dup.name.clone()));
        }
        self.items.extend(other.items);
        Ok(())
    }

    /// Resolve the set into a typed configuration struct.
    ///
    /// Each item becomes a field of a JSON object keyed by the item name, so
    /// target structs use `#[serde(rename = "tenant-id")]` style attributes.
    /// Items without a resolved value are omitted.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ConfigError> {
        let object: serde_json::Map<String, serde_json::Value> = self
            .items
            .iter()
            .filter_map(|item| item.resolved().map(|v| (item.name.clone(), v.to_json())))
            .collect();
        serde_json::from_value(serde_json::Value::Object(object)).map_err(ConfigError::Deserialize)
    }
}

fn type_mismatch(name: &str, expected: ConfigItemType, got: &ConfigValue) -> ConfigError {
    ConfigError::TypeMismatch {
        name: name.to_string(),
        expected,
        actual: got.item_type(),
    }
}
