//! Plugin registry mapping provider names to their registrations.
//!
//! Responsibilities:
//! - Hold discovery and identity registrations keyed by name.
//! - Reject duplicate names per kind and report unknown names.
//! - Hand out creation factories and configuration-item functions.
//!
//! Does NOT handle:
//! - Running providers (see [`crate::orchestrator`]).
//!
//! Invariants:
//! - Names are unique within a kind; the same name may exist once per kind.
//! - The registry is an explicit value. Wrap it in `Arc` once populated;
//!   it is never mutated after that.
//! - Iteration is in name order.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use kconnect_config::{ConfigError, ConfigurationSet};
use tracing::debug;

use crate::discovery::DiscoveryProvider;
use crate::error::{ProviderError, Result};
use crate::exec::CommandRunner;
use crate::http::HttpClient;
use crate::identity::IdentityProvider;

/// The two kinds of plugin the registry holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginKind {
    Discovery,
    Identity,
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Discovery => f.write_str("discovery"),
            Self::Identity => f.write_str("identity"),
        }
    }
}

/// Shared collaborators handed to plugin factories.
#[derive(Debug, Clone, Default)]
pub struct PluginCreationInput {
    pub http_client: Option<Arc<dyn HttpClient>>,
    pub command_runner: Option<Arc<dyn CommandRunner>>,
}

/// Builds the configuration items a plugin accepts for a scope.
pub type ConfigItemsFn = fn(scope: &str) -> std::result::Result<ConfigurationSet, ConfigError>;

/// Creates a discovery provider from shared collaborators.
pub type DiscoveryFactory =
    Arc<dyn Fn(&PluginCreationInput) -> Result<Box<dyn DiscoveryProvider>> + Send + Sync>;

/// Creates an identity provider from shared collaborators.
pub type IdentityFactory =
    Arc<dyn Fn(&PluginCreationInput) -> Result<Box<dyn IdentityProvider>> + Send + Sync>;

/// A registered plugin of kind `F`.
#[derive(Clone)]
pub struct PluginRegistration<F> {
    pub name: String,
    pub usage_example: String,
    pub config_items: ConfigItemsFn,
    pub factory: F,
}

pub type DiscoveryRegistration = PluginRegistration<DiscoveryFactory>;
pub type IdentityRegistration = PluginRegistration<IdentityFactory>;

impl<F> PluginRegistration<F> {
    pub fn new(
        name: impl Into<String>,
        usage_example: impl Into<String>,
        config_items: ConfigItemsFn,
        factory: F,
    ) -> Self {
        Self {
            name: name.into(),
            usage_example: usage_example.into(),
            config_items,
            factory,
        }
    }
}

impl<F> fmt::Debug for PluginRegistration<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistration")
            .field("name", &self.name)
            .field("usage_example", &self.usage_example)
            .finish_non_exhaustive()
    }
}

impl DiscoveryRegistration {
    pub fn create(&self, input: &PluginCreationInput) -> Result<Box<dyn DiscoveryProvider>> {
        (self.factory)(input)
    }
}

impl IdentityRegistration {
    pub fn create(&self, input: &PluginCreationInput) -> Result<Box<dyn IdentityProvider>> {
        (self.factory)(input)
    }
}

/// Registry of discovery and identity plugins.
#[derive(Debug, Default, Clone)]
pub struct PluginRegistry {
    discovery: BTreeMap<String, DiscoveryRegistration>,
    identity: BTreeMap<String, IdentityRegistration>,
}

impl PluginRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every plugin shipped with kconnect.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::DuplicateName`] if two builtin plugins collide.
    pub fn builtin() -> Result<Self> {
        let mut registry = Self::new();
        crate::plugins::register_builtin_plugins(&mut registry)?;
        Ok(registry)
    }

    pub fn register_discovery_plugin(&mut self, registration: DiscoveryRegistration) -> Result<()> {
        if self.discovery.contains_key(&registration.name) {
            return Err(ProviderError::DuplicateName {
                kind: PluginKind::Discovery,
                name: registration.name,
            });
        }
        debug!(name = %registration.name, "registered discovery plugin");
        self.discovery
            .insert(registration.name.clone(), registration);
        Ok(())
    }

    pub fn register_identity_plugin(&mut self, registration: IdentityRegistration) -> Result<()> {
        if self.identity.contains_key(&registration.name) {
            return Err(ProviderError::DuplicateName {
                kind: PluginKind::Identity,
                name: registration.name,
            });
        }
        debug!(name = %registration.name, "registered identity plugin");
        self.identity.insert(registration.name.clone(), registration);
        Ok(())
    }

    pub fn discovery_plugin(&self, name: &str) -> Result<&DiscoveryRegistration> {
        self.discovery
            .get(name)
            .ok_or_else(|| ProviderError::NotFound {
                kind: PluginKind::Discovery,
                name: name.to_string(),
            })
    }

    pub fn identity_plugin(&self, name: &str) -> Result<&IdentityRegistration> {
        self.identity
            .get(name)
            .ok_or_else(|| ProviderError::NotFound {
                kind: PluginKind::Identity,
                name: name.to_string(),
            })
    }

    pub fn discovery_plugins(&self) -> impl Iterator<Item = &DiscoveryRegistration> {
        self.discovery.values()
    }

    pub fn identity_plugins(&self) -> impl Iterator<Item = &IdentityRegistration> {
        self.identity.values()
    }
}
