//! Providers command implementation.

use anyhow::Result;
use kconnect_provider::PluginRegistry;
use serde::Serialize;

use crate::output::{self, OutputFormat};

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ProviderEntry {
    pub name: String,
    pub usage: String,
}

#[derive(Debug, Serialize)]
pub struct ProviderListing {
    pub discovery: Vec<ProviderEntry>,
    pub identity: Vec<ProviderEntry>,
}

/// Registered providers of both kinds, in name order.
pub fn listing(registry: &PluginRegistry) -> ProviderListing {
    ProviderListing {
        discovery: registry
            .discovery_plugins()
            .map(|p| ProviderEntry {
                name: p.name.clone(),
                usage: p.usage_example.clone(),
            })
            .collect(),
        identity: registry
            .identity_plugins()
            .map(|p| ProviderEntry {
                name: p.name.clone(),
                usage: p.usage_example.clone(),
            })
            .collect(),
    }
}

pub fn run(registry: &PluginRegistry, format: OutputFormat) -> Result<()> {
    output::print(format, &listing(registry))
}
