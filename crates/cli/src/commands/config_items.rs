//! Config-items command implementation.
//!
//! Lists the options a provider declares, with the flag and environment
//! variable that set each one. Sensitive defaults are never printed.

use anyhow::Result;
use kconnect_config::constants::ENV_PREFIX;
use kconnect_config::{ConfigItemType, ConfigurationItem, ConfigurationSet, env_var_name};
use kconnect_provider::{Orchestrator, PluginKind};
use serde::Serialize;

use crate::args::KindArg;
use crate::output::{self, OutputFormat};

#[derive(Debug, Serialize)]
pub struct ItemEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: ConfigItemType,
    pub flag: String,
    pub env: String,
    pub required: bool,
    pub sensitive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct ProviderItems {
    pub kind: String,
    pub provider: String,
    pub items: Vec<ItemEntry>,
}

fn flag_for(item: &ConfigurationItem) -> String {
    match item.short() {
        Some(short) => format!("-{short}, --{}", item.name()),
        None => format!("--{}", item.name()),
    }
}

fn entry(item: &ConfigurationItem) -> ItemEntry {
    let default = item
        .default_value()
        .map(|v| v.to_string())
        .filter(|v| !v.is_empty() && !item.is_sensitive());
    ItemEntry {
        name: item.name().to_string(),
        item_type: item.item_type(),
        flag: flag_for(item),
        env: env_var_name(ENV_PREFIX, item.name()),
        required: item.is_required(),
        sensitive: item.is_sensitive(),
        default,
        description: item.description().to_string(),
    }
}

fn describe(kind: PluginKind, provider: &str, cs: &ConfigurationSet) -> ProviderItems {
    ProviderItems {
        kind: kind.to_string(),
        provider: provider.to_string(),
        items: cs.items().map(entry).collect(),
    }
}

/// Items of every provider called `provider`, restricted to `kind` if given.
///
/// # Errors
///
/// Returns the registry's `NotFound` error when no provider matches.
pub fn collect(
    orchestrator: &Orchestrator,
    provider: &str,
    kind: Option<KindArg>,
    scope: &str,
) -> Result<Vec<ProviderItems>> {
    let mut found = Vec::new();
    let mut first_err = None;

    if kind != Some(KindArg::Identity) {
        match orchestrator.discovery_config(provider, scope) {
            Ok(cs) => found.push(describe(PluginKind::Discovery, provider, &cs)),
            Err(e) if e.is_not_found() => first_err = Some(e),
            Err(e) => return Err(e.into()),
        }
    }
    if kind != Some(KindArg::Discovery) {
        match orchestrator.identity_config(provider, scope) {
            Ok(cs) => found.push(describe(PluginKind::Identity, provider, &cs)),
            Err(e) if e.is_not_found() => {
                first_err.get_or_insert(e);
            }
            Err(e) => return Err(e.into()),
        }
    }

    match first_err {
        Some(err) if found.is_empty() => Err(err.into()),
        _ => Ok(found),
    }
}

pub fn run(
    orchestrator: &Orchestrator,
    provider: &str,
    kind: Option<KindArg>,
    scope: &str,
    format: OutputFormat,
) -> Result<()> {
    let items = collect(orchestrator, provider, kind, scope)?;
    output::print(format, &items)
}
