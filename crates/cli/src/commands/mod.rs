//! CLI command implementations.

pub mod auth;
pub mod config_items;
pub mod connect;
pub mod providers;

use anyhow::Result;
use kconnect_config::ConfigurationSet;
use kconnect_config::constants::DEFAULT_EXPIRY_BUFFER_SECS;
use kconnect_provider::{Identity, Orchestrator};
use tracing::warn;

use crate::cancellation::CancellationToken;
use crate::flags::apply_matches;
use crate::output::OutputFormat;

/// Everything a command handler needs besides its own arguments.
pub struct CommandContext {
    pub orchestrator: Orchestrator,
    pub output: OutputFormat,
    pub interactive: bool,
    pub cancel: CancellationToken,
}

/// Populate `cs` from flags, then `KCONNECT_*` environment variables.
fn populate(cs: &mut ConfigurationSet, matches: &clap::ArgMatches) -> Result<()> {
    apply_matches(cs, matches)?;
    cs.apply_default_env()?;
    Ok(())
}

/// Warn when a freshly issued identity is already about to expire.
fn warn_if_expiring(identity: &Identity) {
    let buffer = chrono::Duration::seconds(DEFAULT_EXPIRY_BUFFER_SECS);
    if identity.expires_within(buffer) {
        warn!(
            provider = identity.provider(),
            expires_at = %identity.expires_at(),
            "credentials expire within {}s",
            DEFAULT_EXPIRY_BUFFER_SECS
        );
    }
}
