//! Command dispatch logic.
//!
//! Responsibilities:
//! - Build the shared orchestrator (registry, HTTP client, command runner)
//!   from global options.
//! - Route parsed CLI arguments to the appropriate command handlers.
//!
//! Does NOT handle:
//! - CLI structure definitions (see `args` module).
//! - Logging and signal setup (see `main()`).
//!
//! Invariants:
//! - A registry that fails to build is fatal; no command runs without one.
//! - All provider calls receive the same cancellation token.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use kconnect_provider::{Orchestrator, PluginRegistry, ProcessRunner, ReqwestHttpClient};

use crate::args::{Cli, Commands};
use crate::cancellation::CancellationToken;
use crate::commands::{self, CommandContext};

fn build_orchestrator(cli: &Cli) -> Result<Orchestrator> {
    let registry = PluginRegistry::builtin().context("Failed to register builtin providers")?;

    let http = ReqwestHttpClient::builder()
        .timeout(Duration::from_secs(cli.timeout))
        .max_retries(cli.max_retries)
        .skip_verify(cli.skip_verify)
        .user_agent(format!("kconnect/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    Ok(Orchestrator::new(Arc::new(registry))
        .with_http_client(Arc::new(http))
        .with_command_runner(Arc::new(ProcessRunner)))
}

/// Dispatch CLI commands to their respective handlers.
pub(crate) async fn run_command(cli: Cli, cancel: CancellationToken) -> Result<()> {
    let ctx = CommandContext {
        orchestrator: build_orchestrator(&cli)?,
        output: cli.output,
        interactive: cli.interactive,
        cancel,
    };

    match cli.command {
        Commands::Providers => commands::providers::run(ctx.orchestrator.registry(), ctx.output),
        Commands::ConfigItems {
            provider,
            kind,
            scope,
        } => commands::config_items::run(&ctx.orchestrator, &provider, kind, &scope, ctx.output),
        Commands::Auth { provider, args } => commands::auth::run(&ctx, &provider, &args).await,
        Commands::Use { provider, args } => commands::connect::run(&ctx, &provider, &args).await,
    }
}
