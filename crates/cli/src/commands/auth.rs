//! Auth command implementation.

use anyhow::{Context, Result};
use kconnect_provider::IdentitySummary;
use tracing::info;

use super::{CommandContext, populate, warn_if_expiring};
use crate::flags::ProviderCommand;
use crate::output;

pub async fn run(ctx: &CommandContext, provider: &str, args: &[String]) -> Result<()> {
    let mut config = ctx.orchestrator.identity_config(provider, "")?;

    let matches = ProviderCommand::new(format!("kconnect auth {provider}"))
        .items(&config, "Identity options")
        .try_parse(args)
        .unwrap_or_else(|e| e.exit());
    populate(&mut config, &matches)?;

    info!(provider, interactive = ctx.interactive, "authenticating");
    let identity = ctx
        .cancel
        .run(async {
            ctx.orchestrator
                .authenticate(provider, &config, ctx.interactive)
                .await
                .with_context(|| format!("Failed to authenticate with {provider}"))
        })
        .await?;

    warn_if_expiring(&identity);
    let summary: IdentitySummary = identity.summary();
    output::print(ctx.output, &summary)
}
