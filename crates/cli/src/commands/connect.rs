//! Use command implementation.
//!
//! Resolves `kconnect use <discovery> --idp-protocol <identity> --cluster-id <id>`
//! into a cluster configuration. Identity options of every registered
//! identity provider are accepted; only those the selected provider declares
//! are applied.

use anyhow::{Context, Result};
use clap::Arg;
use kconnect_provider::{ClusterConfig, ConnectRequest, IdentitySummary};
use serde::Serialize;
use tracing::info;

use super::{CommandContext, populate, warn_if_expiring};
use crate::flags::ProviderCommand;
use crate::output;

const IDP_PROTOCOL_ARG: &str = "idp-protocol";
const CLUSTER_ID_ARG: &str = "cluster-id";

#[derive(Debug, Serialize)]
pub struct ConnectSummary {
    pub cluster: ClusterConfig,
    pub identity: IdentitySummary,
}

pub async fn run(ctx: &CommandContext, provider: &str, args: &[String]) -> Result<()> {
    let registry = ctx.orchestrator.registry();
    let mut discovery_config = ctx.orchestrator.discovery_config(provider, "")?;

    let mut command = ProviderCommand::new(format!("kconnect use {provider}"))
        .arg(
            Arg::new(IDP_PROTOCOL_ARG)
                .long(IDP_PROTOCOL_ARG)
                .required(true)
                .value_name("NAME")
                .help("Identity provider to authenticate with"),
        )
        .arg(
            Arg::new(CLUSTER_ID_ARG)
                .long(CLUSTER_ID_ARG)
                .required(true)
                .value_name("ID")
                .help("Cluster identifier, e.g. an EKS cluster ARN"),
        )
        .items(&discovery_config, "Discovery options");
    for registration in registry.identity_plugins() {
        let cs = (registration.config_items)(provider)?;
        command = command.items(&cs, "Identity options");
    }
    let matches = command.try_parse(args).unwrap_or_else(|e| e.exit());

    let idp = matches
        .get_one::<String>(IDP_PROTOCOL_ARG)
        .context("--idp-protocol is required")?;
    let cluster_id = matches
        .get_one::<String>(CLUSTER_ID_ARG)
        .context("--cluster-id is required")?;

    let mut identity_config = ctx.orchestrator.identity_config(idp, provider)?;
    populate(&mut discovery_config, &matches)?;
    populate(&mut identity_config, &matches)?;

    info!(provider, idp = %idp, cluster_id = %cluster_id, "connecting");
    let connected = ctx
        .cancel
        .run(async {
            ctx.orchestrator
                .connect(ConnectRequest {
                    discovery_provider: provider,
                    identity_provider: idp,
                    discovery_config: &discovery_config,
                    identity_config: &identity_config,
                    cluster_id,
                    interactive: ctx.interactive,
                })
                .await
                .with_context(|| format!("Failed to connect to {cluster_id}"))
        })
        .await?;

    warn_if_expiring(&connected.identity);
    output::print(
        ctx.output,
        &ConnectSummary {
            cluster: connected.cluster,
            identity: connected.identity.summary(),
        },
    )
}
