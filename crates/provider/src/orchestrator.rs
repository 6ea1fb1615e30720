//! Authentication orchestrator.
//!
//! Responsibilities:
//! - Look up providers by name, construct them with the shared collaborators
//!   and invoke them.
//! - Validate configuration sets before any provider runs.
//! - Chain identity and discovery for a full `connect`.
//!
//! Does NOT handle:
//! - Populating configuration sets (the CLI does that from flags and env).
//! - Cancellation; callers drop the returned future to abort.
//!
//! Invariants:
//! - Registry and validation errors surface before any network or
//!   subprocess call.
//! - Each provider call runs inside a tracing span naming the provider.

use std::sync::Arc;

use kconnect_config::ConfigurationSet;
use tracing::{Instrument, debug, info_span};

use crate::discovery::{ClusterConfig, GetClusterInput};
use crate::error::Result;
use crate::exec::CommandRunner;
use crate::http::HttpClient;
use crate::identity::{AuthenticateInput, Identity};
use crate::registry::{PluginCreationInput, PluginRegistry};

/// Parameters for [`Orchestrator::connect`].
#[derive(Debug, Clone, Copy)]
pub struct ConnectRequest<'a> {
    pub discovery_provider: &'a str,
    pub identity_provider: &'a str,
    pub discovery_config: &'a ConfigurationSet,
    pub identity_config: &'a ConfigurationSet,
    pub cluster_id: &'a str,
    pub interactive: bool,
}

/// Result of [`Orchestrator::connect`].
#[derive(Debug, Clone)]
pub struct ConnectOutput {
    pub identity: Identity,
    pub cluster: ClusterConfig,
}

/// Runs discovery and identity providers selected by name.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    registry: Arc<PluginRegistry>,
    http_client: Option<Arc<dyn HttpClient>>,
    command_runner: Option<Arc<dyn CommandRunner>>,
}

impl Orchestrator {
    pub fn new(registry: Arc<PluginRegistry>) -> Self {
        Self {
            registry,
            http_client: None,
            command_runner: None,
        }
    }

    pub fn with_http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn with_command_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.command_runner = Some(runner);
        self
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    fn creation_input(&self) -> PluginCreationInput {
        PluginCreationInput {
            http_client: self.http_client.clone(),
            command_runner: self.command_runner.clone(),
        }
    }

    /// Configuration items of the named identity provider.
    pub fn identity_config(&self, name: &str, scope: &str) -> Result<ConfigurationSet> {
        let registration = self.registry.identity_plugin(name)?;
        Ok((registration.config_items)(scope)?)
    }

    /// Configuration items of the named discovery provider.
    pub fn discovery_config(&self, name: &str, scope: &str) -> Result<ConfigurationSet> {
        let registration = self.registry.discovery_plugin(name)?;
        Ok((registration.config_items)(scope)?)
    }

    /// Authenticate with the named identity provider.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown provider, construction errors such
    /// as `HttpClientRequired`, `Config(MissingRequiredValue)` for an
    /// incomplete set, and any error the provider reports.
    pub async fn authenticate(
        &self,
        name: &str,
        config: &ConfigurationSet,
        interactive: bool,
    ) -> Result<Identity> {
        let registration = self.registry.identity_plugin(name)?;
        let provider = registration.create(&self.creation_input())?;
        config.validate()?;

        let span = info_span!("authenticate", provider = name, interactive);
        let output = provider
            .authenticate(AuthenticateInput {
                config,
                interactive,
            })
            .instrument(span)
            .await?;

        debug!(
            provider = name,
            expires_at = %output.identity.expires_at(),
            interactive_login_required = output.identity.interactive_login_required(),
            "authenticated"
        );
        Ok(output.identity)
    }

    /// Look up a cluster with the named discovery provider.
    pub async fn get_cluster(
        &self,
        name: &str,
        config: &ConfigurationSet,
        identity: &Identity,
        cluster_id: &str,
    ) -> Result<ClusterConfig> {
        let registration = self.registry.discovery_plugin(name)?;
        let provider = registration.create(&self.creation_input())?;
        config.validate()?;

        let span = info_span!("get_cluster", provider = name, cluster_id);
        let output = provider
            .get_cluster(GetClusterInput {
                config,
                identity,
                cluster_id,
            })
            .instrument(span)
            .await?;
        Ok(output.cluster)
    }

    /// Authenticate, then look up the cluster with the resulting identity.
    pub async fn connect(&self, request: ConnectRequest<'_>) -> Result<ConnectOutput> {
        // Fail on unknown discovery providers before prompting anyone to log in.
        self.registry.discovery_plugin(request.discovery_provider)?;

        let identity = self
            .authenticate(
                request.identity_provider,
                request.identity_config,
                request.interactive,
            )
            .await?;
        let cluster = self
            .get_cluster(
                request.discovery_provider,
                request.discovery_config,
                &identity,
                request.cluster_id,
            )
            .await?;
        Ok(ConnectOutput { identity, cluster })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;

    fn orchestrator() -> Orchestrator {
        Orchestrator::new(Arc::new(PluginRegistry::builtin().unwrap()))
    }

    #[tokio::test]
    async fn test_unknown_identity_provider_is_not_found() {
        let err = orchestrator()
            .authenticate("saml", &ConfigurationSet::new(), false)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_aad_without_http_client_fails_construction() {
        let orchestrator = orchestrator();
        let config = orchestrator.identity_config("aad", "eks").unwrap();
        let err = orchestrator
            .authenticate("aad", &config, false)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::HttpClientRequired { .. }));
    }

    #[test]
    fn test_config_lookup_by_kind() {
        let orchestrator = orchestrator();
        assert!(orchestrator.discovery_config("eks", "").unwrap().exists("region"));
        assert!(orchestrator.identity_config("eks", "").unwrap_err().is_not_found());
    }
}
