//! Cluster configuration and the discovery-provider contract.

use async_trait::async_trait;
use kconnect_config::ConfigurationSet;
use serde::Serialize;

use crate::error::Result;
use crate::identity::Identity;

/// Connection details for a single Kubernetes cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterConfig {
    /// Backend-specific cluster identifier (e.g. an EKS ARN).
    pub id: String,
    pub name: String,
    /// API server URL.
    pub endpoint: String,
    /// Base64-encoded certificate authority bundle.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_authority_data: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Discovery provider that produced this config.
    pub provider: String,
}

/// Input to [`DiscoveryProvider::get_cluster`].
#[derive(Debug, Clone, Copy)]
pub struct GetClusterInput<'a> {
    pub config: &'a ConfigurationSet,
    pub identity: &'a Identity,
    pub cluster_id: &'a str,
}

#[derive(Debug, Clone)]
pub struct GetClusterOutput {
    pub cluster: ClusterConfig,
}

/// A plugin that looks up clusters in a hosting backend.
#[async_trait]
pub trait DiscoveryProvider: Send + Sync {
    /// Registered name of this provider.
    fn name(&self) -> &str;

    /// Look up a single cluster by its backend identifier.
    async fn get_cluster(&self, input: GetClusterInput<'_>) -> Result<GetClusterOutput>;
}
