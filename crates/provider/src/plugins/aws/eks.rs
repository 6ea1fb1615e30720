//! EKS discovery provider.
//!
//! Responsibilities:
//! - Declare the `eks` configuration items.
//! - Turn a cluster ARN plus AWS credentials into a [`ClusterConfig`].
//!
//! Does NOT handle:
//! - Acquiring AWS credentials (see the `aws-iam` identity provider).
//! - Listing clusters; lookups are by identifier only.
//!
//! Invariants:
//! - Steps run in order: setup, translate, lookup. A failing step stops the
//!   sequence and no later step runs.
//! - Lookup failures always name the cluster identifier.

use std::sync::Arc;

use async_trait::async_trait;
use aws_credential_types::Credentials as SdkCredentials;
use kconnect_config::{ConfigError, ConfigurationSet};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use crate::discovery::{ClusterConfig, DiscoveryProvider, GetClusterInput, GetClusterOutput};
use crate::error::{BoxError, ProviderError, Result};
use crate::identity::{Credentials, Identity};
use crate::plugins::aws::arn::ClusterArn;
use crate::registry::PluginCreationInput;

pub const PROVIDER_NAME: &str = "eks";

pub const USAGE_EXAMPLE: &str =
    "kconnect use eks --idp-protocol aws-iam --cluster-id arn:aws:eks:us-east-1:123456789012:cluster/dev";

const REGION_ITEM: &str = "region";

/// Configuration items accepted by the `eks` provider.
pub fn config_items(_scope: &str) -> std::result::Result<ConfigurationSet, ConfigError> {
    let mut cs = ConfigurationSet::new();
    cs.string(
        REGION_ITEM,
        "",
        "The AWS region to look up clusters in (defaults to the region in the cluster ARN)",
    )?;
    cs.set_short(REGION_ITEM, 'r')?;
    Ok(cs)
}

/// Factory registered with the plugin registry.
pub fn create(_input: &PluginCreationInput) -> Result<Box<dyn DiscoveryProvider>> {
    Ok(Box::new(EksClusterProvider::new()))
}

/// Parameters for a single `DescribeCluster` call.
#[derive(Debug, Clone)]
pub struct DescribeClusterRequest {
    pub region: String,
    pub name: String,
    pub access_key_id: String,
    pub secret_access_key: SecretString,
    pub session_token: Option<SecretString>,
}

/// Subset of the EKS cluster description kconnect uses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EksCluster {
    pub name: Option<String>,
    pub endpoint: Option<String>,
    pub certificate_authority_data: Option<String>,
    pub version: Option<String>,
    pub status: Option<String>,
}

/// The EKS control-plane call the provider depends on.
#[async_trait]
pub trait EksApi: Send + Sync {
    async fn describe_cluster(
        &self,
        request: &DescribeClusterRequest,
    ) -> std::result::Result<EksCluster, BoxError>;
}

/// [`EksApi`] backed by the AWS SDK.
#[derive(Debug, Clone, Copy, Default)]
pub struct SdkEksApi;

#[async_trait]
impl EksApi for SdkEksApi {
    async fn describe_cluster(
        &self,
        request: &DescribeClusterRequest,
    ) -> std::result::Result<EksCluster, BoxError> {
        let credentials = SdkCredentials::new(
            request.access_key_id.clone(),
            request.secret_access_key.expose_secret().to_string(),
            request
                .session_token
                .as_ref()
                .map(|token| token.expose_secret().to_string()),
            None,
            "kconnect",
        );

        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(request.region.clone()))
            .credentials_provider(credentials)
            .load()
            .await;
        let client = aws_sdk_eks::Client::new(&sdk_config);

        let output = client
            .describe_cluster()
            .name(&request.name)
            .send()
            .await?;
        let cluster = output
            .cluster()
            .ok_or("DescribeCluster returned no cluster")?;

        Ok(EksCluster {
            name: cluster.name().map(str::to_string),
            endpoint: cluster.endpoint().map(str::to_string),
            certificate_authority_data: cluster
                .certificate_authority()
                .and_then(|ca| ca.data())
                .map(str::to_string),
            version: cluster.version().map(str::to_string),
            status: cluster.status().map(|s| s.as_str().to_string()),
        })
    }
}

/// Discovery provider for Amazon EKS clusters.
#[derive(Clone)]
pub struct EksClusterProvider {
    api: Arc<dyn EksApi>,
}

impl Default for EksClusterProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl EksClusterProvider {
    pub fn new() -> Self {
        Self::with_api(Arc::new(SdkEksApi))
    }

    pub fn with_api(api: Arc<dyn EksApi>) -> Self {
        Self { api }
    }

    /// Check the identity carries AWS credentials and read the configured region.
    fn setup(
        &self,
        config: &ConfigurationSet,
        identity: &Identity,
    ) -> Result<(AwsKeys, Option<String>)> {
        let keys = match identity.credentials() {
            Credentials::Aws {
                access_key_id,
                secret_access_key,
                session_token,
            } => AwsKeys {
                access_key_id: access_key_id.clone(),
                secret_access_key: secret_access_key.clone(),
                session_token: session_token.clone(),
            },
            other => {
                return Err(ProviderError::SetupFailed {
                    provider: PROVIDER_NAME.to_string(),
                    message: format!(
                        "identity from '{}' carries {} credentials, AWS credentials are required",
                        identity.provider(),
                        other.kind()
                    ),
                });
            }
        };

        let region = config
            .string_value(REGION_ITEM)
            .map_err(|e| ProviderError::SetupFailed {
                provider: PROVIDER_NAME.to_string(),
                message: e.to_string(),
            })?;

        Ok((keys, region))
    }
}

struct AwsKeys {
    access_key_id: String,
    secret_access_key: SecretString,
    session_token: Option<SecretString>,
}

#[async_trait]
impl DiscoveryProvider for EksClusterProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn get_cluster(&self, input: GetClusterInput<'_>) -> Result<GetClusterOutput> {
        info!(cluster_id = %input.cluster_id, "getting EKS cluster config");

        let (keys, configured_region) = self.setup(input.config, input.identity)?;

        let arn = ClusterArn::parse(input.cluster_id)?;
        let name = arn.require_cluster_name(input.cluster_id)?.to_string();

        let region = configured_region
            .or_else(|| (!arn.region.is_empty()).then(|| arn.region.clone()))
            .ok_or_else(|| ProviderError::SetupFailed {
                provider: PROVIDER_NAME.to_string(),
                message: format!(
                    "no region configured and none in cluster identifier '{}'",
                    input.cluster_id
                ),
            })?;

        debug!(cluster = %name, region = %region, "describing EKS cluster");
        let request = DescribeClusterRequest {
            region: region.clone(),
            name: name.clone(),
            access_key_id: keys.access_key_id,
            secret_access_key: keys.secret_access_key,
            session_token: keys.session_token,
        };

        let cluster = self
            .api
            .describe_cluster(&request)
            .await
            .map_err(|source| ProviderError::LookupFailed {
                cluster_id: input.cluster_id.to_string(),
                source,
            })?;

        let endpoint = cluster.endpoint.ok_or_else(|| ProviderError::LookupFailed {
            cluster_id: input.cluster_id.to_string(),
            source: format!(
                "cluster has no API server endpoint (status {})",
                cluster.status.as_deref().unwrap_or("unknown")
            )
            .into(),
        })?;

        Ok(GetClusterOutput {
            cluster: ClusterConfig {
                id: input.cluster_id.to_string(),
                name: cluster.name.unwrap_or(name),
                endpoint,
                certificate_authority_data: cluster.certificate_authority_data,
                version: cluster.version,
                region: Some(region),
                provider: PROVIDER_NAME.to_string(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_items_declare_region_with_short_alias() {
        let cs = config_items("").unwrap();
        let region = cs.get("region").unwrap();
        assert_eq!(region.short(), Some('r'));
        assert!(!region.is_required());
    }

    #[test]
    fn test_create_does_not_need_collaborators() {
        let provider = create(&PluginCreationInput::default()).unwrap();
        assert_eq!(provider.name(), "eks");
    }
}
