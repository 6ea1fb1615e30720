//! AWS IAM identity provider.
//!
//! Produces an [`Identity`] carrying AWS access-key credentials, either from
//! keys supplied in configuration or from the AWS default credential chain
//! (environment, shared profile, SSO, IMDS).
//!
//! Invariants:
//! - An access key id is never accepted without its secret, and vice versa.
//! - There is no interactive path; chain failures are `CredentialsUnavailable`
//!   regardless of whether interaction is allowed.

use std::sync::Arc;

use async_trait::async_trait;
use aws_credential_types::provider::ProvideCredentials;
use chrono::{DateTime, Duration, Utc};
use kconnect_config::constants::DEFAULT_CREDENTIAL_LIFETIME_SECS;
use kconnect_config::{ConfigError, ConfigurationSet};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::{BoxError, ProviderError, Result};
use crate::identity::{
    AuthenticateInput, AuthenticateOutput, Credentials, Identity, IdentityProvider,
};
use crate::plugins::secret_string;
use crate::registry::PluginCreationInput;

pub const PROVIDER_NAME: &str = "aws-iam";

pub const USAGE_EXAMPLE: &str =
    "kconnect use eks --idp-protocol aws-iam --profile dev --cluster-id arn:aws:eks:us-east-1:123456789012:cluster/dev";

/// Configuration items accepted by the `aws-iam` provider.
pub fn config_items(_scope: &str) -> std::result::Result<ConfigurationSet, ConfigError> {
    let mut cs = ConfigurationSet::new();
    cs.string("profile", "", "The AWS shared config profile to use")?;
    cs.string("region", "", "The AWS region used when resolving credentials")?;
    cs.string("access-key-id", "", "A static AWS access key id")?;
    cs.string("secret-access-key", "", "The secret for the static access key")?;
    cs.string("session-token", "", "An optional session token for the static access key")?;
    cs.int(
        "credential-lifetime",
        DEFAULT_CREDENTIAL_LIFETIME_SECS,
        "Seconds to treat credentials without an expiry as valid",
    )?;
    cs.set_sensitive("secret-access-key")?;
    cs.set_sensitive("session-token")?;
    Ok(cs)
}

/// Factory registered with the plugin registry.
pub fn create(_input: &PluginCreationInput) -> Result<Box<dyn IdentityProvider>> {
    Ok(Box::new(AwsIamIdentityProvider::new()))
}

/// Credentials returned by an [`AwsCredentialSource`].
#[derive(Clone)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: SecretString,
    pub session_token: Option<SecretString>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Source of AWS credentials when none are configured explicitly.
#[async_trait]
pub trait AwsCredentialSource: Send + Sync {
    async fn load(
        &self,
        profile: Option<&str>,
        region: Option<&str>,
    ) -> std::result::Result<AwsCredentials, BoxError>;
}

/// [`AwsCredentialSource`] backed by the `aws-config` default chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultChainCredentialSource;

#[async_trait]
impl AwsCredentialSource for DefaultChainCredentialSource {
    async fn load(
        &self,
        profile: Option<&str>,
        region: Option<&str>,
    ) -> std::result::Result<AwsCredentials, BoxError> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region.to_string()));
        }
        let sdk_config = loader.load().await;

        let provider = sdk_config
            .credentials_provider()
            .ok_or("no AWS credentials provider is configured")?;
        let credentials = provider.provide_credentials().await?;

        Ok(AwsCredentials {
            access_key_id: credentials.access_key_id().to_string(),
            secret_access_key: SecretString::new(credentials.secret_access_key().into()),
            session_token: credentials
                .session_token()
                .map(|token| SecretString::new(token.into())),
            expires_at: credentials.expiry().map(DateTime::<Utc>::from),
        })
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct AwsIamConfig {
    #[serde(default)]
    profile: String,
    #[serde(default)]
    region: String,
    #[serde(default)]
    access_key_id: String,
    #[serde(default, deserialize_with = "secret_string::deserialize")]
    secret_access_key: Option<SecretString>,
    #[serde(default, deserialize_with = "secret_string::deserialize")]
    session_token: Option<SecretString>,
    #[serde(default = "default_lifetime")]
    credential_lifetime: i64,
}

fn default_lifetime() -> i64 {
    DEFAULT_CREDENTIAL_LIFETIME_SECS
}

fn non_empty(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

/// Identity provider for AWS IAM credentials.
#[derive(Clone)]
pub struct AwsIamIdentityProvider {
    source: Arc<dyn AwsCredentialSource>,
}

impl Default for AwsIamIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl AwsIamIdentityProvider {
    pub fn new() -> Self {
        Self::with_source(Arc::new(DefaultChainCredentialSource))
    }

    pub fn with_source(source: Arc<dyn AwsCredentialSource>) -> Self {
        Self { source }
    }

    fn validate(config: &AwsIamConfig) -> Result<()> {
        let mut invalid = Vec::new();

        let has_key = !config.access_key_id.is_empty();
        let has_secret = config
            .secret_access_key
            .as_ref()
            .is_some_and(|s| !s.expose_secret().is_empty());
        if has_key != has_secret {
            invalid.push("access-key-id".to_string());
            invalid.push("secret-access-key".to_string());
        }
        if config.credential_lifetime <= 0 {
            invalid.push("credential-lifetime".to_string());
        }

        if invalid.is_empty() {
            Ok(())
        } else {
            Err(ProviderError::ConfigInvalid {
                provider: PROVIDER_NAME.to_string(),
                fields: invalid,
            })
        }
    }

    async fn acquire(&self, config: &AwsIamConfig) -> Result<(AwsCredentials, &'static str)> {
        if let Some(secret) = config.secret_access_key.as_ref()
            && !config.access_key_id.is_empty()
        {
            debug!("using static AWS access key from configuration");
            let credentials = AwsCredentials {
                access_key_id: config.access_key_id.clone(),
                secret_access_key: secret.clone(),
                session_token: config
                    .session_token
                    .clone()
                    .filter(|t| !t.expose_secret().is_empty()),
                expires_at: None,
            };
            return Ok((credentials, "static"));
        }

        debug!(profile = %config.profile, "loading AWS credentials from default chain");
        let credentials = self
            .source
            .load(non_empty(&config.profile), non_empty(&config.region))
            .await
            .map_err(|source| ProviderError::CredentialsUnavailable {
                provider: PROVIDER_NAME.to_string(),
                source,
            })?;
        Ok((credentials, "default-chain"))
    }
}

#[async_trait]
impl IdentityProvider for AwsIamIdentityProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn authenticate(&self, input: AuthenticateInput<'_>) -> Result<AuthenticateOutput> {
        info!(provider = PROVIDER_NAME, "authenticating with AWS IAM");

        let config: AwsIamConfig =
            input
                .config
                .deserialize()
                .map_err(|source| ProviderError::ConfigResolutionFailed {
                    provider: PROVIDER_NAME.to_string(),
                    source,
                })?;
        Self::validate(&config)?;

        let (credentials, source) = self.acquire(&config).await?;
        let expires_at = credentials
            .expires_at
            .unwrap_or_else(|| Utc::now() + Duration::seconds(config.credential_lifetime));

        let mut builder = Identity::builder(
            PROVIDER_NAME,
            Credentials::Aws {
                access_key_id: credentials.access_key_id,
                secret_access_key: credentials.secret_access_key,
                session_token: credentials.session_token,
            },
        )
        .expires_at(Some(expires_at))
        .metadata("credential-source", source);
        if let Some(profile) = non_empty(&config.profile) {
            builder = builder.metadata("profile", profile);
        }
        if let Some(region) = non_empty(&config.region) {
            builder = builder.metadata("region", region);
        }

        Ok(AuthenticateOutput {
            identity: builder.build()?,
        })
    }
}
