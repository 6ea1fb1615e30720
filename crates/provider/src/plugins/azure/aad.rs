//! Azure Active Directory identity provider.
//!
//! Responsibilities:
//! - Declare the `aad` configuration items (common identity items plus
//!   tenant, client id and AAD host).
//! - Authenticate a user through the Azure CLI, falling back from a
//!   username/password login to an interactive one.
//!
//! Does NOT handle:
//! - Token refresh; callers authenticate again once the identity expires.
//!
//! Invariants:
//! - Steps run in a fixed order: resolve, validate, discover endpoints,
//!   discover realm, acquire, construct. A failing step stops the sequence.
//! - Interactive login is never attempted when the caller disallows it.
//! - Only a missing or unreachable `az` executable fails the non-interactive
//!   attempt hard; every other failure falls through to the interactive path.
//! - Without a username and password the non-interactive attempt reuses the
//!   cached `az` session.
//! - The password is never logged.

use std::sync::Arc;

use async_trait::async_trait;
use kconnect_config::{ConfigError, ConfigurationSet, add_common_identity_config};
use secrecy::SecretString;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{ProviderError, Result};
use crate::exec::{CommandError, CommandRunner, ProcessRunner};
use crate::http::HttpClient;
use crate::identity::{
    AuthenticateInput, AuthenticateOutput, Credentials, Identity, IdentityProvider,
};
use crate::plugins::azure::authority::{
    AadHost, AuthenticationConfig, AuthorityConfig, DEFAULT_CLIENT_ID, OAuthEndpointsResolver,
};
use crate::plugins::azure::az::{self, AccessToken};
use crate::plugins::azure::realm::{UserRealm, UserRealmClient};
use crate::plugins::secret_string;
use crate::registry::PluginCreationInput;

pub const PROVIDER_NAME: &str = "aad";

pub const USAGE_EXAMPLE: &str =
    "kconnect use eks --idp-protocol aad --tenant-id contoso.onmicrosoft.com --username jane@contoso.com";

pub const TENANT_ID_ITEM: &str = "tenant-id";
pub const CLIENT_ID_ITEM: &str = "client-id";
pub const AAD_HOST_ITEM: &str = "aad-host";

/// Configuration items accepted by the `aad` provider.
pub fn config_items(_scope: &str) -> std::result::Result<ConfigurationSet, ConfigError> {
    let mut cs = ConfigurationSet::new();
    add_common_identity_config(&mut cs)?;

    cs.string(TENANT_ID_ITEM, "", "The azure tenant id")?;
    cs.string(CLIENT_ID_ITEM, DEFAULT_CLIENT_ID, "The azure ad client id")?;
    cs.string(AAD_HOST_ITEM, AadHost::Worldwide.host(), "The AAD host to use")?;

    cs.set_short(TENANT_ID_ITEM, 't')?;
    cs.set_required(TENANT_ID_ITEM)?;
    Ok(cs)
}

/// Factory registered with the plugin registry.
///
/// # Errors
///
/// Returns [`ProviderError::HttpClientRequired`] when no HTTP client is supplied.
pub fn create(input: &PluginCreationInput) -> Result<Box<dyn IdentityProvider>> {
    let http = input
        .http_client
        .clone()
        .ok_or_else(|| ProviderError::HttpClientRequired {
            provider: PROVIDER_NAME.to_string(),
        })?;
    let runner = input
        .command_runner
        .clone()
        .unwrap_or_else(|| Arc::new(ProcessRunner));
    Ok(Box::new(AadIdentityProvider::new(http, runner)))
}

#[derive(Deserialize)]
struct AadConfig {
    #[serde(default)]
    username: String,
    #[serde(default, deserialize_with = "secret_string::deserialize")]
    password: Option<SecretString>,
    #[serde(rename = "tenant-id", default)]
    tenant_id: String,
    #[serde(rename = "client-id", default)]
    client_id: String,
    #[serde(rename = "aad-host", default)]
    aad_host: String,
}

/// Why a non-interactive attempt did not produce a token.
enum AttemptError {
    /// The `az` executable could not be run at all.
    Transport(CommandError),
    /// Anything else; the interactive path may still succeed.
    Failed(String),
}

/// Identity provider for Azure Active Directory.
#[derive(Debug, Clone)]
pub struct AadIdentityProvider {
    http: Arc<dyn HttpClient>,
    runner: Arc<dyn CommandRunner>,
    authority_override: Option<String>,
}

impl AadIdentityProvider {
    pub fn new(http: Arc<dyn HttpClient>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            http,
            runner,
            authority_override: None,
        }
    }

    /// Resolve endpoints and realms against `authority_uri` instead of the
    /// public AAD host.
    pub fn with_authority_uri(mut self, authority_uri: impl Into<String>) -> Self {
        self.authority_override = Some(authority_uri.into());
        self
    }

    fn validate(config: &AadConfig) -> Result<AadHost> {
        let mut invalid = Vec::new();
        if config.tenant_id.trim().is_empty() {
            invalid.push(TENANT_ID_ITEM.to_string());
        }
        if config.client_id.trim().is_empty() {
            invalid.push(CLIENT_ID_ITEM.to_string());
        }
        let host = config.aad_host.parse::<AadHost>();
        if host.is_err() {
            invalid.push(AAD_HOST_ITEM.to_string());
        }

        match host {
            Ok(host) if invalid.is_empty() => Ok(host),
            _ => Err(ProviderError::ConfigInvalid {
                provider: PROVIDER_NAME.to_string(),
                fields: invalid,
            }),
        }
    }

    fn authentication_config(&self, config: AadConfig, host: AadHost) -> AuthenticationConfig {
        let mut authority = AuthorityConfig::new(config.tenant_id.trim(), host);
        if let Some(uri) = &self.authority_override {
            authority = authority.with_authority_uri(uri);
        }
        AuthenticationConfig {
            authority,
            client_id: config.client_id,
            username: config.username,
            password: config.password,
            endpoints: None,
        }
    }

    async fn user_realm(&self, config: &AuthenticationConfig) -> Result<UserRealm> {
        if config.username.is_empty() {
            debug!("no username supplied, skipping user realm discovery");
            return Ok(UserRealm::unknown());
        }
        UserRealmClient::new(self.http.clone())
            .get_user_realm(config)
            .await
            .map_err(|source| ProviderError::RealmDiscoveryFailed {
                username: config.username.clone(),
                source,
            })
    }

    /// Obtain a token, reporting whether the interactive path was needed.
    async fn acquire(
        &self,
        config: &AuthenticationConfig,
        interactive: bool,
    ) -> Result<(AccessToken, bool)> {
        let reason = match self.acquire_non_interactive(config).await {
            Ok(token) => return Ok((token, false)),
            Err(AttemptError::Transport(source)) => {
                return Err(ProviderError::TransportFailed {
                    provider: PROVIDER_NAME.to_string(),
                    source: Box::new(source),
                });
            }
            Err(AttemptError::Failed(reason)) => reason,
        };

        if !interactive {
            return Err(ProviderError::InteractiveLoginRequired {
                provider: PROVIDER_NAME.to_string(),
                reason,
            });
        }

        warn!(reason = %reason, "non-interactive login failed, falling back to interactive login");
        let token = self.acquire_interactive(config).await?;
        Ok((token, true))
    }

    async fn acquire_non_interactive(
        &self,
        config: &AuthenticationConfig,
    ) -> std::result::Result<AccessToken, AttemptError> {
        let Some(password) = config.password.as_ref().filter(|_| !config.username.is_empty())
        else {
            debug!("no username and password supplied, trying cached az session");
            return self
                .fetch_token(&config.authority.tenant)
                .await
                .map_err(|e| match e {
                    FetchError::Command(source) => AttemptError::Transport(source),
                    FetchError::Failed(reason) => AttemptError::Failed(format!(
                        "no username and password supplied and no cached az session: {}",
                        reason
                    )),
                });
        };

        debug!(username = %config.username, "attempting non-interactive az login");
        let login = az::password_login(&config.username, password, &config.authority.tenant);
        let output = self
            .runner
            .run(&login)
            .await
            .map_err(AttemptError::Transport)?;
        if !output.success {
            return Err(AttemptError::Failed(format!(
                "az login {}",
                output.failure_reason()
            )));
        }

        self.fetch_token(&config.authority.tenant)
            .await
            .map_err(|e| match e {
                FetchError::Command(source) => AttemptError::Transport(source),
                FetchError::Failed(reason) => AttemptError::Failed(reason),
            })
    }

    async fn acquire_interactive(&self, config: &AuthenticationConfig) -> Result<AccessToken> {
        info!(tenant = %config.authority.tenant, "starting interactive az login");
        let login = az::interactive_login(&config.authority.tenant);
        let output = self.runner.run(&login).await.map_err(|source| {
            ProviderError::TransportFailed {
                provider: PROVIDER_NAME.to_string(),
                source: Box::new(source),
            }
        })?;
        if !output.success {
            return Err(ProviderError::InteractiveLoginFailed {
                provider: PROVIDER_NAME.to_string(),
                reason: format!("az login {}", output.failure_reason()),
            });
        }

        self.fetch_token(&config.authority.tenant)
            .await
            .map_err(|e| match e {
                FetchError::Command(source) => ProviderError::TransportFailed {
                    provider: PROVIDER_NAME.to_string(),
                    source: Box::new(source),
                },
                FetchError::Failed(reason) => ProviderError::InteractiveLoginFailed {
                    provider: PROVIDER_NAME.to_string(),
                    reason,
                },
            })
    }

    async fn fetch_token(&self, tenant: &str) -> std::result::Result<AccessToken, FetchError> {
        let output = self
            .runner
            .run(&az::get_access_token(tenant))
            .await
            .map_err(FetchError::Command)?;
        if !output.success {
            return Err(FetchError::Failed(format!(
                "az account get-access-token {}",
                output.failure_reason()
            )));
        }
        az::parse_access_token(&output.stdout)
            .map_err(|e| FetchError::Failed(format!("parsing az access token: {}", e)))
    }

    fn build_identity(
        config: &AuthenticationConfig,
        realm: &UserRealm,
        token: AccessToken,
        interactive_login_required: bool,
    ) -> Result<Identity> {
        let mut builder = Identity::builder(
            PROVIDER_NAME,
            Credentials::Bearer {
                access_token: token.access_token,
                refresh_token: None,
                token_type: token.token_type,
            },
        )
        .expires_at(token.expires_at)
        .interactive_login_required(interactive_login_required)
        .metadata(TENANT_ID_ITEM, config.authority.tenant.as_str())
        .metadata(CLIENT_ID_ITEM, config.client_id.as_str())
        .metadata(AAD_HOST_ITEM, config.authority.host.host())
        .metadata("authority-uri", config.authority.authority_uri.as_str())
        .metadata("account-type", realm.account_type.as_str());

        if !config.username.is_empty() {
            builder = builder.metadata("username", config.username.as_str());
        }
        if let Some(endpoints) = &config.endpoints {
            builder = builder.metadata("token-endpoint", endpoints.token_endpoint.as_str());
        }
        if let Some(domain) = &realm.domain_name {
            builder = builder.metadata("domain-name", domain.as_str());
        }

        builder.build()
    }
}

enum FetchError {
    Command(CommandError),
    Failed(String),
}

#[async_trait]
impl IdentityProvider for AadIdentityProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn authenticate(&self, input: AuthenticateInput<'_>) -> Result<AuthenticateOutput> {
        info!(provider = PROVIDER_NAME, "authenticating user");

        let config: AadConfig =
            input
                .config
                .deserialize()
                .map_err(|source| ProviderError::ConfigResolutionFailed {
                    provider: PROVIDER_NAME.to_string(),
                    source,
                })?;
        let host = Self::validate(&config)?;
        let mut auth_config = self.authentication_config(config, host);

        let endpoints = OAuthEndpointsResolver::new(self.http.clone())
            .resolve(&auth_config.authority)
            .await
            .map_err(|source| ProviderError::EndpointDiscoveryFailed {
                authority: auth_config.authority.authority_uri.clone(),
                source,
            })?;
        auth_config.endpoints = Some(endpoints);

        let realm = self.user_realm(&auth_config).await?;
        debug!(account_type = realm.account_type.as_str(), "resolved user realm");

        let (token, interactive_login_required) =
            self.acquire(&auth_config, input.interactive).await?;

        let identity =
            Self::build_identity(&auth_config, &realm, token, interactive_login_required)?;
        Ok(AuthenticateOutput { identity })
    }
}
