//! Azure AD authorities and OAuth endpoint discovery.
//!
//! Responsibilities:
//! - Model the national-cloud login hosts ([`AadHost`]).
//! - Build authority URIs and resolve their OpenID configuration.
//!
//! Does NOT handle:
//! - Acquiring tokens (see `az.rs`).
//!
//! Invariants:
//! - Authority URIs always end with `/`.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use secrecy::SecretString;
use serde::Deserialize;
use tracing::debug;

use crate::http::{HttpClient, HttpError, get_json};

/// Client id of the Azure CLI application.
pub const DEFAULT_CLIENT_ID: &str = "04b07795-8ddb-461a-bbee-02f9e1bf7b46";

/// Azure AD login hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AadHost {
    #[default]
    Worldwide,
    China,
    UsGovernment,
    Germany,
}

impl AadHost {
    pub const ALL: [AadHost; 4] = [
        AadHost::Worldwide,
        AadHost::China,
        AadHost::UsGovernment,
        AadHost::Germany,
    ];

    pub fn host(&self) -> &'static str {
        match self {
            Self::Worldwide => "login.microsoftonline.com",
            Self::China => "login.chinacloudapi.cn",
            Self::UsGovernment => "login.microsoftonline.us",
            Self::Germany => "login.microsoftonline.de",
        }
    }
}

impl fmt::Display for AadHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.host())
    }
}

impl FromStr for AadHost {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_end_matches('/');
        Self::ALL
            .into_iter()
            .find(|host| host.host().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown AAD host '{}'", s))
    }
}

/// The authority a user authenticates against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorityConfig {
    pub tenant: String,
    pub host: AadHost,
    pub authority_uri: String,
}

impl AuthorityConfig {
    pub fn new(tenant: &str, host: AadHost) -> Self {
        Self {
            tenant: tenant.to_string(),
            host,
            authority_uri: format!("https://{}/{}/", host.host(), tenant),
        }
    }

    /// Point the authority at a different base, e.g. a test server.
    pub fn with_authority_uri(mut self, authority_uri: &str) -> Self {
        self.authority_uri = if authority_uri.ends_with('/') {
            authority_uri.to_string()
        } else {
            format!("{}/", authority_uri)
        };
        self
    }

    /// URL of the authority's OpenID configuration document.
    pub fn openid_configuration_url(&self) -> String {
        format!("{}v2.0/.well-known/openid-configuration", self.authority_uri)
    }
}

/// OAuth endpoints advertised by an authority.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OAuthEndpoints {
    pub authorization_endpoint: String,
    pub token_endpoint: String,
    #[serde(default)]
    pub device_authorization_endpoint: Option<String>,
    #[serde(default)]
    pub issuer: Option<String>,
}

/// Everything needed to authenticate a user against Azure AD.
#[derive(Debug, Clone)]
pub struct AuthenticationConfig {
    pub authority: AuthorityConfig,
    pub client_id: String,
    pub username: String,
    pub password: Option<SecretString>,
    /// Filled in by endpoint discovery.
    pub endpoints: Option<OAuthEndpoints>,
}

/// Resolves an authority's OAuth endpoints.
#[derive(Debug, Clone)]
pub struct OAuthEndpointsResolver {
    http: Arc<dyn HttpClient>,
}

impl OAuthEndpointsResolver {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }

    pub async fn resolve(&self, authority: &AuthorityConfig) -> Result<OAuthEndpoints, HttpError> {
        let url = authority.openid_configuration_url();
        debug!(url = %url, "resolving OAuth endpoints");
        get_json(self.http.as_ref(), &url).await
    }
}
