//! User realm discovery.
//!
//! The realm says whether an account is managed by Azure AD or federated to
//! another identity provider. It is derived from the authority's origin, so
//! national clouds and test servers resolve against their own host.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::http::{HttpClient, HttpError, get_json};
use crate::plugins::azure::authority::AuthenticationConfig;

/// Kind of account a username belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum AccountType {
    Managed,
    Federated,
    #[default]
    #[serde(other)]
    Unknown,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Managed => "Managed",
            Self::Federated => "Federated",
            Self::Unknown => "Unknown",
        }
    }
}

/// Realm information for a username.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserRealm {
    #[serde(default)]
    pub account_type: AccountType,
    #[serde(default)]
    pub domain_name: Option<String>,
    #[serde(default)]
    pub federation_protocol: Option<String>,
    #[serde(default)]
    pub federation_metadata_url: Option<String>,
    #[serde(default)]
    pub cloud_instance_name: Option<String>,
}

impl UserRealm {
    /// Realm used when there is no username to look up.
    pub fn unknown() -> Self {
        Self::default()
    }
}

/// Looks up user realms.
#[derive(Debug, Clone)]
pub struct UserRealmClient {
    http: Arc<dyn HttpClient>,
}

impl UserRealmClient {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }

    /// Fetch the realm of `config.username`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidUrl`] when the authority URI cannot carry a
    /// path, and any transport, status or decode error from the request.
    pub async fn get_user_realm(
        &self,
        config: &AuthenticationConfig,
    ) -> Result<UserRealm, HttpError> {
        let url = user_realm_url(&config.authority.authority_uri, &config.username)?;
        debug!(url = %url, "getting user realm");
        get_json(self.http.as_ref(), url.as_str()).await
    }
}

/// `<origin>/common/UserRealm/<username>?api-version=1.0`.
pub fn user_realm_url(authority_uri: &str, username: &str) -> Result<Url, HttpError> {
    let mut url = Url::parse(authority_uri)
        .map_err(|e| HttpError::InvalidUrl(format!("{}: {}", authority_uri, e)))?;
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| HttpError::InvalidUrl(authority_uri.to_string()))?
        .clear()
        .extend(["common", "UserRealm", username]);
    url.query_pairs_mut().append_pair("api-version", "1.0");
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_realm_url() {
        let url = user_realm_url("https://login.microsoftonline.com/contoso/", "jane@contoso.com")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://login.microsoftonline.com/common/UserRealm/jane@contoso.com?api-version=1.0"
        );
    }

    #[test]
    fn test_user_realm_url_rejects_garbage() {
        assert!(matches!(
            user_realm_url("not a url", "jane"),
            Err(HttpError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_realm_deserializes_azure_payload() {
        let body = r#"{"ver":"1.0","account_type":"Federated","domain_name":"contoso.com",
            "federation_protocol":"WSTrust","cloud_instance_name":"microsoftonline.com"}"#;
        let realm: UserRealm = serde_json::from_str(body).unwrap();
        assert_eq!(realm.account_type, AccountType::Federated);
        assert_eq!(realm.federation_protocol.as_deref(), Some("WSTrust"));

        let realm: UserRealm = serde_json::from_str(r#"{"account_type":"Something"}"#).unwrap();
        assert_eq!(realm.account_type, AccountType::Unknown);
    }
}
