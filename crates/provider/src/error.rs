//! Error types for the provider framework.
//!
//! Every variant names the provider, plugin or identifier it concerns and
//! keeps the lower-level cause as its `source`, so callers see both what was
//! being attempted and why it failed.

use kconnect_config::ConfigError;
use thiserror::Error;

use crate::http::HttpError;
use crate::registry::PluginKind;

/// Boxed cause for errors coming from opaque backends (AWS SDK, subprocesses).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for provider operations.
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Errors that can occur while registering, constructing or running providers.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The configuration set could not be resolved into the provider's typed config.
    #[error("resolving {provider} config: {source}")]
    ConfigResolutionFailed {
        provider: String,
        #[source]
        source: ConfigError,
    },

    /// The resolved configuration is structurally invalid.
    #[error("validating {provider} config: invalid {}", fields.join(", "))]
    ConfigInvalid {
        provider: String,
        fields: Vec<String>,
    },

    /// Configuration set error (declaration, population or required-value validation).
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A plugin with this name is already registered for this kind.
    #[error("{kind} plugin '{name}' is already registered")]
    DuplicateName { kind: PluginKind, name: String },

    /// No plugin with this name is registered for this kind.
    #[error("{kind} plugin '{name}' not found")]
    NotFound { kind: PluginKind, name: String },

    /// The cluster identifier does not match the backend's addressing scheme.
    #[error("invalid cluster identifier '{cluster_id}': {reason}")]
    InvalidClusterIdentifier { cluster_id: String, reason: String },

    /// The backend lookup for a cluster failed.
    #[error("getting cluster config for {cluster_id}: {source}")]
    LookupFailed {
        cluster_id: String,
        #[source]
        source: BoxError,
    },

    /// Provider-specific setup from config and identity failed.
    #[error("setting up {provider} provider: {message}")]
    SetupFailed { provider: String, message: String },

    /// Resolving the authority's OAuth endpoints failed.
    #[error("getting endpoints for {authority}: {source}")]
    EndpointDiscoveryFailed {
        authority: String,
        #[source]
        source: HttpError,
    },

    /// Resolving the user realm failed.
    #[error("getting user realm for {username}: {source}")]
    RealmDiscoveryFailed {
        username: String,
        #[source]
        source: HttpError,
    },

    /// Non-interactive login failed and the caller disallowed interaction.
    #[error("{provider}: interactive login required but interaction is disabled ({reason})")]
    InteractiveLoginRequired { provider: String, reason: String },

    /// The interactive login also failed.
    #[error("{provider}: interactive login failed: {reason}")]
    InteractiveLoginFailed { provider: String, reason: String },

    /// The login collaborator or network could not be reached at all.
    #[error("{provider}: transport failure: {source}")]
    TransportFailed {
        provider: String,
        #[source]
        source: BoxError,
    },

    /// The provider needs an HTTP client but none was supplied.
    #[error("{provider}: an HTTP client is required")]
    HttpClientRequired { provider: String },

    /// The acquired credentials carry no expiry time.
    #[error("{provider}: token has no expiry time")]
    MissingExpiry { provider: String },

    /// Credentials could not be obtained from the configured source.
    #[error("{provider}: credentials unavailable: {source}")]
    CredentialsUnavailable {
        provider: String,
        #[source]
        source: BoxError,
    },
}

impl ProviderError {
    /// Errors caused by the caller's configuration rather than a backend.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigResolutionFailed { .. }
                | Self::ConfigInvalid { .. }
                | Self::Config(_)
                | Self::InvalidClusterIdentifier { .. }
                | Self::SetupFailed { .. }
        )
    }

    /// True if retrying with interaction allowed may succeed.
    pub fn requires_interaction(&self) -> bool {
        matches!(self, Self::InteractiveLoginRequired { .. })
    }

    /// True for registry lookups of unknown plugins.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// True for failures reaching a backend (HTTP, subprocess, AWS).
    pub fn is_transport_error(&self) -> bool {
        matches!(
            self,
            Self::EndpointDiscoveryFailed { .. }
                | Self::RealmDiscoveryFailed { .. }
                | Self::TransportFailed { .. }
                | Self::LookupFailed { .. }
        )
    }

    /// True for failures to authenticate once the backend was reached.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Self::InteractiveLoginFailed { .. }
                | Self::MissingExpiry { .. }
                | Self::CredentialsUnavailable { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_invalid_lists_fields() {
        let err = ProviderError::ConfigInvalid {
            provider: "aad".to_string(),
            fields: vec!["tenant-id".to_string(), "client-id".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("tenant-id, client-id"), "got: {}", msg);
        assert!(err.is_config_error());
    }

    #[test]
    fn test_missing_required_value_is_config_error() {
        let err = ProviderError::from(ConfigError::MissingRequiredValue("tenant-id".to_string()));
        assert!(err.is_config_error());
        assert_eq!(err.to_string(), "Missing required value for 'tenant-id'");
    }

    #[test]
    fn test_lookup_failed_preserves_source_message() {
        let err = ProviderError::LookupFailed {
            cluster_id: "arn:aws:eks:eu-west-1:1:cluster/dev".to_string(),
            source: "AccessDeniedException: not authorized".into(),
        };
        assert!(err.to_string().contains("AccessDeniedException"));
        assert!(err.is_transport_error());
    }

    #[test]
    fn test_interaction_predicate() {
        let err = ProviderError::InteractiveLoginRequired {
            provider: "aad".to_string(),
            reason: "no credentials".to_string(),
        };
        assert!(err.requires_interaction());
        assert!(!err.is_auth_error());
    }
}
