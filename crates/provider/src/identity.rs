//! Identities and the identity-provider contract.
//!
//! Responsibilities:
//! - Define [`Identity`], the authenticated principal handed to discovery.
//! - Define the [`IdentityProvider`] trait every identity plugin implements.
//!
//! Does NOT handle:
//! - Acquiring credentials (see the plugins under `plugins/`).
//! - Persisting identities between runs.
//!
//! Invariants:
//! - An `Identity` always has an expiry; [`IdentityBuilder::build`] refuses
//!   to construct one without it.
//! - Secret material is held as `SecretString` and never appears in `Debug`
//!   or in [`IdentitySummary`].

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use kconnect_config::ConfigurationSet;
use secrecy::SecretString;
use serde::Serialize;

use crate::error::{ProviderError, Result};

/// Credential material carried by an identity.
#[derive(Clone)]
pub enum Credentials {
    /// OAuth-style bearer token.
    Bearer {
        access_token: SecretString,
        refresh_token: Option<SecretString>,
        token_type: String,
    },
    /// AWS access key credentials.
    Aws {
        access_key_id: String,
        secret_access_key: SecretString,
        session_token: Option<SecretString>,
    },
}

impl Credentials {
    /// Short name of the credential kind, used in summaries and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bearer { .. } => "bearer",
            Self::Aws { .. } => "aws",
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bearer { token_type, .. } => f
                .debug_struct("Bearer")
                .field("token_type", token_type)
                .field("access_token", &"[REDACTED]")
                .finish(),
            Self::Aws { access_key_id, .. } => f
                .debug_struct("Aws")
                .field("access_key_id", access_key_id)
                .field("secret_access_key", &"[REDACTED]")
                .finish(),
        }
    }
}

/// An authenticated principal produced by an identity provider.
#[derive(Debug, Clone)]
pub struct Identity {
    provider: String,
    credentials: Credentials,
    expires_at: DateTime<Utc>,
    interactive_login_required: bool,
    metadata: BTreeMap<String, String>,
}

impl Identity {
    pub fn builder(provider: impl Into<String>, credentials: Credentials) -> IdentityBuilder {
        IdentityBuilder {
            provider: provider.into(),
            credentials,
            expires_at: None,
            interactive_login_required: false,
            metadata: BTreeMap::new(),
        }
    }

    /// Name of the identity provider that produced this identity.
    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// True when the identity was only obtained through the interactive fallback.
    pub fn interactive_login_required(&self) -> bool {
        self.interactive_login_required
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    pub fn metadata_value(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    pub fn is_expired(&self) -> bool {
        self.expires_within(Duration::zero())
    }

    /// True if the identity expires within `buffer` from now.
    pub fn expires_within(&self, buffer: Duration) -> bool {
        Utc::now() + buffer >= self.expires_at
    }

    /// A secret-free view suitable for printing.
    pub fn summary(&self) -> IdentitySummary {
        IdentitySummary {
            provider: self.provider.clone(),
            credential_kind: self.credentials.kind().to_string(),
            expires_at: self.expires_at,
            interactive_login_required: self.interactive_login_required,
            metadata: self.metadata.clone(),
        }
    }
}

/// Builder for [`Identity`].
#[derive(Debug)]
pub struct IdentityBuilder {
    provider: String,
    credentials: Credentials,
    expires_at: Option<DateTime<Utc>>,
    interactive_login_required: bool,
    metadata: BTreeMap<String, String>,
}

impl IdentityBuilder {
    pub fn expires_at(mut self, expires_at: Option<DateTime<Utc>>) -> Self {
        self.expires_at = expires_at;
        self
    }

    pub fn interactive_login_required(mut self, required: bool) -> Self {
        self.interactive_login_required = required;
        self
    }

    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Finish the identity.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::MissingExpiry`] when no expiry was set.
    pub fn build(self) -> Result<Identity> {
        let expires_at = self.expires_at.ok_or_else(|| ProviderError::MissingExpiry {
            provider: self.provider.clone(),
        })?;
        Ok(Identity {
            provider: self.provider,
            credentials: self.credentials,
            expires_at,
            interactive_login_required: self.interactive_login_required,
            metadata: self.metadata,
        })
    }
}

/// Printable, secret-free view of an [`Identity`].
#[derive(Debug, Clone, Serialize)]
pub struct IdentitySummary {
    pub provider: String,
    pub credential_kind: String,
    pub expires_at: DateTime<Utc>,
    pub interactive_login_required: bool,
    pub metadata: BTreeMap<String, String>,
}

/// Input to [`IdentityProvider::authenticate`].
#[derive(Debug, Clone, Copy)]
pub struct AuthenticateInput<'a> {
    pub config: &'a ConfigurationSet,
    /// Whether the provider may fall back to an interactive login.
    pub interactive: bool,
}

/// Output of [`IdentityProvider::authenticate`].
#[derive(Debug, Clone)]
pub struct AuthenticateOutput {
    pub identity: Identity,
}

/// A plugin that turns configuration into an authenticated [`Identity`].
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Registered name of this provider.
    fn name(&self) -> &str;

    async fn authenticate(&self, input: AuthenticateInput<'_>) -> Result<AuthenticateOutput>;
}
