//! AWS IAM identity provider tests.
//!
//! # Invariants
//! - Static keys from configuration bypass the credential chain
//! - Credential chain failures are `CredentialsUnavailable`, never interactive

mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};
use common::*;
use kconnect_provider::plugins::aws::iam::{self, AwsCredentials, AwsIamIdentityProvider};
use secrecy::{ExposeSecret, SecretString};

fn chain_credentials() -> AwsCredentials {
    AwsCredentials {
        access_key_id: "ASIACHAINEXAMPLE".to_string(),
        secret_access_key: SecretString::new("chain-secret".to_string().into()),
        session_token: Some(SecretString::new("chain-session".to_string().into())),
        expires_at: Some(Utc::now() + Duration::minutes(15)),
    }
}

#[tokio::test]
async fn test_static_keys_skip_credential_chain() {
    let source = Arc::new(FakeCredentialSource::returning(chain_credentials()));
    let provider = AwsIamIdentityProvider::with_source(source.clone());
    let mut config = iam::config_items("").unwrap();
    config.set_value_str("access-key-id", "AKIASTATICEXAMPLE").unwrap();
    config.set_value_str("secret-access-key", "static-secret").unwrap();

    let identity = provider
        .authenticate(AuthenticateInput {
            config: &config,
            interactive: false,
        })
        .await
        .unwrap()
        .identity;

    assert!(source.calls().is_empty());
    assert_eq!(identity.metadata_value("credential-source"), Some("static"));
    match identity.credentials() {
        Credentials::Aws {
            access_key_id,
            secret_access_key,
            session_token,
        } => {
            assert_eq!(access_key_id, "AKIASTATICEXAMPLE");
            assert_eq!(secret_access_key.expose_secret(), "static-secret");
            assert!(session_token.is_none());
        }
        other => panic!("expected AWS credentials, got {:?}", other),
    }

    let lifetime = identity.expires_at() - Utc::now();
    assert!(lifetime > Duration::minutes(59) && lifetime <= Duration::hours(1));
}

#[tokio::test]
async fn test_default_chain_receives_profile_and_region() {
    let credentials = chain_credentials();
    let expected_expiry = credentials.expires_at;
    let source = Arc::new(FakeCredentialSource::returning(credentials));
    let provider = AwsIamIdentityProvider::with_source(source.clone());
    let mut config = iam::config_items("").unwrap();
    config.set_value_str("profile", "dev").unwrap();
    config.set_value_str("region", "eu-west-1").unwrap();

    let identity = provider
        .authenticate(AuthenticateInput {
            config: &config,
            interactive: true,
        })
        .await
        .unwrap()
        .identity;

    assert_eq!(
        source.calls(),
        vec![(Some("dev".to_string()), Some("eu-west-1".to_string()))]
    );
    assert_eq!(Some(identity.expires_at()), expected_expiry);
    assert_eq!(identity.metadata_value("credential-source"), Some("default-chain"));
    assert_eq!(identity.metadata_value("profile"), Some("dev"));
    assert!(!identity.interactive_login_required());
}

#[tokio::test]
async fn test_chain_failure_is_credentials_unavailable() {
    let source = Arc::new(FakeCredentialSource::failing("no providers in chain"));
    let provider = AwsIamIdentityProvider::with_source(source);
    let config = iam::config_items("").unwrap();

    let err = provider
        .authenticate(AuthenticateInput {
            config: &config,
            interactive: true,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::CredentialsUnavailable { .. }));
    assert!(err.is_auth_error());
    assert!(!err.requires_interaction());
}

#[tokio::test]
async fn test_lone_secret_is_invalid_config() {
    let source = Arc::new(FakeCredentialSource::returning(chain_credentials()));
    let provider = AwsIamIdentityProvider::with_source(source.clone());
    let mut config = iam::config_items("").unwrap();
    config.set_value_str("secret-access-key", "orphan").unwrap();

    let err = provider
        .authenticate(AuthenticateInput {
            config: &config,
            interactive: false,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::ConfigInvalid { .. }));
    assert!(err.is_config_error());
    assert!(source.calls().is_empty());
}
