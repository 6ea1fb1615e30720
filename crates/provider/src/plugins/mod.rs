//! Plugins shipped with kconnect.

use std::sync::Arc;

use crate::error::Result;
use crate::registry::{DiscoveryFactory, IdentityFactory, PluginRegistration, PluginRegistry};

pub mod aws;
pub mod azure;

/// Register every builtin discovery and identity plugin.
pub fn register_builtin_plugins(registry: &mut PluginRegistry) -> Result<()> {
    let eks_factory: DiscoveryFactory = Arc::new(aws::eks::create);
    registry.register_discovery_plugin(PluginRegistration::new(
        aws::eks::PROVIDER_NAME,
        aws::eks::USAGE_EXAMPLE,
        aws::eks::config_items,
        eks_factory,
    ))?;

    let aad_factory: IdentityFactory = Arc::new(azure::aad::create);
    registry.register_identity_plugin(PluginRegistration::new(
        azure::aad::PROVIDER_NAME,
        azure::aad::USAGE_EXAMPLE,
        azure::aad::config_items,
        aad_factory,
    ))?;

    let iam_factory: IdentityFactory = Arc::new(aws::iam::create);
    registry.register_identity_plugin(PluginRegistration::new(
        aws::iam::PROVIDER_NAME,
        aws::iam::USAGE_EXAMPLE,
        aws::iam::config_items,
        iam_factory,
    ))?;

    Ok(())
}

/// Serde helper for optional secrets in resolved provider configs.
pub(crate) mod secret_string {
    use secrecy::SecretString;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = Option::<String>::deserialize(deserializer)?;
        Ok(s.filter(|s| !s.is_empty())
            .map(|s| SecretString::new(s.into())))
    }
}
