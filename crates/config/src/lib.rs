//! Configuration sets for kconnect plugins.
//!
//! This crate provides the typed, validated option bag that discovery and
//! identity plugins declare, and the helpers that populate it from the
//! environment and `.env` files.

pub mod constants;
mod env;
mod error;
mod item;
mod set;

pub use env::{dotenv_disabled, env_var_name, env_var_or_none, load_dotenv};
pub use error::ConfigError;
pub use item::{ConfigItemType, ConfigValue, ConfigurationItem};
pub use set::ConfigurationSet;

/// The identity items every identity provider shares.
pub fn common_identity_config() -> Result<ConfigurationSet, ConfigError> {
    let mut cs = ConfigurationSet::new();
    cs.string(constants::USERNAME_CONFIG_ITEM, "", "The username to authenticate with")?;
    cs.string(constants::PASSWORD_CONFIG_ITEM, "", "The password to authenticate with")?;
    cs.set_short(constants::USERNAME_CONFIG_ITEM, 'u')?;
    cs.set_short(constants::PASSWORD_CONFIG_ITEM, 'p')?;
    cs.set_sensitive(constants::PASSWORD_CONFIG_ITEM)?;
    Ok(cs)
}

/// Merge the shared identity items into `cs`.
pub fn add_common_identity_config(cs: &mut ConfigurationSet) -> Result<(), ConfigError> {
    cs.extend(common_identity_config()?)
}

#[cfg(test)]
pub(crate) mod test_util {
    use std::sync::{Mutex, OnceLock};

    pub fn global_test_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }
}
