//! Environment population for configuration sets.
//!
//! Responsibilities:
//! - Read `KCONNECT_*` style environment variables into declared items.
//! - Load `.env` files, honouring the `DOTENV_DISABLED` gate.
//! - Provide a helper for reading env vars with empty/whitespace filtering.
//!
//! Does NOT handle:
//! - Declaring items (plugins do that through [`ConfigurationSet`]).
//!
//! Invariants:
//! - Values already supplied (e.g. from CLI flags) are never overwritten.
//! - Empty or whitespace-only environment variables are treated as unset.
//! - Returned values are trimmed (leading/trailing whitespace removed).

use tracing::debug;

use crate::constants::{DOTENV_DISABLED_VAR, ENV_PREFIX};
use crate::error::ConfigError;
use crate::set::ConfigurationSet;

/// Read an environment variable, returning None if unset, empty, or whitespace-only.
/// Returns the trimmed value (leading/trailing whitespace removed) if present.
pub fn env_var_or_none(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == s.len() {
            Some(s)
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Environment variable name for an item: `tenant-id` with prefix `KCONNECT`
/// becomes `KCONNECT_TENANT_ID`.
pub fn env_var_name(prefix: &str, item_name: &str) -> String {
    let item = item_name.replace(['-', '.'], "_").to_ascii_uppercase();
    if prefix.is_empty() {
        item
    } else {
        format!("{}_{}", prefix, item)
    }
}

impl ConfigurationSet {
    /// Fill items that have no supplied value from environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the item when a variable
    /// cannot be parsed as the item's type.
    pub fn apply_env(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let pending: Vec<String> = self
            .items()
            .filter(|item| !item.has_value())
            .map(|item| item.name().to_string())
            .collect();

        for name in pending {
            let var = env_var_name(prefix, &name);
            if let Some(raw) = env_var_or_none(&var) {
                debug!(item = %name, var = %var, "applying configuration from environment");
                self.set_value_str(&name, &raw)?;
            }
        }
        Ok(())
    }

    /// Fill items from the default `KCONNECT_` prefix.
    pub fn apply_default_env(&mut self) -> Result<(), ConfigError> {
        self.apply_env(ENV_PREFIX)
    }
}

/// Check whether dotenv loading is disabled via `DOTENV_DISABLED`.
pub fn dotenv_disabled() -> bool {
    env_var_or_none(DOTENV_DISABLED_VAR)
        .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
        .unwrap_or(false)
}

/// Load a `.env` file from the current directory, if present.
///
/// A missing file is not an error.
pub fn load_dotenv() -> Result<(), ConfigError> {
    if dotenv_disabled() {
        return Ok(());
    }

    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(e) if is_not_found(&e) => Ok(()),
        Err(dotenvy::Error::LineParse(_, idx)) => {
            Err(ConfigError::DotenvParse { error_index: idx })
        }
        Err(dotenvy::Error::Io(io_err)) => Err(ConfigError::DotenvIo {
            kind: io_err.kind(),
        }),
        Err(_) => Err(ConfigError::DotenvUnknown),
    }
}

fn is_not_found(err: &dotenvy::Error) -> bool {
    matches!(
        err,
        dotenvy::Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::global_test_lock;
    use serial_test::serial;

    fn sample_set() -> ConfigurationSet {
        let mut cs = ConfigurationSet::new();
        cs.string("tenant-id", "", "The azure tenant id").unwrap();
        cs.bool("interactive", true, "Allow interactive login").unwrap();
        cs
    }

    #[test]
    fn test_env_var_name() {
        assert_eq!(env_var_name("KCONNECT", "tenant-id"), "KCONNECT_TENANT_ID");
        assert_eq!(env_var_name("", "aad-host"), "AAD_HOST");
    }

    #[test]
    #[serial]
    fn test_env_var_or_none_filters_whitespace() {
        let _lock = global_test_lock().lock().unwrap();
        temp_env::with_vars(
            [
                ("KCONNECT_TEST_BLANK", Some("   ")),
                ("KCONNECT_TEST_PADDED", Some("  value ")),
            ],
            || {
                assert_eq!(env_var_or_none("KCONNECT_TEST_BLANK"), None);
                assert_eq!(
                    env_var_or_none("KCONNECT_TEST_PADDED").as_deref(),
                    Some("value")
                );
            },
        );
    }

    #[test]
    #[serial]
    fn test_apply_env_fills_unset_items() {
        let _lock = global_test_lock().lock().unwrap();
        temp_env::with_vars(
            [
                ("KCONNECT_TENANT_ID", Some("contoso")),
                ("KCONNECT_INTERACTIVE", Some("false")),
            ],
            || {
                let mut cs = sample_set();
                cs.apply_default_env().unwrap();
                assert_eq!(
                    cs.string_value("tenant-id").unwrap().as_deref(),
                    Some("contoso")
                );
                assert_eq!(cs.bool_value("interactive").unwrap(), Some(false));
            },
        );
    }

    #[test]
    #[serial]
    fn test_apply_env_never_overrides_supplied_values() {
        let _lock = global_test_lock().lock().unwrap();
        temp_env::with_var("KCONNECT_TENANT_ID", Some("from-env"), || {
            let mut cs = sample_set();
            cs.set_value_str("tenant-id", "from-flag").unwrap();
            cs.apply_default_env().unwrap();
            assert_eq!(
                cs.string_value("tenant-id").unwrap().as_deref(),
                Some("from-flag")
            );
        });
    }

    #[test]
    #[serial]
    fn test_apply_env_invalid_value_names_item() {
        let _lock = global_test_lock().lock().unwrap();
        temp_env::with_var("KCONNECT_INTERACTIVE", Some("sometimes"), || {
            let mut cs = sample_set();
            let err = cs.apply_default_env().unwrap_err();
            assert_eq!(err.item_name(), Some("interactive"));
        });
    }

    #[test]
    #[serial]
    fn test_dotenv_disabled_gate() {
        let _lock = global_test_lock().lock().unwrap();
        temp_env::with_var(DOTENV_DISABLED_VAR, Some("1"), || {
            assert!(dotenv_disabled());
            load_dotenv().unwrap();
        });
        temp_env::with_var(DOTENV_DISABLED_VAR, Some("false"), || {
            assert!(!dotenv_disabled());
        });
        temp_env::with_var(DOTENV_DISABLED_VAR, None::<&str>, || {
            assert!(!dotenv_disabled());
        });
    }
}
