//! Property-based tests for configuration set validation.
//!
//! Validation must fail with `MissingRequiredValue` if and only if at least
//! one required item has neither a supplied value nor a default.

use kconnect_config::{ConfigError, ConfigurationSet};
use proptest::prelude::*;

/// One generated item: (required, has_default, has_value).
fn item_strategy() -> impl Strategy<Value = (bool, bool, bool)> {
    (any::<bool>(), any::<bool>(), any::<bool>())
}

proptest! {
    #[test]
    fn validation_fails_iff_required_item_unresolved(
        items in prop::collection::vec(item_strategy(), 0..12)
    ) {
        let mut cs = ConfigurationSet::new();
        let mut first_missing = None;

        for (idx, (required, has_default, has_value)) in items.iter().copied().enumerate() {
            let name = format!("item-{}", idx);
            let default = if has_default { "default" } else { "" };
            cs.string(&name, default, "generated").unwrap();
            if required {
                cs.set_required(&name).unwrap();
            }
            if has_value {
                cs.set_value_str(&name, "supplied").unwrap();
            }
            if required && !has_default && !has_value && first_missing.is_none() {
                first_missing = Some(name);
            }
        }

        match (cs.validate(), first_missing) {
            (Ok(()), None) => {}
            (Err(ConfigError::MissingRequiredValue(name)), Some(expected)) => {
                prop_assert_eq!(name, expected);
            }
            (result, expected) => {
                prop_assert!(false, "unexpected {:?} for expected {:?}", result, expected);
            }
        }
    }
}
