//! Property-based tests for cluster identifier translation.
//!
//! # Invariants
//! - A resource with exactly two `/`-separated parts translates to the second
//!   part, even when it is empty
//! - Any other part count is rejected as an invalid identifier

use kconnect_provider::ProviderError;
use kconnect_provider::plugins::aws::arn::{ClusterArn, cluster_name_from_id};
use proptest::prelude::*;

fn segment() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9][a-zA-Z0-9-]{0,20}"
}

fn name_segment() -> impl Strategy<Value = String> {
    "([a-zA-Z0-9][a-zA-Z0-9-]{0,20})?"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn two_part_resources_translate_to_second_part(
        with_prefix in any::<bool>(),
        region in "[a-z]{2}-[a-z]{4,9}-[1-3]",
        account in "[0-9]{12}",
        kind in segment(),
        name in name_segment(),
    ) {
        let prefix = if with_prefix { "arn:" } else { "" };
        let id = format!("{prefix}aws:eks:{region}:{account}:{kind}/{name}");

        prop_assert_eq!(cluster_name_from_id(&id).unwrap(), name);

        let arn = ClusterArn::parse(&id).unwrap();
        prop_assert_eq!(arn.region, region);
        prop_assert_eq!(arn.account_id, account);
    }

    #[test]
    fn other_part_counts_are_rejected(
        parts in prop::collection::vec(segment(), 1..6usize)
            .prop_filter("exactly two parts translate", |p| p.len() != 2),
    ) {
        let id = format!("aws:eks:us-east-1:123456789012:{}", parts.join("/"));
        let result = cluster_name_from_id(&id);
        let is_invalid = matches!(result, Err(ProviderError::InvalidClusterIdentifier { .. }));
        prop_assert!(is_invalid, "{} should be invalid", id);
    }
}
