//! Property tests for [`ringfront_dispatch::classify`] (spec §4.1, §8).

use proptest::prelude::*;
use ringfront_dispatch::{classify, ResourceKind};

fn segment() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_-]{1,12}".prop_filter("must not collide with the reserved /info path", |s| s != "info")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// "Classifying /v1/a/c/o and then reconstructing the path from the key
    /// record yields the same string."
    #[test]
    fn object_path_round_trips(
        version in segment(),
        account in segment(),
        container in segment(),
        object in segment(),
    ) {
        let path = format!("/{version}/{account}/{container}/{object}");
        let c = classify(&path).unwrap();
        prop_assert_eq!(c.kind, ResourceKind::Object);
        prop_assert_eq!(c.key.to_path(), path);
    }

    /// "Path with exactly one non-empty segment after version classifies as
    /// Account."
    #[test]
    fn account_only_path_classifies_as_account(version in segment(), account in segment()) {
        let path = format!("/{version}/{account}");
        let c = classify(&path).unwrap();
        prop_assert_eq!(c.kind, ResourceKind::Account);
        prop_assert_eq!(c.key.to_path(), path);
    }

    /// Container paths (version, account, container; no object) classify as
    /// Container and round-trip the same way.
    #[test]
    fn container_path_round_trips(
        version in segment(),
        account in segment(),
        container in segment(),
    ) {
        let path = format!("/{version}/{account}/{container}");
        let c = classify(&path).unwrap();
        prop_assert_eq!(c.kind, ResourceKind::Container);
        prop_assert_eq!(c.key.to_path(), path);
    }
}
