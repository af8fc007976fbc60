//! Property tests for [`ringfront_health::NodeHealthTable`] (spec §4.2, §8).

use proptest::prelude::*;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use ringfront_core::NodeKey;
use ringfront_health::{NodeHealthTable, SuppressionConfig};

fn key(n: u32) -> NodeKey {
    NodeKey {
        ip: IpAddr::V4(Ipv4Addr::new(10, 0, ((n >> 8) & 0xff) as u8, (n & 0xff) as u8)),
        port: 6000,
        device: format!("sda{n}"),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// "For all nodes n with errors(n) <= error_suppression_limit,
    /// is_suppressed(n) returns false."
    #[test]
    fn never_suppressed_at_or_under_limit(limit in 0u32..10, errors in 0u32..10) {
        prop_assume!(errors <= limit);
        let table = NodeHealthTable::new(SuppressionConfig {
            error_suppression_limit: limit,
            error_suppression_interval: Duration::from_secs(60),
        });
        let k = key(limit * 100 + errors);
        for _ in 0..errors {
            table.record_error(&k);
        }
        prop_assert!(!table.is_suppressed(&k));
    }

    /// A node with strictly more than the limit's worth of errors, within
    /// the suppression window, is suppressed.
    #[test]
    fn suppressed_once_strictly_over_limit(limit in 0u32..8, extra in 1u32..5) {
        let table = NodeHealthTable::new(SuppressionConfig {
            error_suppression_limit: limit,
            error_suppression_interval: Duration::from_secs(60),
        });
        let k = key(limit * 7 + extra + 10_000);
        for _ in 0..(limit + extra) {
            table.record_error(&k);
        }
        prop_assert!(table.is_suppressed(&k));
    }

    /// "force_suppress(n); is_suppressed(n) -> true immediately (no waiting
    /// for counter accumulation)."
    #[test]
    fn force_suppress_is_always_immediate(seed in 0u32..1000) {
        let table = NodeHealthTable::new(SuppressionConfig::default());
        let k = key(seed);
        table.force_suppress(&k);
        prop_assert!(table.is_suppressed(&k));
    }

    /// "For all nodes n and times t > last_error(n) + error_suppression_interval,
    /// is_suppressed(n) returns false and clears the annotations."
    #[test]
    fn stale_errors_clear_after_interval(seed in 0u32..1000) {
        let table = NodeHealthTable::new(SuppressionConfig {
            error_suppression_limit: 0,
            error_suppression_interval: Duration::from_millis(5),
        });
        let k = key(seed);
        table.force_suppress(&k);
        prop_assert!(table.is_suppressed(&k));
        std::thread::sleep(Duration::from_millis(20));
        prop_assert!(!table.is_suppressed(&k));
        // Cleared, not just momentarily healthy: re-checking stays healthy.
        prop_assert!(!table.is_suppressed(&k));
    }
}
