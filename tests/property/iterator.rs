//! Property tests for [`ringfront_selector::iter_nodes`] (spec §4.4, §8).

use proptest::prelude::*;
use std::collections::HashSet;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;

use ringfront_core::{EventListeners, Node};
use ringfront_health::{NodeHealthTable, NodeTimingTable, SuppressionConfig};
use ringfront_selector::{iter_nodes, NodeSorter, SelectorEvent, SortingMethod, StaticRing};

fn node(n: u8) -> Node {
    Node::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, n)), 6000, "sda1")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// "For all configurations, iter_nodes yields at most request_node_count
    /// (ring) values."
    #[test]
    fn never_exceeds_budget(
        primary_count in 1usize..=5,
        handoff_count in 0usize..=10,
        budget in 0usize..=20,
    ) {
        let primaries: Vec<Node> = (1..=primary_count as u8).map(node).collect();
        let handoffs: Vec<Node> = (primary_count as u8 + 1..=primary_count as u8 + handoff_count as u8)
            .map(node)
            .collect();
        let ring = StaticRing::new(primaries, handoffs);
        let sorter = NodeSorter::new(SortingMethod::Shuffle);
        let timings = NodeTimingTable::new(Duration::from_secs(300));
        let health = Arc::new(NodeHealthTable::new(SuppressionConfig::default()));

        let mut iter = iter_nodes(
            &ring, 0, &sorter, &timings, health, budget, false,
            EventListeners::<SelectorEvent>::new(), None,
        );
        let mut yielded = 0usize;
        while iter.next().is_some() {
            yielded += 1;
        }
        prop_assert!(yielded <= budget);
    }

    /// "For all ring partitions with k primaries, the first up to k yielded
    /// nodes are drawn from the primary set (after suppression filtering and
    /// sorting)."
    #[test]
    fn healthy_primaries_are_yielded_before_handoffs(
        primary_count in 1usize..=5,
        handoff_count in 0usize..=5,
    ) {
        let primaries: Vec<Node> = (1..=primary_count as u8).map(node).collect();
        let handoffs: Vec<Node> = (100..100 + handoff_count as u8).map(node).collect();
        let ring = StaticRing::new(primaries.clone(), handoffs);
        let sorter = NodeSorter::new(SortingMethod::Shuffle);
        let timings = NodeTimingTable::new(Duration::from_secs(300));
        let health = Arc::new(NodeHealthTable::new(SuppressionConfig::default()));
        let budget = primary_count + handoff_count;

        let primary_keys: HashSet<_> = primaries.iter().map(|n| n.key.clone()).collect();
        let mut iter = iter_nodes(
            &ring, 0, &sorter, &timings, health, budget, false,
            EventListeners::<SelectorEvent>::new(), None,
        );

        let mut count = 0usize;
        let mut first_k_all_primaries = true;
        while let Some(handle) = iter.next() {
            count += 1;
            if count <= primary_count && !primary_keys.contains(&handle.key) {
                first_k_all_primaries = false;
            }
        }
        prop_assert!(first_k_all_primaries);
    }

    /// "request_node_count of 0 yields nothing even if primaries are healthy."
    #[test]
    fn zero_budget_always_yields_nothing(primary_count in 1usize..=5) {
        let primaries: Vec<Node> = (1..=primary_count as u8).map(node).collect();
        let ring = StaticRing::new(primaries, vec![]);
        let sorter = NodeSorter::new(SortingMethod::Shuffle);
        let timings = NodeTimingTable::new(Duration::from_secs(300));
        let health = Arc::new(NodeHealthTable::new(SuppressionConfig::default()));

        let mut iter = iter_nodes(
            &ring, 0, &sorter, &timings, health, 0, false,
            EventListeners::<SelectorEvent>::new(), None,
        );
        prop_assert!(iter.next().is_none());
    }
}
