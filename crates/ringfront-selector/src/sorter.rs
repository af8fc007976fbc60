//! Node sorting strategies (spec §4.3).

use ringfront_core::Node;
use ringfront_health::NodeTimingTable;
use std::sync::Arc;

/// A node's priority under an affinity rule set: lower sorts first.
/// Nodes matched by no rule get [`AffinityPriority::SENTINEL`].
pub type AffinityPriority = i64;

/// Trait for a compiled `read_affinity` sort key. See `ringfront-config`
/// for the DSL this compiles from.
pub trait SortKey: Send + Sync {
    fn priority(&self, node: &Node) -> AffinityPriority;
}

// Blanket impl so a plain closure can serve as a custom affinity key.
impl<F> SortKey for F
where
    F: Fn(&Node) -> AffinityPriority + Send + Sync,
{
    fn priority(&self, node: &Node) -> AffinityPriority {
        self(node)
    }
}

/// Selects how [`crate::NodeSorter`] reorders a candidate node list.
#[derive(Clone)]
pub enum SortingMethod {
    /// Uniform random permutation. The default.
    Shuffle,
    /// Shuffle first, then a stable sort by recent latency (ties and
    /// unmeasured nodes keep the shuffle's order).
    Timing,
    /// Stable sort by a compiled `read_affinity` key.
    Affinity(Arc<dyn SortKey>),
}

impl Default for SortingMethod {
    fn default() -> Self {
        SortingMethod::Shuffle
    }
}

/// Reorders primary node lists before they're offered to [`crate::NodeIterator`].
pub struct NodeSorter {
    method: SortingMethod,
}

impl NodeSorter {
    pub fn new(method: SortingMethod) -> Self {
        Self { method }
    }

    /// Sorts `nodes` in place according to the configured strategy.
    ///
    /// The initial shuffle always runs, even for `Affinity` and `Timing`:
    /// it breaks ties between nodes the subsequent stable sort considers
    /// equal (equal latency, or no affinity match), so equally-ranked nodes
    /// aren't always tried in the same order.
    pub fn sort(&self, nodes: &mut [Node], timings: &NodeTimingTable) {
        use rand::seq::SliceRandom;
        nodes.shuffle(&mut rand::rng());

        match &self.method {
            SortingMethod::Shuffle => {}
            SortingMethod::Timing => {
                nodes.sort_by_key(|n| timings.key(n.key.ip).map(|ms| ms as i64).unwrap_or(-1));
            }
            SortingMethod::Affinity(key) => {
                nodes.sort_by_key(|n| key.priority(n));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};
    use std::time::Duration;

    fn node(n: u8) -> Node {
        Node::new(IpAddr::V4(Ipv4Addr::new(10, 0, 0, n)), 6000, "sda1")
    }

    #[test]
    fn timing_sort_prefers_unmeasured_nodes() {
        let timings = NodeTimingTable::new(Duration::from_secs(300));
        let slow = node(1);
        let unmeasured = node(2);
        timings.record(slow.key.ip, Duration::from_millis(500));

        let sorter = NodeSorter::new(SortingMethod::Timing);
        let mut nodes = vec![slow.clone(), unmeasured.clone()];
        sorter.sort(&mut nodes, &timings);

        assert_eq!(nodes[0].key, unmeasured.key);
        assert_eq!(nodes[1].key, slow.key);
    }

    #[test]
    fn affinity_sort_orders_by_priority() {
        let timings = NodeTimingTable::new(Duration::from_secs(300));
        let near = node(1).with_region(1);
        let far = node(2).with_region(2);

        let key: Arc<dyn SortKey> = Arc::new(|n: &Node| match n.region {
            Some(1) => 0,
            Some(2) => 100,
            _ => i64::MAX,
        });
        let sorter = NodeSorter::new(SortingMethod::Affinity(key));
        let mut nodes = vec![far.clone(), near.clone()];
        sorter.sort(&mut nodes, &timings);

        assert_eq!(nodes[0].key, near.key);
        assert_eq!(nodes[1].key, far.key);
    }

    #[test]
    fn shuffle_preserves_set_membership() {
        let timings = NodeTimingTable::new(Duration::from_secs(300));
        let sorter = NodeSorter::new(SortingMethod::Shuffle);
        let mut nodes = vec![node(1), node(2), node(3)];
        let before: std::collections::HashSet<_> = nodes.iter().map(|n| n.key.clone()).collect();
        sorter.sort(&mut nodes, &timings);
        let after: std::collections::HashSet<_> = nodes.iter().map(|n| n.key.clone()).collect();
        assert_eq!(before, after);
    }
}
