//! The ring collaborator contract (spec §3, §4.4). Out of scope for this
//! crate's own implementation — consistent-hash placement and ring loading
//! live elsewhere — but the selection pipeline is expressed purely in terms
//! of this trait so it can be exercised without a real ring.

use ringfront_core::Node;

/// Given a partition, yields the ordered primary nodes and a lazy sequence
/// of handoff nodes.
pub trait Ring: Send + Sync {
    /// Number of primary replicas this ring places per partition.
    fn replica_count(&self) -> usize;

    /// The finite, ordered list of primary nodes for `partition`. Length
    /// equals [`Self::replica_count`].
    fn get_part_nodes(&self, partition: u64) -> Vec<Node>;

    /// A lazy, possibly long sequence of handoff nodes for `partition`,
    /// beyond the primaries.
    fn get_more_nodes(&self, partition: u64) -> Box<dyn Iterator<Item = Node> + Send>;
}

/// A fixed-placement in-memory ring, useful for tests and the demo binary.
/// Not a consistent-hash implementation — partitions map to a single static
/// node list regardless of key, which is fine for exercising the selection
/// pipeline but out of scope as a real ring.
pub struct StaticRing {
    replica_count: usize,
    primaries: Vec<Node>,
    handoffs: Vec<Node>,
}

impl StaticRing {
    pub fn new(primaries: Vec<Node>, handoffs: Vec<Node>) -> Self {
        Self {
            replica_count: primaries.len(),
            primaries,
            handoffs,
        }
    }
}

impl Ring for StaticRing {
    fn replica_count(&self) -> usize {
        self.replica_count
    }

    fn get_part_nodes(&self, _partition: u64) -> Vec<Node> {
        self.primaries.clone()
    }

    fn get_more_nodes(&self, _partition: u64) -> Box<dyn Iterator<Item = Node> + Send> {
        Box::new(self.handoffs.clone().into_iter())
    }
}
