//! `iter_nodes` (spec §4.4): the single entry point a controller calls to
//! get a budgeted, health-filtered, ordered stream of candidate nodes for a
//! partition.
//!
//! This ties together the pieces the rest of the crate exposes separately
//! (sorting, the health table, the cursor iterator) into the shape spec.md
//! names directly, including the `override_iter` escape hatch controllers
//! use in tests to replace the ring's own placement.

use std::sync::Arc;

use ringfront_core::{EventListeners, Node};
use ringfront_health::{NodeHealthTable, NodeTimingTable};

use crate::events::SelectorEvent;
use crate::iterator::NodeIterator;
use crate::ring::Ring;
use crate::sorter::NodeSorter;

/// Replaces both of the ring's own node sources. The first `replica_count`
/// items are treated as primaries, the remainder as handoffs, per spec
/// §4.4's `override_iter` parameter.
pub struct NodeOverride {
    pub nodes: Box<dyn Iterator<Item = Node> + Send>,
}

impl NodeOverride {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self {
            nodes: Box::new(nodes.into_iter()),
        }
    }

    pub fn from_iter(nodes: Box<dyn Iterator<Item = Node> + Send>) -> Self {
        Self { nodes }
    }
}

/// Builds the node-selection pipeline for one request: materialize and sort
/// primaries, leave handoffs lazy, wrap both in a budgeted, suppression
/// filtering [`NodeIterator`].
///
/// `budget` is the caller's already-evaluated `request_node_count` (or
/// `write_affinity_node_count`) — evaluating the DSL against
/// `ring.replica_count()` is the caller's job, since that expression lives
/// in `ringfront-config`, which this crate does not depend on.
#[allow(clippy::too_many_arguments)]
pub fn iter_nodes(
    ring: &dyn Ring,
    partition: u64,
    sorter: &NodeSorter,
    timings: &NodeTimingTable,
    health: Arc<NodeHealthTable>,
    budget: usize,
    log_handoffs: bool,
    events: EventListeners<SelectorEvent>,
    override_iter: Option<NodeOverride>,
) -> NodeIterator {
    let replica_count = ring.replica_count();

    let (mut primaries, handoffs): (Vec<Node>, Box<dyn Iterator<Item = Node> + Send>) =
        match override_iter {
            Some(NodeOverride { nodes }) => {
                let mut nodes = nodes;
                let primaries: Vec<Node> = (&mut nodes).take(replica_count).collect();
                (primaries, nodes)
            }
            None => (ring.get_part_nodes(partition), ring.get_more_nodes(partition)),
        };

    sorter.sort(&mut primaries, timings);

    NodeIterator::new(primaries, handoffs, health, budget, log_handoffs, events)
}
