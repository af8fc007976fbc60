//! The node iterator (spec §4.4): primary-then-handoff traversal, bounded
//! by a per-request yield budget, skipping suppressed nodes.
//!
//! Modeled as a cursor rather than a plain `Iterator`: [`NodeIterator::next`]
//! runs the pre-yield suppression check and returns a [`NodeHandle`] that,
//! on drop, runs the post-yield recheck and conditionally decrements the
//! budget (spec step 4: "a node that became suppressed while the caller was
//! using it does not consume the budget"). Because the handle borrows the
//! iterator, the borrow checker enforces single-consumer, sequential use —
//! a second `next()` call cannot happen while a handle from the first is
//! still alive.

use ringfront_core::{EventListeners, Node};
use ringfront_health::NodeHealthTable;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Instant;

use crate::events::SelectorEvent;

enum Phase {
    Primary,
    Handoff,
}

/// Yields nodes for a ring partition, skipping suppressed nodes, stopping
/// at a configured yield budget.
pub struct NodeIterator {
    primaries: std::vec::IntoIter<Node>,
    handoffs: Box<dyn Iterator<Item = Node> + Send>,
    health: Arc<NodeHealthTable>,
    budget: i64,
    primary_count: usize,
    handoffs_yielded: usize,
    log_handoffs: bool,
    events: EventListeners<SelectorEvent>,
    phase: Phase,
}

impl NodeIterator {
    /// `primaries` must already be sorted by the caller's chosen strategy;
    /// `handoffs` is consumed lazily. `budget` is the per-request yield cap
    /// (spec's `request_node_count`).
    pub fn new(
        primaries: Vec<Node>,
        handoffs: Box<dyn Iterator<Item = Node> + Send>,
        health: Arc<NodeHealthTable>,
        budget: usize,
        log_handoffs: bool,
        events: EventListeners<SelectorEvent>,
    ) -> Self {
        Self {
            primary_count: primaries.len(),
            primaries: primaries.into_iter(),
            handoffs,
            health,
            budget: budget as i64,
            handoffs_yielded: 0,
            log_handoffs,
            events,
            phase: Phase::Primary,
        }
    }

    /// Returns the next non-suppressed node, or `None` if the budget is
    /// exhausted or the handoff source is exhausted.
    pub fn next(&mut self) -> Option<NodeHandle<'_>> {
        if self.budget <= 0 {
            return None;
        }

        loop {
            match self.phase {
                Phase::Primary => match self.primaries.next() {
                    Some(node) => {
                        if self.health.is_suppressed(&node.key) {
                            continue;
                        }
                        return Some(NodeHandle { node, iter: self });
                    }
                    None => self.phase = Phase::Handoff,
                },
                Phase::Handoff => match self.handoffs.next() {
                    Some(node) => {
                        if self.health.is_suppressed(&node.key) {
                            continue;
                        }
                        self.handoffs_yielded += 1;
                        if self.log_handoffs {
                            self.events.emit(&SelectorEvent::HandoffYielded {
                                node: node.key.clone(),
                                handoff_index: self.handoffs_yielded,
                                timestamp: Instant::now(),
                            });
                            #[cfg(feature = "tracing")]
                            tracing::warn!(
                                node = %node.key,
                                handoff_index = self.handoffs_yielded,
                                "handoff requested"
                            );
                            #[cfg(feature = "metrics")]
                            metrics::counter!("ringfront_handoff_count").increment(1);
                            if self.handoffs_yielded == self.primary_count {
                                self.events.emit(&SelectorEvent::AllPrimariesFailed {
                                    primary_count: self.primary_count,
                                    timestamp: Instant::now(),
                                });
                                #[cfg(feature = "metrics")]
                                metrics::counter!("ringfront_handoff_all_count").increment(1);
                            }
                        }
                        return Some(NodeHandle { node, iter: self });
                    }
                    None => return None,
                },
            }
        }
    }
}

/// A node on loan from [`NodeIterator`]. Dropping it performs the post-yield
/// suppression recheck and, if the node is still healthy, decrements the
/// budget.
pub struct NodeHandle<'a> {
    node: Node,
    iter: &'a mut NodeIterator,
}

impl Deref for NodeHandle<'_> {
    type Target = Node;

    fn deref(&self) -> &Node {
        &self.node
    }
}

impl Drop for NodeHandle<'_> {
    fn drop(&mut self) {
        if !self.iter.health.is_suppressed(&self.node.key) {
            self.iter.budget -= 1;
        }
    }
}
