//! Events emitted by [`crate::NodeIterator`].

use ringfront_core::{GatewayEvent, NodeKey};
use std::time::Instant;

#[derive(Debug, Clone)]
pub enum SelectorEvent {
    /// A handoff node was yielded because a primary was unavailable or
    /// suppressed.
    HandoffYielded {
        node: NodeKey,
        handoff_index: usize,
        timestamp: Instant,
    },
    /// Every primary for this partition was skipped or suppressed — the
    /// request is now served entirely from handoffs.
    AllPrimariesFailed {
        primary_count: usize,
        timestamp: Instant,
    },
}

impl GatewayEvent for SelectorEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SelectorEvent::HandoffYielded { .. } => "handoff_yielded",
            SelectorEvent::AllPrimariesFailed { .. } => "handoff_all",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            SelectorEvent::HandoffYielded { timestamp, .. } => *timestamp,
            SelectorEvent::AllPrimariesFailed { timestamp, .. } => *timestamp,
        }
    }

    fn source(&self) -> &str {
        match self {
            SelectorEvent::HandoffYielded { node, .. } => &node.device,
            SelectorEvent::AllPrimariesFailed { .. } => "iter_nodes",
        }
    }
}
