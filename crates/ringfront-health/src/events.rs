//! Events emitted by the node-health table.

use ringfront_core::{GatewayEvent, NodeKey};
use std::time::Instant;

/// Observability events for node error-suppression state transitions.
#[derive(Debug, Clone)]
pub enum HealthEvent {
    /// A node's error count was incremented by [`NodeHealthTable::record_error`].
    ErrorRecorded {
        node: NodeKey,
        errors: u32,
        timestamp: Instant,
    },
    /// A node crossed into suppression (either by accumulating errors past
    /// the limit, or via [`NodeHealthTable::force_suppress`]).
    Suppressed {
        node: NodeKey,
        errors: u32,
        forced: bool,
        timestamp: Instant,
    },
    /// A node's stale annotations were cleared and it is healthy again.
    Recovered { node: NodeKey, timestamp: Instant },
}

impl GatewayEvent for HealthEvent {
    fn event_type(&self) -> &'static str {
        match self {
            HealthEvent::ErrorRecorded { .. } => "node_error_recorded",
            HealthEvent::Suppressed { .. } => "node_suppressed",
            HealthEvent::Recovered { .. } => "node_recovered",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            HealthEvent::ErrorRecorded { timestamp, .. } => *timestamp,
            HealthEvent::Suppressed { timestamp, .. } => *timestamp,
            HealthEvent::Recovered { timestamp, .. } => *timestamp,
        }
    }

    fn source(&self) -> &str {
        match self {
            HealthEvent::ErrorRecorded { node, .. } => node_source(node),
            HealthEvent::Suppressed { node, .. } => node_source(node),
            HealthEvent::Recovered { node, .. } => node_source(node),
        }
    }
}

// NodeKey doesn't carry a persistent String we can borrow for `source()`, so
// each variant keeps its node around and we hand back its device name, which
// is stable for the life of the event.
fn node_source(node: &NodeKey) -> &str {
    &node.device
}
