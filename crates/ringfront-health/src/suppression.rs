//! The error-suppression state machine (spec §4.2).
//!
//! A node with more than `error_suppression_limit` errors whose most recent
//! error is within `error_suppression_interval` is suppressed: callers must
//! not route to it. The table is lazily pruned — stale annotations are
//! cleared the next time someone asks about that node, not by a background
//! sweeper.

use ringfront_core::{EventListeners, NodeKey};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use crate::events::HealthEvent;

/// The mutable pair the original attaches to the node record. Held behind a
/// single `Mutex` per node so reads and writes of `(errors, last_error)`
/// never tear.
#[derive(Debug, Default, Clone, Copy)]
struct NodeHealthState {
    errors: u32,
    last_error: Option<Instant>,
}

/// Configuration for the error-suppression window.
#[derive(Debug, Clone, Copy)]
pub struct SuppressionConfig {
    pub error_suppression_limit: u32,
    pub error_suppression_interval: Duration,
}

impl Default for SuppressionConfig {
    fn default() -> Self {
        Self {
            error_suppression_limit: 10,
            error_suppression_interval: Duration::from_secs(60),
        }
    }
}

/// Process-local, best-effort node health side table.
///
/// Keyed by [`NodeKey`] rather than attached to the node value itself, per
/// the design note on separating ring-provided data from process-local
/// annotations.
pub struct NodeHealthTable {
    config: SuppressionConfig,
    states: RwLock<HashMap<NodeKey, Arc<Mutex<NodeHealthState>>>>,
    events: EventListeners<HealthEvent>,
}

impl NodeHealthTable {
    pub fn new(config: SuppressionConfig) -> Self {
        Self {
            config,
            states: RwLock::new(HashMap::new()),
            events: EventListeners::new(),
        }
    }

    /// Registers an event listener for suppression/recovery/error events.
    pub fn with_listener<L>(mut self, listener: L) -> Self
    where
        L: ringfront_core::EventListener<HealthEvent> + 'static,
    {
        self.events.add(listener);
        self
    }

    fn entry(&self, node: &NodeKey) -> Arc<Mutex<NodeHealthState>> {
        if let Some(state) = self.states.read().unwrap().get(node) {
            return Arc::clone(state);
        }
        let mut table = self.states.write().unwrap();
        Arc::clone(
            table
                .entry(node.clone())
                .or_insert_with(|| Arc::new(Mutex::new(NodeHealthState::default()))),
        )
    }

    /// Returns true if `node` is currently suppressed and must not be
    /// yielded to a caller.
    ///
    /// If no entry exists, the node is healthy. If the entry's `last_error`
    /// is older than `error_suppression_interval`, the annotations are
    /// cleared and the node is reported healthy (spec Invariant 2).
    pub fn is_suppressed(&self, node: &NodeKey) -> bool {
        let Some(state) = self.states.read().unwrap().get(node).cloned() else {
            return false;
        };
        let now = Instant::now();
        let mut state = state.lock().unwrap();

        if state.last_error.is_none() && state.errors == 0 {
            return false;
        }

        if let Some(last_error) = state.last_error {
            if now.duration_since(last_error) > self.config.error_suppression_interval {
                state.errors = 0;
                state.last_error = None;
                drop(state);
                self.events.emit(&HealthEvent::Recovered {
                    node: node.clone(),
                    timestamp: now,
                });
                return false;
            }
        }

        state.errors > self.config.error_suppression_limit
    }

    /// Increments the error count and records the failure time, emitting a
    /// structured error event. Absent counts as zero.
    pub fn record_error(&self, node: &NodeKey) {
        let state = self.entry(node);
        let now = Instant::now();
        let (errors, crossed) = {
            let mut state = state.lock().unwrap();
            state.errors += 1;
            state.last_error = Some(now);
            (
                state.errors,
                state.errors == self.config.error_suppression_limit + 1,
            )
        };

        self.events.emit(&HealthEvent::ErrorRecorded {
            node: node.clone(),
            errors,
            timestamp: now,
        });
        if crossed {
            self.events.emit(&HealthEvent::Suppressed {
                node: node.clone(),
                errors,
                forced: false,
                timestamp: now,
            });
        }
        #[cfg(feature = "tracing")]
        tracing::error!(node = %node, errors, "node error recorded");
    }

    /// Immediately suppresses `node` without waiting for the error counter
    /// to climb — use for errors known to be expensive or persistent (e.g.
    /// "Insufficient Storage").
    pub fn force_suppress(&self, node: &NodeKey) {
        let state = self.entry(node);
        let now = Instant::now();
        let errors = {
            let mut state = state.lock().unwrap();
            state.errors = self.config.error_suppression_limit + 1;
            state.last_error = Some(now);
            state.errors
        };

        self.events.emit(&HealthEvent::Suppressed {
            node: node.clone(),
            errors,
            forced: true,
            timestamp: now,
        });
        #[cfg(feature = "tracing")]
        tracing::error!(node = %node, "node force-suppressed");
    }

    /// Alias of [`Self::record_error`] for exception-style call sites that
    /// want a richer log template (server type + extra context).
    pub fn record_exception(&self, node: &NodeKey, server_type: &str, info: &str) {
        self.record_error(node);
        #[cfg(feature = "tracing")]
        tracing::error!(node = %node, server_type, info, "exception talking to node");
        #[cfg(not(feature = "tracing"))]
        let _ = (server_type, info);
    }
}
