//! Shared infrastructure for the ring-front gateway workspace.
//!
//! This crate provides the pieces every other crate in the workspace needs:
//! - An event system for observability (health table, selector, dispatcher
//!   all emit through the same listener contract).
//! - The `Node`/`NodeKey` value types the ring hands out and every side
//!   table keys on.

pub mod events;
pub mod node;

pub use events::{EventListener, EventListeners, FnListener, GatewayEvent};
pub use node::{Node, NodeKey};
