//! Node sorting and primary/handoff iteration.
//!
//! This crate turns a ring's raw node placement into the ordered, budgeted
//! stream of candidates a request actually tries: sort the primaries
//! ([`NodeSorter`]), then walk primaries-then-handoffs while skipping
//! suppressed nodes and respecting a yield budget ([`NodeIterator`]).

pub mod events;
pub mod iterator;
pub mod ring;
pub mod select;
pub mod sorter;

pub use events::SelectorEvent;
pub use iterator::{NodeHandle, NodeIterator};
pub use ring::{Ring, StaticRing};
pub use select::{iter_nodes, NodeOverride};
pub use sorter::{AffinityPriority, NodeSorter, SortKey, SortingMethod};
