//! Property-based tests for the ring-front gateway's core invariants.

pub mod classify;
pub mod health;
pub mod iterator;
