//! Node-timing side table used by the `timing` sorting strategy (spec §4.3).
//!
//! Keyed by IP address only, not the full `(ip, port, device)` identity —
//! this is the original behavior, preserved intentionally. See the Open
//! Question in DESIGN.md: a slow device can pull its healthy siblings down
//! in the timing sort, because they share a timing-table bucket.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::RwLock;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
struct TimingEntry {
    latency_ms: u64,
    expires_at: Instant,
}

/// Records recent per-host response latency for the `timing` sort strategy.
pub struct NodeTimingTable {
    expiry: Duration,
    entries: RwLock<HashMap<IpAddr, TimingEntry>>,
}

impl NodeTimingTable {
    pub fn new(expiry: Duration) -> Self {
        Self {
            expiry,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Records a latency sample, rounded to the millisecond so near-equal
    /// timings tie and the prior shuffle decides their relative order.
    pub fn record(&self, ip: IpAddr, latency: Duration) {
        let latency_ms = latency.as_millis() as u64;
        let expires_at = Instant::now() + self.expiry;
        self.entries
            .write()
            .unwrap()
            .insert(ip, TimingEntry { latency_ms, expires_at });
    }

    /// Returns the sort key for `ip`: its recorded latency in milliseconds
    /// if present and unexpired, or `None` (sorts ahead of any measured
    /// node, giving new/recovered nodes a chance).
    pub fn key(&self, ip: IpAddr) -> Option<u64> {
        let entries = self.entries.read().unwrap();
        let entry = entries.get(&ip)?;
        if entry.expires_at > Instant::now() {
            Some(entry.latency_ms)
        } else {
            None
        }
    }
}
