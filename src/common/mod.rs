//! Common types shared across the crate
//!
//! This module defines the event type used by the bench and tests, the
//! emitter's error type and counters, and the CLI/shutdown helpers.

use std::cmp::Ordering;

pub mod cli;
pub use cli::{BenchArgs, CommonArgs};

pub mod error;
pub use error::{EmitterError, EmitterResult};

pub mod metrics;
pub use metrics::{EmitterCounters, EmitterStats};

pub mod shutdown;
pub use shutdown::{setup_shutdown, shutdown_requested, ShutdownReceiver, ShutdownSender};

/// Single detector hit
///
/// Hits from different modules interleave with some skew, so a merged stream
/// is only locally sorted by `timestamp_ns`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventData {
    /// Hardware module ID (0-255)
    pub module: u8,
    /// Channel within module (0-255)
    pub channel: u8,
    /// Primary energy measurement
    pub energy: u16,
    /// Timestamp in nanoseconds
    pub timestamp_ns: f64,
    /// Producer-assigned sequence number, unique per stream
    pub sequence: u64,
}

impl EventData {
    /// Create a new EventData with all fields
    pub fn new(module: u8, channel: u8, energy: u16, timestamp_ns: f64, sequence: u64) -> Self {
        Self {
            module,
            channel,
            energy,
            timestamp_ns,
            sequence,
        }
    }

    /// Total order: timestamp first (`f64::total_cmp`), then sequence
    pub fn cmp_time(&self, other: &Self) -> Ordering {
        self.timestamp_ns
            .total_cmp(&other.timestamp_ns)
            .then(self.sequence.cmp(&other.sequence))
    }

    /// Comparator for `OrderedEmitter`: earlier timestamp first, ties by sequence
    pub fn timestamp_order(a: &Self, b: &Self) -> bool {
        a.cmp_time(b) == Ordering::Less
    }
}
