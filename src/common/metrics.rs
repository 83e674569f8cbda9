//! Emitter counters
//!
//! # Design Principles (KISS)
//! - Lock-free atomic counters, updated while the emitter lock is held
//! - Simple snapshot mechanism for reporting
//! - Readers never wait on the emitter lock (a stalled sink cannot block them)

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Counters tracked by `OrderedEmitter`
///
/// All operations use Relaxed ordering. Writers are serialized by the emitter
/// lock; readers see eventually consistent values.
#[derive(Debug, Default)]
pub struct EmitterCounters {
    /// Events accepted by push
    pushed: AtomicU64,
    /// Events emitted because the threshold was reached
    auto_emitted: AtomicU64,
    /// Events emitted by flush
    flushed: AtomicU64,
    /// Completed or aborted flush calls
    flushes: AtomicU64,
    /// Events popped but rejected by a closed sink
    dropped: AtomicU64,
    /// Current buffer occupancy
    buffered: AtomicUsize,
    /// Largest buffer occupancy observed
    high_water: AtomicUsize,
}

impl EmitterCounters {
    /// Create new zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn inc_pushed(&self) {
        self.pushed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_auto_emitted(&self) {
        self.auto_emitted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn add_flushed(&self, n: u64) {
        self.flushed.fetch_add(n, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_flushes(&self) {
        self.flushes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the buffer length after a mutation
    #[inline]
    pub fn set_buffered(&self, len: usize) {
        self.buffered.store(len, Ordering::Relaxed);
        self.high_water.fetch_max(len, Ordering::Relaxed);
    }

    #[inline]
    pub fn buffered(&self) -> usize {
        self.buffered.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all counters
    pub fn snapshot(&self) -> EmitterStats {
        let auto_emitted = self.auto_emitted.load(Ordering::Relaxed);
        let flushed = self.flushed.load(Ordering::Relaxed);
        EmitterStats {
            pushed: self.pushed.load(Ordering::Relaxed),
            emitted: auto_emitted + flushed,
            auto_emitted,
            flushed,
            flushes: self.flushes.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            buffered: self.buffered.load(Ordering::Relaxed),
            high_water: self.high_water.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of emitter counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitterStats {
    pub pushed: u64,
    /// `auto_emitted + flushed`
    pub emitted: u64,
    pub auto_emitted: u64,
    pub flushed: u64,
    pub flushes: u64,
    pub dropped: u64,
    pub buffered: usize,
    pub high_water: usize,
}

impl EmitterStats {
    /// Events pushed but neither emitted nor dropped yet
    pub fn in_flight(&self) -> u64 {
        self.pushed
            .saturating_sub(self.emitted)
            .saturating_sub(self.dropped)
    }
}
