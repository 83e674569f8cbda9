//! OrderedEmitter - reorders a bounded window of out-of-order events
//!
//! Architecture:
//! - Events are buffered in a binary min-heap keyed by a caller comparator
//! - When the buffer reaches `emit_threshold`, each push releases the minimum
//! - `flush` drains the rest in order
//! - One lock serializes buffer mutation AND emission to the sink
//!
//! Use case: a stream whose events are out of order only within a bounded
//! window (e.g. hits from several digitizer modules, each locally sorted,
//! interleaved with some skew). With a threshold at least as large as the
//! window, everything leaves in order without knowing where windows start.
//!
//! # Emission happens under the lock
//! The sink is written while the buffer lock is held. A full bounded sink
//! therefore stalls every `push`/`flush` caller, not just the one that
//! triggered the emission. In exchange, the emitted sequence is globally
//! consistent with heap order at every emission point. Releasing the lock
//! before emitting would let two pushers race to the sink with their minima
//! and break that ordering.

pub mod comparator;
pub mod heap;
pub mod sink;

pub use comparator::{by_cmp, by_key, natural_order, reverse, Comparator};
pub use heap::EventHeap;
pub use sink::{CollectingSink, EventSink, SinkError};

use std::fmt;

use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::common::{EmitterCounters, EmitterError, EmitterResult, EmitterStats};

/// Initial heap allocation when none is configured
pub const DEFAULT_INITIAL_CAPACITY: usize = 10;

/// Emitter configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmitterConfig {
    /// Buffer occupancy at which a push emits the minimum
    pub emit_threshold: usize,
    /// Initial heap allocation (capped at `emit_threshold`)
    pub initial_capacity: usize,
}

impl EmitterConfig {
    pub fn new(emit_threshold: usize) -> Self {
        Self {
            emit_threshold,
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
        }
    }

    /// Check construction preconditions
    pub fn validate(&self) -> EmitterResult<()> {
        if self.emit_threshold == 0 {
            return Err(EmitterError::InvalidThreshold);
        }
        Ok(())
    }
}

struct Inner<T, S, C> {
    heap: EventHeap<T, C>,
    sink: S,
}

/// Threshold-triggered reordering buffer
///
/// Share between threads with `Arc`. All methods take `&self`.
pub struct OrderedEmitter<T, S, C> {
    threshold: usize,
    inner: Mutex<Inner<T, S, C>>,
    counters: EmitterCounters,
}

impl<T, S, C> OrderedEmitter<T, S, C>
where
    S: EventSink<T>,
    C: Comparator<T>,
{
    /// Create an emitter that starts emitting once `threshold` events are buffered
    ///
    /// Returns `EmitterError::InvalidThreshold` when `threshold` is zero.
    pub fn new(threshold: usize, sink: S, comparator: C) -> EmitterResult<Self> {
        Self::with_config(EmitterConfig::new(threshold), sink, comparator)
    }

    /// Create an emitter from a full configuration
    pub fn with_config(config: EmitterConfig, sink: S, comparator: C) -> EmitterResult<Self> {
        config.validate()?;
        let capacity = config.initial_capacity.min(config.emit_threshold);
        debug!(
            threshold = config.emit_threshold,
            capacity, "Ordered emitter created"
        );
        Ok(Self {
            threshold: config.emit_threshold,
            inner: Mutex::new(Inner {
                heap: EventHeap::with_capacity(capacity, comparator),
                sink,
            }),
            counters: EmitterCounters::new(),
        })
    }

    /// Buffer an event; emit the minimum if the threshold is reached
    ///
    /// Blocks while the sink is full, and while another caller holds the lock.
    /// At most one event is emitted per call, so the buffer never holds more
    /// than `threshold` events once this returns.
    ///
    /// On `EmitterError::SinkClosed` the pushed event stays buffered; the
    /// popped minimum that the sink rejected is discarded.
    pub fn push(&self, event: T) -> EmitterResult<()> {
        let mut inner = self.inner.lock();
        inner.heap.push(event);
        self.counters.inc_pushed();
        self.counters.set_buffered(inner.heap.len());

        if inner.heap.len() < self.threshold {
            return Ok(());
        }

        let Some(min) = inner.heap.pop() else {
            return Ok(());
        };
        self.counters.set_buffered(inner.heap.len());
        trace!(buffered = inner.heap.len(), "Threshold reached, emitting minimum");

        self.emit(&inner.sink, min)?;
        self.counters.inc_auto_emitted();
        Ok(())
    }

    /// Emit every buffered event in order; returns how many were emitted
    ///
    /// The sink is not closed. Flushing an empty buffer is a no-op.
    /// Stops at the first sink failure, leaving the rest buffered.
    pub fn flush(&self) -> EmitterResult<usize> {
        let mut inner = self.inner.lock();
        let pending = inner.heap.len();
        let mut emitted = 0usize;

        let result = loop {
            let Some(event) = inner.heap.pop() else {
                break Ok(emitted);
            };
            self.counters.set_buffered(inner.heap.len());
            if let Err(e) = self.emit(&inner.sink, event) {
                break Err(e);
            }
            emitted += 1;
        };

        self.counters.add_flushed(emitted as u64);
        self.counters.inc_flushes();
        if pending > 0 {
            debug!(pending, emitted, "Emitter flushed");
        }
        result
    }

    fn emit(&self, sink: &S, event: T) -> EmitterResult<()> {
        sink.emit(event).map_err(|_| {
            self.counters.inc_dropped();
            warn!("Sink closed, dropped emitted event");
            EmitterError::SinkClosed
        })
    }

    /// Consume the emitter, returning the sink and the unemitted events in order
    pub fn into_parts(self) -> (S, Vec<T>) {
        let inner = self.inner.into_inner();
        (inner.sink, inner.heap.into_sorted_vec())
    }
}

impl<T, S, C> OrderedEmitter<T, S, C> {
    /// Current buffer size
    ///
    /// Snapshot only; concurrent push/flush may change it immediately. Does
    /// not take the lock, so it answers even while a sink is stalled.
    pub fn len(&self) -> usize {
        self.counters.buffered()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Get current statistics
    pub fn stats(&self) -> EmitterStats {
        self.counters.snapshot()
    }
}

impl<T, S, C> fmt::Debug for OrderedEmitter<T, S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedEmitter")
            .field("threshold", &self.threshold)
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}
