//! Synthetic out-of-order event source and order checking
//!
//! Each producer owns an `EventSource`. Producer `p` of `n` generates the
//! events whose global index `i` satisfies `i % n == p`, with nominal
//! timestamp `i * spacing` plus Gaussian jitter. The merged stream is
//! therefore sorted only within a window proportional to `jitter / spacing`.
//!
//! Energy follows the emulator's spectrum: a Gaussian peak per channel on a
//! uniform background.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal, NormalError};
use thiserror::Error;

use crate::common::EventData;

/// Uniform background fraction of the energy spectrum
const BACKGROUND_RATIO: f64 = 0.3;

/// Channels per simulated module
const CHANNELS_PER_MODULE: u8 = 16;

/// Errors building an `EventSource`
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SourceError {
    #[error("Invalid jitter: {0} ns (must be finite and >= 0)")]
    InvalidJitter(f64),

    #[error("Jitter distribution error: {0}")]
    Distribution(#[from] NormalError),
}

/// Generator for one producer's share of a jittered stream
pub struct EventSource {
    producer_id: u64,
    producers: u64,
    remaining: u64,
    next_index: u64,
    spacing_ns: f64,
    jitter: Normal<f64>,
    rng: StdRng,
}

impl EventSource {
    /// Source for producer `producer_id` of `producers`, covering `total` events overall
    ///
    /// Fails if `jitter_ns` is negative or not finite.
    pub fn new(
        producer_id: usize,
        producers: usize,
        total: u64,
        spacing_ns: f64,
        jitter_ns: f64,
        seed: u64,
    ) -> Result<Self, SourceError> {
        if !jitter_ns.is_finite() || jitter_ns < 0.0 {
            return Err(SourceError::InvalidJitter(jitter_ns));
        }
        let producer_id = producer_id as u64;
        let producers = producers.max(1) as u64;
        let remaining = total / producers + u64::from(producer_id < total % producers);
        Ok(Self {
            producer_id,
            producers,
            remaining,
            next_index: producer_id,
            spacing_ns,
            jitter: Normal::new(0.0, jitter_ns)?,
            rng: StdRng::seed_from_u64(seed.wrapping_add(producer_id)),
        })
    }

    /// Events this source will still produce
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    fn energy(&mut self, module: u8, channel: u8) -> u16 {
        if self.rng.gen_bool(BACKGROUND_RATIO) {
            // 12-bit ADC range
            self.rng.gen_range(0..4096)
        } else {
            let mean = f64::from(module) * 1000.0 + f64::from(channel) * 50.0 + 500.0;
            let peak = mean + 50.0 * self.rng.sample::<f64, _>(rand_distr::StandardNormal);
            peak.clamp(0.0, 65535.0) as u16
        }
    }
}

impl Iterator for EventSource {
    type Item = EventData;

    fn next(&mut self) -> Option<EventData> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let index = self.next_index;
        self.next_index += self.producers;

        let module = (self.producer_id % 256) as u8;
        let channel = self.rng.gen_range(0..CHANNELS_PER_MODULE);
        let energy = self.energy(module, channel);
        let timestamp_ns = index as f64 * self.spacing_ns + self.jitter.sample(&mut self.rng);

        Some(EventData::new(module, channel, energy, timestamp_ns, index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining as usize;
        (n, Some(n))
    }
}

/// Running check that a stream is non-decreasing under `EventData::cmp_time`
#[derive(Debug, Default)]
pub struct OrderChecker {
    last: Option<EventData>,
    seen: u64,
    inversions: u64,
    max_lag_ns: f64,
}

impl OrderChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the next event in emission order
    pub fn observe(&mut self, event: &EventData) {
        if let Some(last) = &self.last {
            if event.cmp_time(last).is_lt() {
                self.inversions += 1;
                self.max_lag_ns = self.max_lag_ns.max(last.timestamp_ns - event.timestamp_ns);
                // Keep the later event as the reference point
                self.seen += 1;
                return;
            }
        }
        self.last = Some(*event);
        self.seen += 1;
    }

    pub fn seen(&self) -> u64 {
        self.seen
    }

    /// Events that arrived earlier than a predecessor
    pub fn inversions(&self) -> u64 {
        self.inversions
    }

    /// Largest timestamp regression observed
    pub fn max_lag_ns(&self) -> f64 {
        self.max_lag_ns
    }

    pub fn is_sorted(&self) -> bool {
        self.inversions == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sources_partition_the_index_space() {
        let producers = 3;
        let mut indices: Vec<u64> = (0..producers)
            .flat_map(|p| EventSource::new(p, producers, 10, 100.0, 0.0, 1).unwrap())
            .map(|e| e.sequence)
            .collect();
        indices.sort_unstable();
        assert_eq!(indices, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn remaining_split_is_balanced() {
        let counts: Vec<u64> = (0..4)
            .map(|p| EventSource::new(p, 4, 10, 1.0, 0.0, 0).unwrap().remaining())
            .collect();
        assert_eq!(counts, vec![3, 3, 2, 2]);
    }

    #[test]
    fn zero_jitter_is_sorted_per_producer() {
        let mut checker = OrderChecker::new();
        for event in EventSource::new(0, 1, 500, 10.0, 0.0, 9).unwrap() {
            checker.observe(&event);
        }
        assert_eq!(checker.seen(), 500);
        assert!(checker.is_sorted());
    }

    #[test]
    fn jitter_produces_inversions() {
        let mut checker = OrderChecker::new();
        for event in EventSource::new(0, 1, 2000, 1.0, 50.0, 9).unwrap() {
            checker.observe(&event);
        }
        assert!(checker.inversions() > 0);
        assert!(checker.max_lag_ns() > 0.0);
    }

    #[test]
    fn same_seed_same_stream() {
        let a: Vec<EventData> = EventSource::new(1, 2, 50, 5.0, 20.0, 77).unwrap().collect();
        let b: Vec<EventData> = EventSource::new(1, 2, 50, 5.0, 20.0, 77).unwrap().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn negative_jitter_rejected() {
        assert!(matches!(
            EventSource::new(0, 1, 1, 1.0, -1.0, 0),
            Err(SourceError::InvalidJitter(j)) if j == -1.0
        ));
    }

    #[test]
    fn non_finite_jitter_rejected() {
        for jitter in [f64::NAN, f64::INFINITY] {
            assert!(matches!(
                EventSource::new(0, 1, 1, 1.0, jitter, 0),
                Err(SourceError::InvalidJitter(_))
            ));
        }
        assert!(EventSource::new(0, 1, 1, 1.0, 0.0, 0).is_ok());
    }

    #[test]
    fn checker_counts_single_regression() {
        let mut checker = OrderChecker::new();
        for (ts, seq) in [(10.0, 0), (30.0, 1), (20.0, 2), (40.0, 3)] {
            checker.observe(&EventData::new(0, 0, 0, ts, seq));
        }
        assert_eq!(checker.seen(), 4);
        assert_eq!(checker.inversions(), 1);
        assert_eq!(checker.max_lag_ns(), 10.0);
    }
}
