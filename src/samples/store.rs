//! Fixed-capacity FIFO store for lag samples.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Samples retained before the oldest is evicted
pub const DEFAULT_SAMPLE_CAPACITY: usize = 300;

/// One replica lag observation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// When the observation was taken
    pub timestamp: Instant,
    /// Replay delay in seconds (`0.0` when the replica reported no value)
    pub lag_seconds: f64,
}

impl Sample {
    pub fn new(timestamp: Instant, lag_seconds: f64) -> Self {
        Self {
            timestamp,
            lag_seconds,
        }
    }

    /// Build a sample from a lag query result
    ///
    /// An absent lag (never replayed, or nothing to replay) is recorded as
    /// zero, the same as a measured zero delay.
    pub fn from_lag(timestamp: Instant, lag: Option<Duration>) -> Self {
        Self::new(timestamp, lag.map(|d| d.as_secs_f64()).unwrap_or(0.0))
    }
}

/// A sample positioned relative to the newest one, ready for plotting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LagPoint {
    /// Seconds relative to the newest sample (newest is 0, older are negative)
    pub offset_seconds: f64,
    pub lag_seconds: f64,
}

/// Bounded, insertion-ordered sample buffer
///
/// Every operation takes the lock for its whole duration, so a reader never
/// sees a half-evicted or half-appended buffer.
#[derive(Debug)]
pub struct SampleStore {
    samples: Mutex<VecDeque<Sample>>,
    capacity: usize,
}

impl Default for SampleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleStore {
    /// Create a store holding up to [`DEFAULT_SAMPLE_CAPACITY`] samples
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_SAMPLE_CAPACITY)
    }

    /// Create a store with a custom capacity (at least 1)
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Append at the tail, evicting the oldest sample when full
    pub fn append(&self, sample: Sample) {
        let mut samples = self.samples.lock();
        if samples.len() >= self.capacity {
            samples.pop_front();
        }
        samples.push_back(sample);
    }

    /// Copy of all held samples, oldest first
    pub fn snapshot(&self) -> Vec<Sample> {
        self.samples.lock().iter().copied().collect()
    }

    /// Most recently appended sample
    pub fn latest(&self) -> Option<Sample> {
        self.samples.lock().back().copied()
    }

    /// Samples as offsets from the newest one, oldest first
    pub fn lag_points(&self) -> Vec<LagPoint> {
        let samples = self.samples.lock();
        let Some(newest) = samples.back().map(|s| s.timestamp) else {
            return Vec::new();
        };

        samples
            .iter()
            .map(|s| LagPoint {
                offset_seconds: -newest.duration_since(s.timestamp).as_secs_f64(),
                lag_seconds: s.lag_seconds,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
