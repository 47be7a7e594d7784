//! Benchmark result model.

use serde::Serialize;
use std::time::Duration;

/// Lowest accepted iteration count.
pub const MIN_ITERATIONS: u32 = 1;

/// Highest accepted iteration count.
pub const MAX_ITERATIONS: u32 = 50;

/// Iteration count used when the caller does not pass one.
pub const DEFAULT_ITERATIONS: u32 = 5;

/// Clamp a requested iteration count into the accepted range.
pub fn clamp_iterations(requested: i64) -> u32 {
    requested.clamp(MIN_ITERATIONS as i64, MAX_ITERATIONS as i64) as u32
}

/// Timings of N sequential runs of one query.
#[derive(Debug, Clone, Serialize)]
pub struct BenchmarkResult {
    pub query: String,
    /// Iteration count as passed by the caller
    pub requested: i64,
    /// Per-run wall-clock durations, in execution order
    #[serde(skip)]
    pub durations: Vec<Duration>,
}

impl BenchmarkResult {
    pub fn new(query: impl Into<String>, requested: i64, durations: Vec<Duration>) -> Self {
        Self {
            query: query.into(),
            requested,
            durations,
        }
    }

    /// Number of runs actually executed.
    pub fn iterations(&self) -> u32 {
        self.durations.len() as u32
    }

    /// True when the requested count was outside the accepted range.
    pub fn was_clamped(&self) -> bool {
        self.requested != self.iterations() as i64
    }

    /// Per-run times in milliseconds.
    pub fn times_ms(&self) -> Vec<f64> {
        self.durations
            .iter()
            .map(|d| d.as_secs_f64() * 1000.0)
            .collect()
    }

    /// Arithmetic mean of the recorded times, in milliseconds.
    pub fn average_ms(&self) -> f64 {
        let times = self.times_ms();
        if times.is_empty() {
            return 0.0;
        }
        times.iter().sum::<f64>() / times.len() as f64
    }

    pub fn min_ms(&self) -> f64 {
        self.times_ms().into_iter().reduce(f64::min).unwrap_or(0.0)
    }

    pub fn max_ms(&self) -> f64 {
        self.times_ms().into_iter().reduce(f64::max).unwrap_or(0.0)
    }
}
