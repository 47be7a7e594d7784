//! Query benchmarking.
//!
//! Runs one query a fixed number of times on a single session, strictly in
//! sequence, timing execution plus result draining of each run.

use crate::db::runner::{QueryRunner, QuerySession};
use crate::error::{DbError, DbResult};
use crate::models::{BenchmarkResult, clamp_iterations};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

pub struct BenchmarkRunner<R> {
    runner: Arc<R>,
    warmup: bool,
}

impl<R: QueryRunner> BenchmarkRunner<R> {
    /// With `warmup`, one untimed execution precedes the timed runs.
    pub fn new(runner: Arc<R>, warmup: bool) -> Self {
        Self { runner, warmup }
    }

    /// Benchmark `query`. `requested` is clamped to the accepted range; any
    /// failed run aborts the benchmark and discards the timings collected so far.
    pub async fn run(&self, query: &str, requested: i64) -> DbResult<BenchmarkResult> {
        let iterations = clamp_iterations(requested);
        let mut session = self.runner.acquire().await?;

        if self.warmup {
            debug!("Benchmark warm-up run");
            session
                .run(query, &[])
                .await
                .map_err(|e| DbError::benchmark(0, iterations, &e))?;
        }

        let mut durations = Vec::with_capacity(iterations as usize);
        for iteration in 1..=iterations {
            let start = Instant::now();
            session
                .run(query, &[])
                .await
                .map_err(|e| DbError::benchmark(iteration, iterations, &e))?;
            durations.push(start.elapsed());
        }

        let result = BenchmarkResult::new(query, requested, durations);
        info!(
            iterations = result.iterations(),
            requested,
            average_ms = result.average_ms(),
            "Benchmark completed"
        );
        Ok(result)
    }
}
