//! The `benchmark_query` tool.

use crate::db::{BenchmarkRunner, QueryRunner};
use crate::error::DbResult;
use crate::models::{BenchmarkResult, DEFAULT_ITERATIONS};
use crate::tools::format::format_ms;
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;

/// Input for the benchmark_query tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct BenchmarkInput {
    /// SQL statement to benchmark
    pub query: String,
    /// Number of timed runs. Default: 5, clamped to 1..=50
    #[serde(default)]
    pub iterations: Option<i64>,
}

impl BenchmarkInput {
    pub fn requested_iterations(&self) -> i64 {
        self.iterations.unwrap_or(DEFAULT_ITERATIONS as i64)
    }
}

pub struct BenchmarkHandler<R> {
    runner: BenchmarkRunner<R>,
}

impl<R: QueryRunner> BenchmarkHandler<R> {
    pub fn new(runner: Arc<R>, warmup: bool) -> Self {
        Self {
            runner: BenchmarkRunner::new(runner, warmup),
        }
    }

    pub async fn handle(&self, input: BenchmarkInput) -> DbResult<String> {
        let result = self
            .runner
            .run(&input.query, input.requested_iterations())
            .await?;
        Ok(render(&result))
    }
}

pub fn render(result: &BenchmarkResult) -> String {
    let mut out = String::from("Query Benchmark Results\n=======================\n\n");
    out.push_str(&format!("Query: {}\n", result.query));
    out.push_str(&format!("Iterations: {}", result.iterations()));
    if result.was_clamped() {
        out.push_str(&format!(
            " (requested {}, clamped to {})",
            result.requested,
            result.iterations()
        ));
    }
    out.push_str("\n\n");
    out.push_str(&format!(
        "Average execution time: {}\n",
        format_ms(result.average_ms())
    ));
    out.push_str(&format!(
        "Minimum execution time: {}\n",
        format_ms(result.min_ms())
    ));
    out.push_str(&format!(
        "Maximum execution time: {}\n\n",
        format_ms(result.max_ms())
    ));

    let times = result
        .times_ms()
        .iter()
        .map(|ms| format!("{:.2}", ms))
        .collect::<Vec<_>>()
        .join(", ");
    out.push_str(&format!("Individual times (ms): {}", times));
    out
}
