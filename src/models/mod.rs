//! Data models for the TiDB MCP Server.
//!
//! This module re-exports all model types used throughout the application.

pub mod benchmark;
pub mod query;
pub mod schema;
pub mod stats;

// Re-export commonly used types
pub use benchmark::{
    BenchmarkResult, DEFAULT_ITERATIONS, MAX_ITERATIONS, MIN_ITERATIONS, clamp_iterations,
};
pub use query::{QueryResult, Row};
pub use schema::{IndexInfo, TableInfo};
pub use stats::{DatabaseStats, StatField, StatValue};
