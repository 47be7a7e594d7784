//! Database access layer.
//!
//! This module provides database access functionality:
//! - Connection pool and sessions (`pool`)
//! - The runner seam every tool goes through (`runner`)
//! - Single-statement execution, table metadata, statistics and benchmarks
//! - Row decoding (`types`)

pub mod benchmark;
pub mod executor;
pub mod pool;
pub mod runner;
pub mod schema;
pub mod stats;
pub mod types;

pub use benchmark::BenchmarkRunner;
pub use executor::{QueryExecutor, is_row_statement};
pub use pool::{ConnectionProvider, MySqlSession};
pub use runner::{QueryRunner, QuerySession};
pub use schema::MetadataInspector;
pub use stats::StatisticsAggregator;
