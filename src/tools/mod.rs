//! MCP tool implementations.
//!
//! This module contains the four tool handlers and the dispatcher routing to them:
//! - `execute_sql`: Run one SQL statement
//! - `get_table_info`: Table metadata for one or all tables
//! - `get_database_stats`: Database-wide statistics
//! - `benchmark_query`: Timed repeated execution

pub mod benchmark;
pub mod database_stats;
pub mod dispatcher;
pub mod execute_sql;
pub mod format;
pub mod table_info;

pub use benchmark::{BenchmarkHandler, BenchmarkInput};
pub use database_stats::{DatabaseStatsHandler, DatabaseStatsInput};
pub use dispatcher::{
    DispatcherSettings, ToolDefinition, ToolDispatcher, ToolRequest, tool_definitions,
};
pub use execute_sql::{ExecuteSqlHandler, ExecuteSqlInput};
pub use format::OutputFormat;
pub use table_info::{TableInfoHandler, TableInfoInput};
