//! TiDB MCP Server Library
//!
//! This library exposes a TiDB database to AI assistants as four MCP tools:
//! `execute_sql`, `get_table_info`, `get_database_stats` and `benchmark_query`.

pub mod config;
pub mod db;
pub mod error;
pub mod mcp;
pub mod models;
pub mod tools;
pub mod transport;

pub use config::Config;
pub use error::{DbError, DbResult};
pub use mcp::TidbService;
