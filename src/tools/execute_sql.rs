//! The `execute_sql` tool.
//!
//! Runs one arbitrary statement, optionally timed, and renders either the row
//! set or the affected-row count.

use crate::db::{QueryExecutor, QueryRunner};
use crate::error::DbResult;
use crate::models::QueryResult;
use crate::tools::format::{OutputFormat, format_ms, format_rows};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::info;

/// Input for the execute_sql tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ExecuteSqlInput {
    /// SQL statement to execute. Runs once, with autocommit.
    pub query: String,
    /// If true, report the execution time in milliseconds. Default: false
    #[serde(default)]
    pub measure_time: bool,
    /// Row rendering: "json" (default), "table" (ASCII table) or "markdown"
    #[serde(default)]
    pub format: OutputFormat,
}

pub struct ExecuteSqlHandler<R> {
    executor: QueryExecutor<R>,
}

impl<R: QueryRunner> ExecuteSqlHandler<R> {
    pub fn new(runner: Arc<R>) -> Self {
        Self {
            executor: QueryExecutor::new(runner),
        }
    }

    pub async fn handle(&self, input: ExecuteSqlInput) -> DbResult<String> {
        let result = self
            .executor
            .execute(&input.query, input.measure_time)
            .await?;

        info!(
            row_set = result.is_row_set,
            rows = result.row_count(),
            rows_affected = result.rows_affected,
            elapsed_ms = ?result.elapsed_ms(),
            "execute_sql completed"
        );

        Ok(render(&result, input.format))
    }
}

/// Render a statement result as tool text.
pub fn render(result: &QueryResult, format: OutputFormat) -> String {
    let mut out = String::from("Query executed successfully.\n");

    if let Some(ms) = result.elapsed_ms() {
        out.push_str(&format!("Execution time: {}\n", format_ms(ms)));
    }

    if !result.is_row_set {
        out.push_str(&format!("Affected rows: {}", result.rows_affected));
    } else {
        out.push_str(&format!("Rows returned: {}\n\n", result.row_count()));
        if result.rows.is_empty() {
            out.push_str("No rows returned.");
        } else {
            out.push_str(&format_rows(format, &result.columns, &result.rows));
        }
    }

    out
}
