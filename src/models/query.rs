//! Query-related data models.
//!
//! This module defines the result of running one SQL statement.

use serde::Serialize;
use serde_json::Value as JsonValue;
use std::time::Duration;

/// One result row, keyed by column name in select-list order.
pub type Row = serde_json::Map<String, JsonValue>;

/// Result of executing a single statement.
#[derive(Debug, Clone, Default, Serialize)]
pub struct QueryResult {
    /// Column names in the order the server returned them
    pub columns: Vec<String>,
    pub rows: Vec<Row>,
    /// Affected-row count for statements without a row set
    pub rows_affected: u64,
    /// True when the statement produced a row set (possibly empty)
    pub is_row_set: bool,
    /// Wall-clock time of execute + drain, only when timing was requested
    #[serde(skip)]
    pub elapsed: Option<Duration>,
}

impl QueryResult {
    /// Create a row-set result.
    pub fn rows(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            columns,
            rows,
            rows_affected: 0,
            is_row_set: true,
            elapsed: None,
        }
    }

    /// Create a result for a statement that only changed rows.
    pub fn affected(rows_affected: u64) -> Self {
        Self {
            rows_affected,
            ..Self::default()
        }
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = Some(elapsed);
        self
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// First row, if any.
    pub fn first_row(&self) -> Option<&Row> {
        self.rows.first()
    }

    /// Value of the first column of the first row.
    pub fn scalar(&self) -> Option<&JsonValue> {
        let column = self.columns.first()?;
        self.first_row()?.get(column)
    }

    /// Elapsed time in milliseconds, as printed in tool output.
    pub fn elapsed_ms(&self) -> Option<f64> {
        self.elapsed.map(|d| d.as_secs_f64() * 1000.0)
    }
}
