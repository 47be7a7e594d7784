//! Single-statement execution.
//!
//! The executor acquires a session, runs the statement exactly once and
//! optionally measures the wall-clock time of execution plus result draining.
//! Session acquisition is never part of the measurement.

use crate::db::runner::{QueryRunner, QuerySession};
use crate::error::DbResult;
use crate::models::QueryResult;
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

/// Leading keywords of statements that always yield a row set, even an empty one.
const ROW_SET_KEYWORDS: &[&str] = &[
    "SELECT", "SHOW", "DESC", "DESCRIBE", "EXPLAIN", "WITH", "TABLE", "VALUES", "TRACE",
];

/// True when the statement's leading keyword produces a row set.
///
/// Leading whitespace, SQL comments and opening parentheses are skipped, so
/// `(SELECT 1) UNION (SELECT 2)` counts as a row statement.
pub fn is_row_statement(sql: &str) -> bool {
    let keyword: String = strip_leading_noise(sql)
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    ROW_SET_KEYWORDS
        .iter()
        .any(|k| k.eq_ignore_ascii_case(&keyword))
}

fn strip_leading_noise(mut sql: &str) -> &str {
    loop {
        let trimmed = sql.trim_start_matches(|c: char| c.is_whitespace() || c == '(');
        if let Some(rest) = trimmed.strip_prefix("--").or_else(|| trimmed.strip_prefix('#')) {
            sql = rest.split_once('\n').map(|(_, tail)| tail).unwrap_or("");
        } else if let Some(rest) = trimmed.strip_prefix("/*") {
            sql = rest.split_once("*/").map(|(_, tail)| tail).unwrap_or("");
        } else {
            return trimmed;
        }
    }
}

/// Runs one statement per call on a freshly acquired session.
pub struct QueryExecutor<R> {
    runner: Arc<R>,
}

impl<R: QueryRunner> QueryExecutor<R> {
    pub fn new(runner: Arc<R>) -> Self {
        Self { runner }
    }

    /// Execute `sql` once. When `measure_time` is set the result carries the
    /// elapsed time of execute + drain.
    pub async fn execute(&self, sql: &str, measure_time: bool) -> DbResult<QueryResult> {
        let mut session = self.runner.acquire().await?;

        debug!(sql = %sql, measure_time, "Executing statement");
        let start = Instant::now();
        let result = session.run(sql, &[]).await?;
        let elapsed = start.elapsed();

        Ok(finish(sql, result, measure_time.then_some(elapsed)))
    }
}

fn finish(sql: &str, mut result: QueryResult, elapsed: Option<std::time::Duration>) -> QueryResult {
    result.is_row_set = result.is_row_set || !result.rows.is_empty() || is_row_statement(sql);
    result.elapsed = elapsed;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_statement_keywords() {
        assert!(is_row_statement("SELECT 1"));
        assert!(is_row_statement("  select * from t"));
        assert!(is_row_statement("show tables"));
        assert!(is_row_statement("DESC orders"));
        assert!(is_row_statement("describe orders"));
        assert!(is_row_statement("EXPLAIN ANALYZE SELECT 1"));
        assert!(is_row_statement("WITH cte AS (SELECT 1) SELECT * FROM cte"));
        assert!(is_row_statement("TABLE orders"));
        assert!(is_row_statement("VALUES ROW(1, 2)"));
        assert!(is_row_statement("TRACE SELECT 1"));
    }

    #[test]
    fn test_row_statement_parenthesised() {
        assert!(is_row_statement("(SELECT 1) UNION (SELECT 2)"));
        assert!(is_row_statement("((select 1))"));
    }

    #[test]
    fn test_row_statement_skips_comments() {
        assert!(is_row_statement("-- list\nSELECT 1"));
        assert!(is_row_statement("/* hint */ SELECT 1"));
        assert!(is_row_statement("# note\n  SHOW DATABASES"));
    }

    #[test]
    fn test_non_row_statements() {
        assert!(!is_row_statement("INSERT INTO t VALUES (1)"));
        assert!(!is_row_statement("UPDATE t SET a = 1"));
        assert!(!is_row_statement("DELETE FROM t"));
        assert!(!is_row_statement("CREATE TABLE t (id INT)"));
        assert!(!is_row_statement("SELECTED"));
        assert!(!is_row_statement(""));
        assert!(!is_row_statement("/* unterminated"));
    }

    #[test]
    fn test_finish_marks_empty_select_as_row_set() {
        let result = finish("SELECT * FROM empty", QueryResult::affected(0), None);
        assert!(result.is_row_set);
        assert!(result.elapsed.is_none());
    }

    #[test]
    fn test_finish_keeps_affected_count() {
        let elapsed = std::time::Duration::from_millis(2);
        let result = finish("UPDATE t SET a = 1", QueryResult::affected(4), Some(elapsed));
        assert!(!result.is_row_set);
        assert_eq!(result.rows_affected, 4);
        assert_eq!(result.elapsed, Some(elapsed));
    }
}
