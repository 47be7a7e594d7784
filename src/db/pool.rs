//! Connection pool management.
//!
//! `ConnectionProvider` owns a lazily connecting `MySqlPool` for the configured
//! TiDB database. Each tool call checks out one pooled connection as a
//! [`MySqlSession`] and returns it when the session is dropped.

use crate::config::Config;
use crate::db::runner::{QueryRunner, QuerySession};
use crate::db::types::RowToJson;
use crate::error::{DbError, DbResult};
use crate::models::{QueryResult, Row};
use futures_util::TryStreamExt;
use sqlx::mysql::MySqlPoolOptions;
use sqlx::pool::PoolConnection;
use sqlx::{Either, Executor, MySql, MySqlPool};
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct ConnectionProvider {
    pool: MySqlPool,
    endpoint: String,
    database: String,
}

impl ConnectionProvider {
    /// Build the pool. No connection is opened until the first call needs one,
    /// so an unreachable server surfaces as a per-call error.
    pub fn new(config: &Config) -> Self {
        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout_duration())
            .test_before_acquire(true)
            .connect_lazy_with(config.connect_options());

        info!(
            endpoint = %config.endpoint(),
            database = %config.database,
            max_connections = config.max_connections,
            "Connection pool created"
        );

        Self {
            pool,
            endpoint: config.endpoint(),
            database: config.database.clone(),
        }
    }

    /// Run `SELECT VERSION()` once to report connectivity at startup.
    ///
    /// Failure is logged and otherwise ignored.
    pub async fn probe_server_version(&self) -> Option<String> {
        match sqlx::query_scalar::<_, String>("SELECT VERSION()")
            .fetch_one(&self.pool)
            .await
        {
            Ok(version) => {
                info!(version = %version, endpoint = %self.endpoint, "Connected to TiDB");
                Some(version)
            }
            Err(e) => {
                let err = DbError::from(e);
                warn!(
                    error = %err,
                    suggestion = err.suggestion().unwrap_or_default(),
                    endpoint = %self.endpoint,
                    "TiDB is not reachable yet; tool calls will retry on demand"
                );
                None
            }
        }
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Close the pool, waiting for checked-out connections to be returned.
    pub async fn close(&self) {
        info!(endpoint = %self.endpoint, "Closing connection pool");
        self.pool.close().await;
    }
}

impl QueryRunner for ConnectionProvider {
    type Session = MySqlSession;

    async fn acquire(&self) -> DbResult<MySqlSession> {
        let conn = self.pool.acquire().await.map_err(|e| match e {
            sqlx::Error::PoolTimedOut => DbError::from(e),
            other => {
                let message = other.to_string();
                DbError::connection(
                    format!("Failed to connect to {}: {}", self.endpoint, message),
                    connection_suggestion(&message),
                )
            }
        })?;
        debug!(endpoint = %self.endpoint, "Session acquired");
        Ok(MySqlSession { conn })
    }
}

/// A pooled connection checked out for one tool call.
#[derive(Debug)]
pub struct MySqlSession {
    conn: PoolConnection<MySql>,
}

impl QuerySession for MySqlSession {
    async fn run(&mut self, sql: &str, params: &[String]) -> DbResult<QueryResult> {
        debug!(sql = %sql, params = params.len(), "Running statement");

        // Without params, send raw SQL over the text protocol; some statements
        // cannot be prepared.
        let conn = &mut *self.conn;
        let mut stream = if params.is_empty() {
            conn.fetch_many(sql)
        } else {
            let mut query = sqlx::query(sql);
            for param in params {
                query = query.bind(param.as_str());
            }
            conn.fetch_many(query)
        };

        let mut collector = ResultCollector::default();
        while let Some(item) = stream.try_next().await? {
            match item {
                Either::Left(done) => collector.end_result_set(done.rows_affected()),
                Either::Right(row) => collector.push_row(|| row.column_names(), || row.to_json_map()),
            }
        }

        if collector.discarded_rows > 0 {
            debug!(
                discarded_rows = collector.discarded_rows,
                "Statement returned more than one result set; only the first is kept"
            );
        }
        Ok(collector.finish())
    }
}

/// Accumulates the first row-producing result set of a statement.
///
/// Later result sets, such as the extra selects of a `CALL`, are drained but
/// not kept. Affected-row counts are summed over all of them.
#[derive(Debug, Default)]
struct ResultCollector {
    columns: Vec<String>,
    rows: Vec<Row>,
    rows_affected: u64,
    first_set_closed: bool,
    discarded_rows: usize,
}

impl ResultCollector {
    fn end_result_set(&mut self, rows_affected: u64) {
        self.rows_affected += rows_affected;
        if !self.rows.is_empty() {
            self.first_set_closed = true;
        }
    }

    fn push_row(&mut self, columns: impl FnOnce() -> Vec<String>, row: impl FnOnce() -> Row) {
        if self.first_set_closed {
            self.discarded_rows += 1;
            return;
        }
        if self.columns.is_empty() {
            self.columns = columns();
        }
        self.rows.push(row());
    }

    fn finish(self) -> QueryResult {
        if self.rows.is_empty() {
            QueryResult::affected(self.rows_affected)
        } else {
            QueryResult::rows(self.columns, self.rows)
        }
    }
}

/// Generate a helpful suggestion for connection errors.
fn connection_suggestion(message: &str) -> &'static str {
    let lower = message.to_lowercase();

    if lower.contains("connection refused") {
        return "Check that the TiDB server is running and TIDB_HOST/TIDB_PORT are correct";
    }
    if lower.contains("access denied") || lower.contains("password") {
        return "Verify TIDB_USERNAME and TIDB_PASSWORD";
    }
    if lower.contains("unknown database") {
        return "Check that TIDB_DATABASE exists";
    }
    if lower.contains("tls") || lower.contains("ssl") || lower.contains("certificate") {
        return "Check TIDB_SSL_MODE and TIDB_SSL_CA";
    }
    "Verify the TIDB_* connection settings and network access"
}
