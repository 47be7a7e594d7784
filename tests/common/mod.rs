//! Shared test fixtures: a scripted in-memory `QueryRunner`.
//!
//! The script is a closure mapping `(sql, params)` to a result. Every executed
//! statement and every session acquisition is recorded for assertions.

#![allow(dead_code)]

use serde_json::Value as JsonValue;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tidb_mcp_server::db::{QueryRunner, QuerySession};
use tidb_mcp_server::error::{DbError, DbResult};
use tidb_mcp_server::models::{QueryResult, Row};
use tidb_mcp_server::tools::{DispatcherSettings, ToolDispatcher};

type Script = dyn Fn(&str, &[String]) -> DbResult<QueryResult> + Send + Sync;

/// One statement as the session received it.
#[derive(Debug, Clone)]
pub struct Executed {
    pub sql: String,
    pub params: Vec<String>,
}

pub struct FakeRunner {
    script: Arc<Script>,
    log: Arc<Mutex<Vec<Executed>>>,
    acquisitions: AtomicUsize,
    unreachable: bool,
}

impl FakeRunner {
    pub fn new(
        script: impl Fn(&str, &[String]) -> DbResult<QueryResult> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            script: Arc::new(script),
            log: Arc::new(Mutex::new(Vec::new())),
            acquisitions: AtomicUsize::new(0),
            unreachable: false,
        })
    }

    /// A runner whose every acquisition fails like a down server.
    pub fn unreachable() -> Arc<Self> {
        Arc::new(Self {
            script: Arc::new(|_: &str, _: &[String]| Ok::<_, DbError>(QueryResult::affected(0))),
            log: Arc::new(Mutex::new(Vec::new())),
            acquisitions: AtomicUsize::new(0),
            unreachable: true,
        })
    }

    pub fn executed(&self) -> Vec<Executed> {
        self.log.lock().unwrap().clone()
    }

    pub fn statements(&self) -> Vec<String> {
        self.executed().into_iter().map(|e| e.sql).collect()
    }

    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }
}

pub struct FakeSession {
    script: Arc<Script>,
    log: Arc<Mutex<Vec<Executed>>>,
}

impl QueryRunner for FakeRunner {
    type Session = FakeSession;

    async fn acquire(&self) -> DbResult<FakeSession> {
        self.acquisitions.fetch_add(1, Ordering::SeqCst);
        if self.unreachable {
            return Err(DbError::connection(
                "Failed to connect to 127.0.0.1:4000: Connection refused (os error 111)",
                "Check that the TiDB server is running and TIDB_HOST/TIDB_PORT are correct",
            ));
        }
        Ok(FakeSession {
            script: self.script.clone(),
            log: self.log.clone(),
        })
    }
}

impl QuerySession for FakeSession {
    async fn run(&mut self, sql: &str, params: &[String]) -> DbResult<QueryResult> {
        self.log.lock().unwrap().push(Executed {
            sql: sql.to_string(),
            params: params.to_vec(),
        });
        (self.script)(sql, params)
    }
}

/// Build a row from a JSON object literal.
pub fn row(value: JsonValue) -> Row {
    value.as_object().cloned().expect("row must be a JSON object")
}

/// Row-set result whose columns are taken from the first row.
pub fn rows(values: Vec<JsonValue>) -> QueryResult {
    let rows: Vec<Row> = values.into_iter().map(row).collect();
    let columns = rows
        .first()
        .map(|r| r.keys().cloned().collect())
        .unwrap_or_default();
    QueryResult::rows(columns, rows)
}

/// A one-column, one-row result.
pub fn scalar(column: &str, value: JsonValue) -> QueryResult {
    rows(vec![serde_json::json!({ column: value })])
}

/// A driver-style execution error.
pub fn sql_error(message: &str, code: &str) -> DbError {
    DbError::database(message, Some(code.to_string()), "Check the SQL syntax and referenced objects")
}

pub fn settings() -> DispatcherSettings {
    DispatcherSettings {
        database: "test".to_string(),
        endpoint: "127.0.0.1:4000".to_string(),
        benchmark_warmup: false,
    }
}

pub fn dispatcher(runner: &Arc<FakeRunner>) -> ToolDispatcher<FakeRunner> {
    ToolDispatcher::new(runner.clone(), settings())
}

/// Arguments map from a JSON object literal.
pub fn args(value: JsonValue) -> serde_json::Map<String, JsonValue> {
    row(value)
}
