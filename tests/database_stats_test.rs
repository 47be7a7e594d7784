//! Integration tests for the get_database_stats tool.

mod common;

use common::{FakeRunner, args, dispatcher, rows, scalar, sql_error};
use serde_json::json;
use tidb_mcp_server::DbError;

/// Populated server answers for every probe.
fn healthy_runner() -> std::sync::Arc<FakeRunner> {
    FakeRunner::new(|sql, _| {
        Ok(if sql.contains("DATABASE()") {
            scalar("DATABASE()", json!("test"))
        } else if sql.contains("VERSION()") {
            scalar("VERSION()", json!("8.0.11-TiDB-v7.5.0"))
        } else if sql.contains("'Uptime'") {
            rows(vec![json!({"Variable_name": "Uptime", "Value": "90061"})])
        } else if sql.contains("Threads_connected") {
            rows(vec![json!({"Variable_name": "Threads_connected", "Value": "3"})])
        } else if sql.contains("COUNT(*)") {
            scalar("COUNT(*)", json!(12))
        } else if sql.contains("SUM(TABLE_ROWS)") {
            scalar("SUM(TABLE_ROWS)", json!("1024"))
        } else {
            scalar("size", json!("65536"))
        })
    })
}

/// Every section is reported.
#[tokio::test]
async fn test_full_report() {
    let runner = healthy_runner();
    let out = dispatcher(&runner)
        .dispatch("get_database_stats", &args(json!({})))
        .await
        .unwrap();

    assert!(out.starts_with("Database Statistics\n===================\n\nServer:\n"));
    assert!(out.contains("  Endpoint: 127.0.0.1:4000\n"));
    assert!(out.contains("  Database: test\n"));
    assert!(out.contains("  Version: 8.0.11-TiDB-v7.5.0\n"));
    assert!(out.contains("  Uptime: 1d 1h 1m 1s\n"));
    assert!(out.contains("  Total tables: 12\n"));
    assert!(out.contains("  Total rows: 1,024\n"));
    assert!(out.contains("  Data size: 65,536 bytes (64 KiB)\n"));
    assert!(out.ends_with("Active connections: 3"));
    assert!(!out.contains("unavailable"));
    assert_eq!(runner.acquisitions(), 1);
}

/// Schema probes bind the configured database.
#[tokio::test]
async fn test_schema_probes_bind_database() {
    let runner = healthy_runner();
    dispatcher(&runner)
        .dispatch("get_database_stats", &args(json!({})))
        .await
        .unwrap();

    for statement in runner.executed() {
        if statement.sql.contains("information_schema") {
            assert_eq!(statement.params, vec!["test".to_string()]);
        } else {
            assert!(statement.params.is_empty());
        }
    }
}

/// An empty database reports zero counters, not errors.
#[tokio::test]
async fn test_empty_database_zero_counters() {
    let runner = FakeRunner::new(|sql, _| {
        Ok(if sql.contains("COUNT(*)") {
            scalar("COUNT(*)", json!(0))
        } else if sql.contains("SUM(") {
            scalar("total", json!(null))
        } else if sql.starts_with("SHOW") {
            rows(vec![json!({"Variable_name": "x", "Value": "1"})])
        } else {
            scalar("v", json!("test"))
        })
    });

    let out = dispatcher(&runner)
        .dispatch("get_database_stats", &args(json!({})))
        .await
        .unwrap();

    assert!(out.contains("  Total tables: 0\n"));
    assert!(out.contains("  Total rows: 0\n"));
    assert!(out.contains("  Data size: 0 bytes"));
    assert!(!out.contains("unavailable"));
}

/// A failing probe degrades its own field; the report still returns.
#[tokio::test]
async fn test_failing_probe_is_unavailable() {
    let runner = FakeRunner::new(|sql, params| {
        if sql.contains("Threads_connected") {
            return Err(sql_error(
                "Access denied; you need the PROCESS privilege",
                "42000",
            ));
        }
        healthy_runner_answer(sql, params)
    });

    let out = dispatcher(&runner)
        .dispatch("get_database_stats", &args(json!({})))
        .await
        .unwrap();

    assert!(out.contains("  Version: 8.0.11-TiDB-v7.5.0\n"));
    let line = out
        .lines()
        .find(|l| l.trim_start().starts_with("Active connections:"))
        .unwrap();
    assert!(line.contains("unavailable (") && line.contains("Access denied"));
}

fn healthy_runner_answer(
    sql: &str,
    _params: &[String],
) -> tidb_mcp_server::DbResult<tidb_mcp_server::models::QueryResult> {
    Ok(if sql.contains("VERSION()") {
        scalar("VERSION()", json!("8.0.11-TiDB-v7.5.0"))
    } else if sql.starts_with("SHOW") {
        rows(vec![json!({"Variable_name": "Uptime", "Value": "5"})])
    } else {
        scalar("v", json!(1))
    })
}

/// An unreachable server fails the whole call.
#[tokio::test]
async fn test_unreachable_server() {
    let runner = FakeRunner::unreachable();
    let err = dispatcher(&runner)
        .dispatch("get_database_stats", &args(json!({})))
        .await
        .unwrap_err();

    assert!(matches!(err, DbError::Connection { .. }));
    assert!(err.suggestion().is_some());
    assert!(runner.executed().is_empty());
}
