//! Tests for how tool outcomes are mapped onto MCP responses.

mod common;

use common::{FakeRunner, args, dispatcher, scalar, sql_error};
use serde_json::json;
use std::sync::Arc;
use tidb_mcp_server::TidbService;

fn service(runner: &Arc<FakeRunner>) -> TidbService<FakeRunner> {
    TidbService::new(Arc::new(dispatcher(runner)))
}

/// Successful calls return the rendered text.
#[tokio::test]
async fn test_success_is_text_content() {
    let runner = FakeRunner::new(|_, _| Ok(scalar("1", json!(1))));
    let result = service(&runner)
        .call("execute_sql", Some(args(json!({"query": "SELECT 1"}))))
        .await
        .unwrap();

    let value = serde_json::to_value(&result).unwrap();
    assert_ne!(value["isError"], json!(true));
    let text = value["content"][0]["text"].as_str().unwrap();
    assert!(text.starts_with("Query executed successfully.\nRows returned: 1\n\n"));
}

/// Bad arguments are protocol-level invalid params.
#[tokio::test]
async fn test_validation_is_invalid_params() {
    let runner = FakeRunner::new(|_, _| Ok(scalar("1", json!(1))));
    let err = service(&runner)
        .call("execute_sql", None)
        .await
        .unwrap_err();

    assert_eq!(err.code.0, -32602);
    assert!(err.message.contains("query"));
    assert_eq!(runner.acquisitions(), 0);
}

/// Database failures are tool results flagged as errors.
#[tokio::test]
async fn test_database_error_is_tool_error() {
    let runner = FakeRunner::new(|_, _| {
        Err(sql_error("Table 'test.missing' doesn't exist", "42S02"))
    });
    let result = service(&runner)
        .call("execute_sql", Some(args(json!({"query": "SELECT * FROM missing"}))))
        .await
        .unwrap();

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["isError"], json!(true));
    let text = value["content"][0]["text"].as_str().unwrap();
    assert!(text.starts_with("Error: Database error: Table 'test.missing' doesn't exist"));
    assert!(text.contains("\nSuggestion: "));
}

/// Connection failures carry their suggestion.
#[tokio::test]
async fn test_connection_error_is_tool_error() {
    let runner = FakeRunner::unreachable();
    let result = service(&runner)
        .call("get_database_stats", Some(args(json!({}))))
        .await
        .unwrap();

    let value = serde_json::to_value(&result).unwrap();
    assert_eq!(value["isError"], json!(true));
    let text = value["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("Suggestion: Check that the TiDB server is running"));
}
