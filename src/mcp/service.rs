//! MCP service implementation using rmcp.
//!
//! `TidbService` implements `ServerHandler` directly: `list_tools` publishes the
//! tool definitions and `call_tool` forwards every call to the `ToolDispatcher`.

use crate::db::{ConnectionProvider, QueryRunner};
use crate::error::DbError;
use crate::tools::{ToolDispatcher, tool_definitions};
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    model::{
        CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
        PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo, Tool,
    },
    service::RequestContext,
};
use std::future::Future;
use std::sync::Arc;

pub struct TidbService<R = ConnectionProvider> {
    dispatcher: Arc<ToolDispatcher<R>>,
}

impl<R> Clone for TidbService<R> {
    fn clone(&self) -> Self {
        Self {
            dispatcher: self.dispatcher.clone(),
        }
    }
}

impl<R: QueryRunner> TidbService<R> {
    pub fn new(dispatcher: Arc<ToolDispatcher<R>>) -> Self {
        Self { dispatcher }
    }

    /// Tools as advertised by `list_tools`.
    pub fn tools() -> Vec<Tool> {
        tool_definitions()
            .into_iter()
            .map(|def| Tool::new(def.name, def.description, Arc::new(def.input_schema)))
            .collect()
    }

    /// Run one call and map the outcome onto MCP.
    ///
    /// Argument problems are protocol errors; everything that went wrong while
    /// talking to the database is a tool result flagged as an error.
    pub async fn call(
        &self,
        name: &str,
        arguments: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<CallToolResult, McpError> {
        let args = arguments.unwrap_or_default();
        match self.dispatcher.dispatch(name, &args).await {
            Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
            Err(e) if e.is_validation() => Err(McpError::from(e)),
            Err(e) => Ok(CallToolResult::error(vec![Content::text(error_text(&e))])),
        }
    }
}

fn error_text(err: &DbError) -> String {
    match err.suggestion() {
        Some(suggestion) => format!("Error: {}\nSuggestion: {}", err, suggestion),
        None => format!("Error: {}", err),
    }
}

impl<R: QueryRunner + 'static> ServerHandler for TidbService<R> {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "tidb-mcp-server".to_owned(),
                title: Some("TiDB MCP Server".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Tools for one preconfigured TiDB database.\n\
                \n\
                - `execute_sql`: run any statement (reads and writes, autocommit)\n\
                - `get_table_info`: table sizes and indexes; omit `table_name` for all tables\n\
                - `get_database_stats`: server version, uptime, table totals, connections\n\
                - `benchmark_query`: time repeated runs of a query (1-50 iterations)"
                    .to_string(),
            ),
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        std::future::ready(Ok(ListToolsResult::with_all_items(Self::tools())))
    }

    fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> impl Future<Output = Result<CallToolResult, McpError>> + Send + '_ {
        async move { self.call(&request.name, request.arguments).await }
    }
}
