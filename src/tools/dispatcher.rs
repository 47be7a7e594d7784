//! Tool routing.
//!
//! `ToolRequest::parse` turns a raw MCP argument map into a typed request and
//! rejects bad input before any session is acquired. `ToolDispatcher` routes a
//! parsed request to its handler and returns the rendered text.

use crate::config::Config;
use crate::db::QueryRunner;
use crate::error::{DbError, DbResult};
use crate::tools::benchmark::{BenchmarkHandler, BenchmarkInput};
use crate::tools::database_stats::{DatabaseStatsHandler, DatabaseStatsInput};
use crate::tools::execute_sql::{ExecuteSqlHandler, ExecuteSqlInput};
use crate::tools::table_info::{TableInfoHandler, TableInfoInput};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;
use tracing::{info, warn};

pub const EXECUTE_SQL: &str = "execute_sql";
pub const GET_TABLE_INFO: &str = "get_table_info";
pub const GET_DATABASE_STATS: &str = "get_database_stats";
pub const BENCHMARK_QUERY: &str = "benchmark_query";

/// Name, description and input schema of one tool.
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Map<String, JsonValue>,
}

fn schema_of<T: JsonSchema>() -> Map<String, JsonValue> {
    match serde_json::to_value(schemars::schema_for!(T)) {
        Ok(JsonValue::Object(map)) => map,
        _ => {
            let mut map = Map::new();
            map.insert("type".into(), JsonValue::String("object".into()));
            map
        }
    }
}

/// Every tool this server exposes, in listing order.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: EXECUTE_SQL,
            description: "Execute a SQL statement against the TiDB database.\n\
                Row sets are rendered as json (default), table or markdown; other statements report the affected row count.\n\
                Set measure_time to include the execution time.",
            input_schema: schema_of::<ExecuteSqlInput>(),
        },
        ToolDefinition {
            name: GET_TABLE_INFO,
            description: "Get row count, data/index sizes, auto-increment value, comment and indexes for a table.\n\
                Omit table_name to describe every table in the database.",
            input_schema: schema_of::<TableInfoInput>(),
        },
        ToolDefinition {
            name: GET_DATABASE_STATS,
            description: "Get database statistics: server version and uptime, table count, total rows, data and index sizes, active connections.",
            input_schema: schema_of::<DatabaseStatsInput>(),
        },
        ToolDefinition {
            name: BENCHMARK_QUERY,
            description: "Run a query several times and report average, minimum and maximum execution time.\n\
                iterations defaults to 5 and is clamped to 1..=50.",
            input_schema: schema_of::<BenchmarkInput>(),
        },
    ]
}

/// A validated tool call.
#[derive(Debug, Clone)]
pub enum ToolRequest {
    ExecuteSql(ExecuteSqlInput),
    TableInfo(TableInfoInput),
    DatabaseStats,
    Benchmark(BenchmarkInput),
}

impl ToolRequest {
    /// Validate the arguments of a call to `name`.
    pub fn parse(name: &str, args: &Map<String, JsonValue>) -> DbResult<Self> {
        match name {
            EXECUTE_SQL => {
                require_text(name, args, "query")?;
                Ok(Self::ExecuteSql(decode(name, args)?))
            }
            GET_TABLE_INFO => Ok(Self::TableInfo(decode(name, args)?)),
            GET_DATABASE_STATS => Ok(Self::DatabaseStats),
            BENCHMARK_QUERY => {
                require_text(name, args, "query")?;
                Ok(Self::Benchmark(decode(name, args)?))
            }
            other => Err(DbError::unsupported_tool(other)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ExecuteSql(_) => EXECUTE_SQL,
            Self::TableInfo(_) => GET_TABLE_INFO,
            Self::DatabaseStats => GET_DATABASE_STATS,
            Self::Benchmark(_) => BENCHMARK_QUERY,
        }
    }
}

/// A required string argument must be present and not blank.
fn require_text(tool: &str, args: &Map<String, JsonValue>, key: &str) -> DbResult<()> {
    match args.get(key) {
        None | Some(JsonValue::Null) => Err(DbError::missing_parameter(tool, key)),
        Some(JsonValue::String(s)) if s.trim().is_empty() => {
            Err(DbError::missing_parameter(tool, key))
        }
        Some(_) => Ok(()),
    }
}

fn decode<T: DeserializeOwned>(tool: &str, args: &Map<String, JsonValue>) -> DbResult<T> {
    serde_json::from_value(JsonValue::Object(args.clone()))
        .map_err(|e| DbError::invalid_input(format!("{}: {}", tool, e)))
}

/// Connection-independent settings the handlers need.
#[derive(Debug, Clone)]
pub struct DispatcherSettings {
    pub database: String,
    pub endpoint: String,
    pub benchmark_warmup: bool,
}

impl DispatcherSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            database: config.database.clone(),
            endpoint: config.endpoint(),
            benchmark_warmup: config.benchmark_warmup,
        }
    }
}

/// Routes tool calls to their handlers.
pub struct ToolDispatcher<R> {
    execute_sql: ExecuteSqlHandler<R>,
    table_info: TableInfoHandler<R>,
    database_stats: DatabaseStatsHandler<R>,
    benchmark: BenchmarkHandler<R>,
}

impl<R: QueryRunner> ToolDispatcher<R> {
    pub fn new(runner: Arc<R>, settings: DispatcherSettings) -> Self {
        Self {
            execute_sql: ExecuteSqlHandler::new(runner.clone()),
            table_info: TableInfoHandler::new(runner.clone(), settings.database.clone()),
            database_stats: DatabaseStatsHandler::new(
                runner.clone(),
                settings.database,
                settings.endpoint,
            ),
            benchmark: BenchmarkHandler::new(runner, settings.benchmark_warmup),
        }
    }

    /// Validate and run one tool call, returning its text output.
    pub async fn dispatch(&self, name: &str, args: &Map<String, JsonValue>) -> DbResult<String> {
        let request = ToolRequest::parse(name, args).inspect_err(|e| {
            warn!(tool = %name, error = %e, "Rejected tool call");
        })?;
        info!(tool = request.name(), "Dispatching tool call");

        let result = match request {
            ToolRequest::ExecuteSql(input) => self.execute_sql.handle(input).await,
            ToolRequest::TableInfo(input) => self.table_info.handle(input).await,
            ToolRequest::DatabaseStats => self.database_stats.handle().await,
            ToolRequest::Benchmark(input) => self.benchmark.handle(input).await,
        };

        if let Err(e) = &result {
            warn!(tool = %name, error = %e, "Tool call failed");
        }
        result
    }
}
