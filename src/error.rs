//! Error types for the TiDB MCP Server.
//!
//! This module defines all error types using `thiserror` for ergonomic error handling.
//! Each error variant provides actionable messages to help AI assistants understand
//! and recover from error conditions.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Connection failed: {message}")]
    Connection { message: String, suggestion: String },

    #[error("Database error: {message}")]
    Database {
        message: String,
        /// e.g., "42S02" for unknown table
        sql_state: Option<String>,
        suggestion: String,
    },

    #[error("Table not found: '{table}' does not exist in database '{database}'")]
    TableNotFound { table: String, database: String },

    #[error("Benchmark aborted at iteration {iteration} of {iterations}: {message}")]
    Benchmark {
        iteration: u32,
        iterations: u32,
        message: String,
    },

    #[error("Missing parameter: '{parameter}' is required for {tool}")]
    MissingParameter { tool: String, parameter: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Unsupported tool: {name}")]
    UnsupportedTool { name: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl DbError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a connection error with a helpful suggestion.
    pub fn connection(message: impl Into<String>, suggestion: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            suggestion: suggestion.into(),
        }
    }

    /// Create a database error with optional SQL state.
    pub fn database(
        message: impl Into<String>,
        sql_state: Option<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Database {
            message: message.into(),
            sql_state,
            suggestion: suggestion.into(),
        }
    }

    pub fn table_not_found(table: impl Into<String>, database: impl Into<String>) -> Self {
        Self::TableNotFound {
            table: table.into(),
            database: database.into(),
        }
    }

    /// Wrap the failure of one benchmark iteration (1-based, 0 is the warm-up run).
    pub fn benchmark(iteration: u32, iterations: u32, source: &DbError) -> Self {
        Self::Benchmark {
            iteration,
            iterations,
            message: source.to_string(),
        }
    }

    pub fn missing_parameter(tool: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self::MissingParameter {
            tool: tool.into(),
            parameter: parameter.into(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn unsupported_tool(name: impl Into<String>) -> Self {
        Self::UnsupportedTool { name: name.into() }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the suggestion for this error, if available.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::Connection { suggestion, .. } => Some(suggestion),
            Self::Database { suggestion, .. } => Some(suggestion),
            Self::TableNotFound { .. } => {
                Some("Call get_table_info without table_name to list existing tables")
            }
            Self::UnsupportedTool { .. } => Some(
                "Available tools: execute_sql, get_table_info, get_database_stats, benchmark_query",
            ),
            _ => None,
        }
    }

    /// True for errors raised while validating tool arguments, before any
    /// statement reached the database.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingParameter { .. } | Self::InvalidInput { .. } | Self::UnsupportedTool { .. }
        )
    }
}

/// Convert sqlx errors to DbError.
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Configuration(msg) => DbError::connection(
                msg.to_string(),
                "Check TIDB_HOST, TIDB_PORT, TIDB_USERNAME, TIDB_PASSWORD and TIDB_DATABASE",
            ),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.to_string());
                DbError::database(
                    db_err.message(),
                    code,
                    "Check the SQL syntax and referenced objects",
                )
            }
            sqlx::Error::RowNotFound => DbError::database(
                "No rows returned",
                None,
                "Verify the query conditions match existing data",
            ),
            sqlx::Error::PoolTimedOut => DbError::connection(
                "Timed out acquiring a database connection",
                "Check that the TiDB server is reachable or raise --connect-timeout",
            ),
            sqlx::Error::PoolClosed => {
                DbError::connection("Connection pool is closed", "Restart the server")
            }
            sqlx::Error::Io(io_err) => DbError::connection(
                format!("I/O error: {}", io_err),
                "Check network connectivity and database server status",
            ),
            sqlx::Error::Tls(tls_err) => DbError::connection(
                format!("TLS error: {}", tls_err),
                "Verify TIDB_SSL_MODE and TIDB_SSL_CA",
            ),
            sqlx::Error::Protocol(msg) => DbError::connection(
                format!("Protocol error: {}", msg),
                "Check database server compatibility",
            ),
            sqlx::Error::ColumnNotFound(col) => {
                DbError::internal(format!("Column not found: {}", col))
            }
            sqlx::Error::ColumnIndexOutOfBounds { index, len } => DbError::internal(format!(
                "Column index {} out of bounds (len: {})",
                index, len
            )),
            sqlx::Error::ColumnDecode { index, source } => {
                DbError::internal(format!("Failed to decode column {}: {}", index, source))
            }
            sqlx::Error::Decode(source) => DbError::internal(format!("Decode error: {}", source)),
            sqlx::Error::WorkerCrashed => DbError::internal("Database worker crashed"),
            _ => DbError::internal(format!("Unknown database error: {}", err)),
        }
    }
}

/// Result type alias for database operations.
pub type DbResult<T> = Result<T, DbError>;

/// Build suggestion data as JSON value.
fn suggestion_data(suggestion: Option<&str>) -> Option<serde_json::Value> {
    suggestion.map(|s| serde_json::json!({ "suggestion": s }))
}

/// Convert DbError to MCP ErrorData for semantic error categorization.
/// Includes the suggestion field in the `data` object when available.
impl From<DbError> for rmcp::ErrorData {
    fn from(err: DbError) -> Self {
        let data = suggestion_data(err.suggestion());
        match &err {
            // Argument problems -> invalid_params
            DbError::MissingParameter { .. }
            | DbError::InvalidInput { .. }
            | DbError::UnsupportedTool { .. } => {
                rmcp::ErrorData::invalid_params(err.to_string(), data)
            }

            DbError::TableNotFound { .. } => {
                rmcp::ErrorData::resource_not_found(err.to_string(), data)
            }

            // Database errors -> invalid_params with sql_state in message
            DbError::Database {
                message, sql_state, ..
            } => {
                let msg = match sql_state {
                    Some(code) => format!("{} (SQLSTATE: {})", message, code),
                    None => message.clone(),
                };
                rmcp::ErrorData::invalid_params(msg, data)
            }

            DbError::Config { .. }
            | DbError::Connection { .. }
            | DbError::Benchmark { .. }
            | DbError::Internal { .. } => rmcp::ErrorData::internal_error(err.to_string(), data),
        }
    }
}
