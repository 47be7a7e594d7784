//! Configuration handling for the TiDB MCP Server.
//!
//! All settings come from CLI arguments or, more commonly, environment variables
//! (`TIDB_HOST`, `TIDB_PORT`, `TIDB_USERNAME`, `TIDB_PASSWORD`, `TIDB_DATABASE`).
//! Missing required values make the process exit at startup.

use crate::error::{DbError, DbResult};
use clap::{Parser, ValueEnum};
use sqlx::mysql::{MySqlConnectOptions, MySqlSslMode};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_TIDB_PORT: u16 = 4000;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// TLS mode for the TiDB connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SslMode {
    /// Require TLS for remote hosts, disable it for loopback hosts
    #[default]
    Auto,
    Disabled,
    Preferred,
    Required,
    VerifyCa,
    VerifyIdentity,
}

impl std::fmt::Display for SslMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Disabled => write!(f, "disabled"),
            Self::Preferred => write!(f, "preferred"),
            Self::Required => write!(f, "required"),
            Self::VerifyCa => write!(f, "verify-ca"),
            Self::VerifyIdentity => write!(f, "verify-identity"),
        }
    }
}

/// Configuration for the TiDB MCP Server.
#[derive(Clone, Parser)]
#[command(
    name = "tidb-mcp-server",
    about = "MCP server for TiDB - run SQL, inspect tables, collect statistics and benchmark queries",
    version,
    author
)]
pub struct Config {
    /// TiDB server host
    #[arg(long, env = "TIDB_HOST")]
    pub host: String,

    /// TiDB server port
    #[arg(long, default_value_t = DEFAULT_TIDB_PORT, env = "TIDB_PORT")]
    pub port: u16,

    /// User name used to authenticate
    #[arg(long, env = "TIDB_USERNAME")]
    pub username: String,

    /// Password used to authenticate (empty for passwordless accounts)
    #[arg(long, default_value = "", env = "TIDB_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Database (schema) all tools operate on
    #[arg(long, env = "TIDB_DATABASE")]
    pub database: String,

    /// TLS mode
    #[arg(long, value_enum, default_value = "auto", env = "TIDB_SSL_MODE")]
    pub ssl_mode: SslMode,

    /// CA certificate bundle used by verify-ca / verify-identity
    #[arg(long, env = "TIDB_SSL_CA")]
    pub ssl_ca: Option<PathBuf>,

    /// Maximum pooled connections. Each tool call holds one for its duration.
    #[arg(long, default_value_t = DEFAULT_MAX_CONNECTIONS, env = "MCP_MAX_CONNECTIONS")]
    pub max_connections: u32,

    /// Seconds to wait when acquiring a connection
    #[arg(long, default_value_t = DEFAULT_CONNECT_TIMEOUT_SECS, env = "MCP_CONNECT_TIMEOUT")]
    pub connect_timeout: u64,

    /// Run one untimed warm-up execution before benchmarking
    #[arg(long, env = "MCP_BENCHMARK_WARMUP")]
    pub benchmark_warmup: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "MCP_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "MCP_JSON_LOGS")]
    pub json_logs: bool,

    /// Enable logging output on stderr (disabled by default to keep the stdio transport quiet)
    #[arg(long, env = "MCP_ENABLE_LOGS")]
    pub enable_logs: bool,
}

// Manual impl so the password never ends up in logs.
impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("ssl_mode", &self.ssl_mode)
            .field("ssl_ca", &self.ssl_ca)
            .field("max_connections", &self.max_connections)
            .field("connect_timeout", &self.connect_timeout)
            .field("benchmark_warmup", &self.benchmark_warmup)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Load a `.env` file (if any) and parse configuration from the command line
    /// and environment. Variables already set in the environment win over `.env`.
    pub fn load() -> Self {
        dotenv::dotenv().ok();
        Self::parse()
    }

    /// Create a configuration for the given coordinates with every optional
    /// setting at its default (useful for testing).
    pub fn for_database(
        host: impl Into<String>,
        username: impl Into<String>,
        database: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_TIDB_PORT,
            username: username.into(),
            password: String::new(),
            database: database.into(),
            ssl_mode: SslMode::Auto,
            ssl_ca: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT_SECS,
            benchmark_warmup: false,
            log_level: "info".to_string(),
            json_logs: false,
            enable_logs: false,
        }
    }

    /// Reject values clap accepts syntactically but the server cannot use.
    pub fn validate(&self) -> DbResult<()> {
        for (name, value) in [
            ("TIDB_HOST", &self.host),
            ("TIDB_USERNAME", &self.username),
            ("TIDB_DATABASE", &self.database),
        ] {
            if value.trim().is_empty() {
                return Err(DbError::config(format!("{name} must not be empty")));
            }
        }
        if self.port == 0 {
            return Err(DbError::config("TIDB_PORT must be between 1 and 65535"));
        }
        if self.max_connections == 0 {
            return Err(DbError::config("MCP_MAX_CONNECTIONS must be greater than 0"));
        }
        if matches!(self.ssl_mode, SslMode::VerifyCa | SslMode::VerifyIdentity)
            && self.ssl_ca.is_none()
        {
            return Err(DbError::config(format!(
                "TIDB_SSL_CA is required when TIDB_SSL_MODE is {}",
                self.ssl_mode
            )));
        }
        Ok(())
    }

    /// True when the host points at the local machine.
    pub fn is_loopback_host(&self) -> bool {
        let host = self.host.trim().trim_start_matches('[').trim_end_matches(']');
        host.eq_ignore_ascii_case("localhost")
            || host
                .parse::<std::net::IpAddr>()
                .is_ok_and(|ip| ip.is_loopback())
    }

    /// Resolve `auto` into a concrete driver TLS mode.
    pub fn effective_ssl_mode(&self) -> MySqlSslMode {
        match self.ssl_mode {
            SslMode::Auto if self.is_loopback_host() => MySqlSslMode::Disabled,
            SslMode::Auto => MySqlSslMode::Required,
            SslMode::Disabled => MySqlSslMode::Disabled,
            SslMode::Preferred => MySqlSslMode::Preferred,
            SslMode::Required => MySqlSslMode::Required,
            SslMode::VerifyCa => MySqlSslMode::VerifyCa,
            SslMode::VerifyIdentity => MySqlSslMode::VerifyIdentity,
        }
    }

    /// Build driver connect options. Credentials stay out of any URL string.
    pub fn connect_options(&self) -> MySqlConnectOptions {
        let mut options = MySqlConnectOptions::new()
            .host(self.host.trim())
            .port(self.port)
            .username(&self.username)
            .database(&self.database)
            .charset("utf8mb4")
            .ssl_mode(self.effective_ssl_mode());

        if !self.password.is_empty() {
            options = options.password(&self.password);
        }
        if let Some(ca) = &self.ssl_ca {
            options = options.ssl_ca(ca);
        }
        options
    }

    /// `host:port` as shown in reports.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host.trim(), self.port)
    }

    /// Get the connection acquire timeout as a Duration.
    pub fn connect_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }
}
