//! TiDB MCP Server - Main entry point.
//!
//! Serves the TiDB tools over stdio. Configuration comes from `TIDB_*` and
//! `MCP_*` environment variables, optionally seeded from a `.env` file.

use std::sync::Arc;
use tidb_mcp_server::config::Config;
use tidb_mcp_server::db::ConnectionProvider;
use tidb_mcp_server::tools::DispatcherSettings;
use tidb_mcp_server::transport::{StdioTransport, Transport};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
///
/// stdout carries the MCP protocol, so logs always go to stderr.
fn init_tracing(config: &Config) {
    if !config.enable_logs {
        return;
    }

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load();

    init_tracing(&config);

    if let Err(e) = config.validate() {
        eprintln!("Error: {}", e);
        eprintln!();
        eprintln!("Required environment variables:");
        eprintln!("  TIDB_HOST       TiDB server host");
        eprintln!("  TIDB_USERNAME   user name");
        eprintln!("  TIDB_DATABASE   database to operate on");
        eprintln!("Optional: TIDB_PORT (default 4000), TIDB_PASSWORD, TIDB_SSL_MODE, TIDB_SSL_CA");
        std::process::exit(1);
    }

    info!(
        endpoint = %config.endpoint(),
        database = %config.database,
        ssl_mode = %config.ssl_mode,
        "Starting TiDB MCP Server v{}",
        env!("CARGO_PKG_VERSION")
    );

    let provider = Arc::new(ConnectionProvider::new(&config));
    // Startup probe only logs; serving does not wait for it.
    tokio::spawn({
        let provider = provider.clone();
        async move {
            provider.probe_server_version().await;
        }
    });

    let transport = StdioTransport::new(provider, DispatcherSettings::from_config(&config));
    info!(transport = transport.name(), "Serving");

    if let Err(e) = transport.run().await {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
