//! Stdio transport for the MCP server.
//!
//! JSON-RPC messages are read from stdin and responses written to stdout, so
//! nothing else may ever print to stdout. Logs go to stderr.

use crate::db::ConnectionProvider;
use crate::error::{DbError, DbResult};
use crate::mcp::TidbService;
use crate::tools::{DispatcherSettings, ToolDispatcher};
use crate::transport::Transport;
use rmcp::{ServiceExt, transport::stdio};
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};

pub struct StdioTransport {
    provider: Arc<ConnectionProvider>,
    settings: DispatcherSettings,
}

impl StdioTransport {
    pub fn new(provider: Arc<ConnectionProvider>, settings: DispatcherSettings) -> Self {
        Self { provider, settings }
    }

    fn service(&self) -> TidbService {
        let dispatcher = ToolDispatcher::new(self.provider.clone(), self.settings.clone());
        TidbService::new(Arc::new(dispatcher))
    }
}

impl Transport for StdioTransport {
    async fn run(&self) -> DbResult<()> {
        info!("Starting MCP server with stdio transport");

        let running_service = self
            .service()
            .serve(stdio())
            .await
            .map_err(|e| DbError::internal(format!("Failed to start stdio transport: {}", e)))?;

        let shutdown_requested = tokio::select! {
            result = running_service.waiting() => {
                match result {
                    Ok(reason) => info!(reason = ?reason, "Client disconnected"),
                    Err(e) => {
                        warn!(error = %e, "Stdio transport error");
                        self.provider.close().await;
                        return Err(DbError::internal(format!("Stdio transport error: {}", e)));
                    }
                }
                false
            }
            _ = wait_for_signal() => {
                info!("Shutdown signal received (send again to force exit)");
                true
            }
        };

        if shutdown_requested {
            tokio::spawn(async {
                wait_for_signal().await;
                warn!("Received second signal, forcing immediate exit");
                std::process::exit(1);
            });
        }

        self.provider.close().await;

        if shutdown_requested {
            // A blocking stdin read cannot be cancelled; leave without waiting for it.
            info!("Exiting process");
            std::process::exit(0);
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "stdio"
    }
}

/// Wait for SIGINT or SIGTERM.
async fn wait_for_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
