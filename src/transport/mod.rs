//! Transport layer for the MCP server.
//!
//! The server speaks MCP over standard input/output only.

pub mod stdio;

pub use stdio::StdioTransport;

use crate::error::DbResult;
use std::future::Future;

/// A way of serving [`TidbService`](crate::mcp::TidbService) to a client.
pub trait Transport: Send + Sync {
    /// Serve until the client disconnects or a shutdown signal arrives.
    fn run(&self) -> impl Future<Output = DbResult<()>> + Send;

    /// Short name used in log lines.
    fn name(&self) -> &'static str;
}
