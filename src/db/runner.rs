//! Statement execution seam.
//!
//! Every tool handler talks to the database through these two traits: a
//! [`QueryRunner`] hands out sessions, a [`QuerySession`] runs statements on
//! the connection it holds. [`ConnectionProvider`](crate::db::ConnectionProvider)
//! implements them against TiDB; tests substitute a scripted runner.

use crate::error::DbResult;
use crate::models::QueryResult;
use std::future::Future;

/// Source of exclusive database sessions.
pub trait QueryRunner: Send + Sync {
    type Session: QuerySession;

    /// Acquire one session for the duration of a tool call.
    ///
    /// The session goes back to the pool when dropped.
    fn acquire(&self) -> impl Future<Output = DbResult<Self::Session>> + Send;
}

/// One connection held for exclusive use.
pub trait QuerySession: Send {
    /// Execute a single statement and drain every result it produces.
    ///
    /// Parameters bind positionally to `?` placeholders. With no parameters the
    /// statement is sent verbatim.
    fn run(
        &mut self,
        sql: &str,
        params: &[String],
    ) -> impl Future<Output = DbResult<QueryResult>> + Send;
}
