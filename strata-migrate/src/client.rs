//! The database-client seam.
//!
//! The engine never talks to a driver directly. Everything it needs from a
//! database is expressed by [`SqlExecutor`]; driver crates (e.g.
//! `strata-postgres`) implement it and translate their native errors into
//! [`StatementError`] so the idempotency guard can classify them.

use std::fmt;

use async_trait::async_trait;

/// Kind of failure reported for a statement or batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementErrorKind {
    /// The statement was rejected or failed during execution.
    Execution,
    /// The connection dropped; nothing further can run on it.
    ConnectionLost,
}

/// An error raised by the execution of a single statement or batch.
///
/// Carries the server's condition code (SQLSTATE) when the driver can supply
/// one, plus the error message text. Both are inputs to classification.
#[derive(Debug, Clone)]
pub struct StatementError {
    kind: StatementErrorKind,
    sqlstate: Option<String>,
    message: String,
}

impl StatementError {
    /// Create an execution error.
    pub fn execution(message: impl Into<String>) -> Self {
        Self {
            kind: StatementErrorKind::Execution,
            sqlstate: None,
            message: message.into(),
        }
    }

    /// Create a connection-lost error.
    pub fn connection_lost(message: impl Into<String>) -> Self {
        Self {
            kind: StatementErrorKind::ConnectionLost,
            sqlstate: None,
            message: message.into(),
        }
    }

    /// Attach the server-reported SQLSTATE code.
    pub fn with_sqlstate(mut self, code: impl Into<String>) -> Self {
        self.sqlstate = Some(code.into());
        self
    }

    /// The error kind.
    pub fn kind(&self) -> StatementErrorKind {
        self.kind
    }

    /// The SQLSTATE condition code, if the driver reported one.
    pub fn sqlstate(&self) -> Option<&str> {
        self.sqlstate.as_deref()
    }

    /// The error message text.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Check whether the connection is gone.
    pub fn is_connection_lost(&self) -> bool {
        self.kind == StatementErrorKind::ConnectionLost
    }
}

impl fmt::Display for StatementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sqlstate {
            Some(code) => write!(f, "{} (SQLSTATE {})", self.message, code),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for StatementError {}

/// The surface the migration engine needs from a database client.
///
/// A single connection, used strictly sequentially. Implementations must not
/// retry on their own; the engine decides what a failure means.
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Execute one statement without parameters.
    async fn execute(&self, sql: &str) -> Result<(), StatementError>;

    /// Submit text containing one or more statements as a single opaque
    /// multi-statement execution.
    async fn batch_execute(&self, sql: &str) -> Result<(), StatementError>;

    /// Execute a parameterized statement with text parameters, returning the
    /// number of affected rows.
    async fn execute_params(&self, sql: &str, params: &[&str]) -> Result<u64, StatementError>;

    /// Run a query expected to yield a single boolean value, with text
    /// parameters.
    async fn query_bool(&self, sql: &str, params: &[&str]) -> Result<bool, StatementError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_with_sqlstate() {
        let err = StatementError::execution("column \"age\" of relation \"users\" already exists")
            .with_sqlstate("42701");
        let msg = err.to_string();
        assert!(msg.contains("already exists"));
        assert!(msg.contains("SQLSTATE 42701"));
    }

    #[test]
    fn test_connection_lost() {
        let err = StatementError::connection_lost("server closed the connection unexpectedly");
        assert!(err.is_connection_lost());
        assert_eq!(err.kind(), StatementErrorKind::ConnectionLost);
        assert!(err.sqlstate().is_none());
    }
}
