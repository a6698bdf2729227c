//! Error types for the migration engine.

use std::path::PathBuf;

use thiserror::Error;

use crate::client::StatementError;

/// Result type alias for migration operations.
pub type MigrateResult<T> = Result<T, MigrateError>;

/// Errors that can occur during migration operations.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// File system error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file for a migration source does not exist.
    #[error("migration source '{name}' not found at {}", .path.display())]
    SourceNotFound {
        /// Migration name.
        name: String,
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The backing file exists but could not be read.
    #[error("migration source '{name}' could not be read: {source}")]
    SourceUnreadable {
        /// Migration name.
        name: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Database operation error outside statement execution.
    #[error("database error: {0}")]
    Database(#[from] StatementError),

    /// The connection dropped and the run cannot continue.
    #[error("connection lost: {0}")]
    ConnectionLost(String),

    /// Invalid migration definition or format.
    #[error("invalid migration: {0}")]
    InvalidMigration(String),
}

impl MigrateError {
    /// Create an invalid migration error.
    pub fn invalid_migration(msg: impl Into<String>) -> Self {
        Self::InvalidMigration(msg.into())
    }

    /// Create a connection lost error.
    pub fn connection_lost(msg: impl Into<String>) -> Self {
        Self::ConnectionLost(msg.into())
    }

    /// Check whether this error concerns a missing or unreadable source.
    pub fn is_source_error(&self) -> bool {
        matches!(
            self,
            Self::SourceNotFound { .. } | Self::SourceUnreadable { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_not_found_display() {
        let err = MigrateError::SourceNotFound {
            name: "0003_add_index".to_string(),
            path: PathBuf::from("migrations/0003_add_index.sql"),
        };
        let msg = err.to_string();
        assert!(msg.contains("0003_add_index"));
        assert!(msg.contains("migrations/0003_add_index.sql"));
    }

    #[test]
    fn test_is_source_error() {
        let err = MigrateError::SourceNotFound {
            name: "m".to_string(),
            path: PathBuf::from("m.sql"),
        };
        assert!(err.is_source_error());
        assert!(!MigrateError::connection_lost("gone").is_source_error());
    }
}
