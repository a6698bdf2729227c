//! CLI error types and result alias.

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// IO error
    #[error("IO error: {0}")]
    #[diagnostic(code(strata::io))]
    Io(#[from] std::io::Error),

    /// Manifest or argument error
    #[error("Configuration error: {0}")]
    #[diagnostic(code(strata::config))]
    Config(String),

    /// Migration engine error
    #[error("Migration error: {0}")]
    #[diagnostic(code(strata::migration))]
    Migration(#[from] strata_migrate::MigrateError),

    /// Database connection error
    #[error("Database error: {0}")]
    #[diagnostic(code(strata::database))]
    Database(#[from] strata_postgres::PgError),
}

impl CliError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<toml::de::Error> for CliError {
    fn from(err: toml::de::Error) -> Self {
        CliError::Config(format!("failed to parse manifest: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_error_becomes_config() {
        let err: CliError = toml::from_str::<toml::Value>("not [valid").unwrap_err().into();
        assert!(matches!(err, CliError::Config(_)));
    }
}
