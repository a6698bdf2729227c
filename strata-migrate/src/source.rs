//! Migration units and source loading.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{MigrateError, MigrateResult};
use crate::executor::ExecutionMode;

/// Where a migration's statement text comes from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MigrationSource {
    /// Text embedded in the program.
    Inline(String),
    /// A UTF-8 file on disk.
    File(PathBuf),
}

/// One named, ordered set of schema-change statements.
///
/// Ordering is the position in the caller-supplied list; there is no other
/// dependency relation between migrations. The struct is immutable once
/// constructed and its text is loaded fresh on every run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Migration {
    /// Unique name for the migration.
    pub name: String,
    /// Where the statement text lives.
    pub source: MigrationSource,
    /// How the text is submitted to the database.
    pub mode: ExecutionMode,
}

impl Migration {
    /// Create a migration from inline SQL, split on statement boundaries.
    pub fn inline(name: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: MigrationSource::Inline(sql.into()),
            mode: ExecutionMode::Split,
        }
    }

    /// Create a migration backed by a file, split on statement boundaries.
    pub fn from_file(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            source: MigrationSource::File(path.into()),
            mode: ExecutionMode::Split,
        }
    }

    /// Submit the whole text as one multi-statement execution.
    ///
    /// Required for sources whose bodies contain `;` inside string literals
    /// or procedural blocks, which the splitter cannot handle.
    pub fn batch(mut self) -> Self {
        self.mode = ExecutionMode::Batch;
        self
    }

    /// Set the execution mode explicitly.
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Resolve the migration to its statement text.
    ///
    /// Fails with [`MigrateError::SourceNotFound`] if the backing file is
    /// absent, or [`MigrateError::SourceUnreadable`] for any other read
    /// failure. The read is the only side effect.
    pub async fn load(&self) -> MigrateResult<String> {
        match &self.source {
            MigrationSource::Inline(sql) => Ok(sql.clone()),
            MigrationSource::File(path) => {
                debug!(migration = %self.name, path = %path.display(), "loading migration source");
                match tokio::fs::read_to_string(path).await {
                    Ok(text) => Ok(text),
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                        Err(MigrateError::SourceNotFound {
                            name: self.name.clone(),
                            path: path.clone(),
                        })
                    }
                    Err(e) => Err(MigrateError::SourceUnreadable {
                        name: self.name.clone(),
                        source: e,
                    }),
                }
            }
        }
    }
}

/// Compute the SHA-256 checksum of migration text.
pub fn compute_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_defaults_to_split() {
        let m = Migration::inline("0001_users", "CREATE TABLE users (id INT);");
        assert_eq!(m.name, "0001_users");
        assert_eq!(m.mode, ExecutionMode::Split);
    }

    #[test]
    fn test_batch_builder() {
        let m = Migration::inline("0002_triggers", "DO $$ BEGIN END $$;").batch();
        assert_eq!(m.mode, ExecutionMode::Batch);
    }

    #[tokio::test]
    async fn test_load_inline() {
        let m = Migration::inline("m", "SELECT 1;");
        assert_eq!(m.load().await.unwrap(), "SELECT 1;");
    }

    #[tokio::test]
    async fn test_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("0001_users.sql");
        std::fs::write(&path, "CREATE TABLE users (id INT);").unwrap();

        let m = Migration::from_file("0001_users", &path);
        let text = m.load().await.unwrap();
        assert_eq!(text, "CREATE TABLE users (id INT);");
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let m = Migration::from_file("nope", "/definitely/not/here.sql");
        let err = m.load().await.unwrap_err();
        assert!(matches!(err, MigrateError::SourceNotFound { .. }));
        assert!(err.is_source_error());
    }

    #[test]
    fn test_compute_checksum() {
        let a = compute_checksum("CREATE TABLE users ();");
        let b = compute_checksum("CREATE TABLE users ();");
        let c = compute_checksum("DROP TABLE users;");

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }
}
