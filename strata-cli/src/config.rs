//! Migration manifest loading.
//!
//! The manifest is a TOML file declaring the ordered migration list and any
//! verification probes. Declaration order in the file is execution order;
//! nothing is discovered by globbing.
//!
//! ```toml
//! [[migration]]
//! name = "0001_users"
//! file = "migrations/0001_users.sql"
//!
//! [[migration]]
//! name = "0002_backfill"
//! file = "migrations/0002_backfill.sql"
//! mode = "batch"          # contains a DO $$ ... $$ block
//!
//! [[probe]]
//! table = "users"
//! column = "email"
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use strata_migrate::{ExecutionMode, Migration, Probe};

use crate::error::{CliError, CliResult};

/// A parsed migration manifest.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Declared migrations, in execution order.
    #[serde(default, rename = "migration")]
    pub migrations: Vec<MigrationEntry>,

    /// Verification probes.
    #[serde(default, rename = "probe")]
    pub probes: Vec<ProbeEntry>,
}

/// One declared migration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrationEntry {
    /// Unique migration name.
    pub name: String,

    /// SQL file, relative to the manifest.
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Inline SQL, as an alternative to `file`.
    #[serde(default)]
    pub sql: Option<String>,

    /// Execution mode; `split` unless declared otherwise.
    #[serde(default = "default_mode")]
    pub mode: ExecutionMode,
}

fn default_mode() -> ExecutionMode {
    ExecutionMode::Split
}

/// One declared verification probe.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeEntry {
    /// Relation name.
    pub table: String,

    /// Column to check; the probe checks the table itself when absent.
    #[serde(default)]
    pub column: Option<String>,

    /// Explicit schema; the connection's current schema when absent.
    #[serde(default)]
    pub schema: Option<String>,
}

impl ProbeEntry {
    /// Human-readable description for output.
    pub fn describe(&self) -> String {
        match &self.column {
            Some(column) => format!("column {}.{}", self.table, column),
            None => format!("table {}", self.table),
        }
    }

    /// Convert to an engine probe.
    pub fn to_probe(&self) -> Probe {
        let probe = match &self.column {
            Some(column) => Probe::column_exists(&self.table, column),
            None => Probe::table_exists(&self.table),
        };
        match &self.schema {
            Some(schema) => probe.in_schema(schema),
            None => probe,
        }
    }
}

impl Manifest {
    /// Load and validate a manifest from disk.
    pub fn load(path: &Path) -> CliResult<Self> {
        if !path.exists() {
            return Err(CliError::config(format!(
                "manifest not found: {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        let manifest: Manifest = toml::from_str(&content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> CliResult<()> {
        let mut seen = HashSet::new();
        for entry in &self.migrations {
            if !seen.insert(entry.name.as_str()) {
                return Err(CliError::config(format!(
                    "duplicate migration name: {}",
                    entry.name
                )));
            }
            match (&entry.file, &entry.sql) {
                (Some(_), Some(_)) => {
                    return Err(CliError::config(format!(
                        "migration '{}' declares both file and sql",
                        entry.name
                    )));
                }
                (None, None) => {
                    return Err(CliError::config(format!(
                        "migration '{}' declares neither file nor sql",
                        entry.name
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Build the ordered migration list, resolving file paths relative to
    /// `base` (the manifest's directory).
    pub fn to_migrations(&self, base: &Path) -> Vec<Migration> {
        self.migrations
            .iter()
            .map(|entry| {
                let migration = match (&entry.file, &entry.sql) {
                    (Some(file), _) => Migration::from_file(&entry.name, base.join(file)),
                    (None, Some(sql)) => Migration::inline(&entry.name, sql),
                    // Rejected by validate().
                    (None, None) => unreachable!("manifest entry without a source"),
                };
                migration.with_mode(entry.mode)
            })
            .collect()
    }
}
