//! Optional applied-migration bookkeeping.
//!
//! Idempotency in this engine is entirely guard-based; no table is consulted
//! to decide whether a migration runs. The history table is additive
//! bookkeeping for operators: when enabled, every applied or already-applied
//! migration is recorded with its checksum and timing. It is never read back
//! to skip work.

use tracing::debug;

use crate::client::SqlExecutor;
use crate::error::MigrateResult;
use crate::report::Outcome;

/// Default name for the history table.
pub const DEFAULT_HISTORY_TABLE: &str = "_strata_history";

/// Write-only record of applied migrations.
#[derive(Debug, Clone)]
pub struct HistoryTable {
    table: String,
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_TABLE)
    }
}

impl HistoryTable {
    /// Create a history table with a custom name.
    ///
    /// The name is interpolated into DDL/DML and must be a plain identifier
    /// under the caller's control, never user input.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }

    /// The table name.
    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// DDL for creating the history table, itself idempotent.
    pub fn init_sql(&self) -> String {
        format!(
            r#"CREATE TABLE IF NOT EXISTS "{}" (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(255) NOT NULL,
    checksum VARCHAR(64) NOT NULL,
    outcome VARCHAR(32) NOT NULL,
    applied_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
    duration_ms BIGINT NOT NULL DEFAULT 0
)"#,
            self.table
        )
    }

    /// Create the history table if it does not exist.
    pub async fn initialize<E: SqlExecutor + ?Sized>(&self, client: &E) -> MigrateResult<()> {
        debug!(table = %self.table, "initializing history table");
        client.execute(&self.init_sql()).await?;
        Ok(())
    }

    /// Record the outcome of one migration.
    pub async fn record<E: SqlExecutor + ?Sized>(
        &self,
        client: &E,
        name: &str,
        checksum: &str,
        outcome: Outcome,
        duration_ms: u64,
    ) -> MigrateResult<()> {
        let outcome = match outcome {
            Outcome::Applied => "applied",
            Outcome::AlreadyApplied => "already_applied",
            Outcome::Failed => "failed",
            Outcome::Skipped => "skipped",
        };
        let duration = duration_ms.to_string();
        let sql = format!(
            "INSERT INTO \"{}\" (name, checksum, outcome, duration_ms) \
             VALUES ($1, $2, $3, $4::bigint)",
            self.table
        );
        client
            .execute_params(&sql, &[name, checksum, outcome, &duration])
            .await?;
        Ok(())
    }
}
