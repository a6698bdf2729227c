//! Per-migration execution.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::client::{SqlExecutor, StatementError};
use crate::guard::{Classification, IdempotencyGuard};
use crate::source::Migration;
use crate::split::split_statements;

/// How a migration's text is submitted to the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Split on `;` and execute statement by statement, classifying each
    /// failure through the idempotency guard.
    Split,
    /// Submit the whole text as one multi-statement execution. Any failure is
    /// genuine; per-statement classification is forgone.
    Batch,
}

/// Result of executing one migration.
#[derive(Debug)]
pub enum ExecutionOutcome {
    /// At least one statement took effect.
    Applied,
    /// Every statement was classified benign; the migration had already run.
    AlreadyApplied,
    /// A genuine error stopped the migration. Statements already executed
    /// stay applied unless the executor ran transactionally.
    Failed(StatementError),
}

impl ExecutionOutcome {
    /// Check whether the migration failed.
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Savepoint name used around each statement in transactional split mode.
const STMT_SAVEPOINT: &str = "strata_stmt";

/// Executes one migration's statements against a database client.
///
/// With `transactional` enabled each migration runs inside its own
/// transaction; in split mode a savepoint wraps every statement so a benign
/// failure can be rolled back to the savepoint instead of poisoning the open
/// transaction. Cross-migration atomicity is never provided.
pub struct MigrationExecutor<'a, E: ?Sized> {
    client: &'a E,
    guard: IdempotencyGuard,
    transactional: bool,
}

impl<'a, E: SqlExecutor + ?Sized> MigrationExecutor<'a, E> {
    /// Create an executor with the default idempotency guard, not
    /// transactional.
    pub fn new(client: &'a E) -> Self {
        Self {
            client,
            guard: IdempotencyGuard::new(),
            transactional: false,
        }
    }

    /// Replace the idempotency guard.
    pub fn with_guard(mut self, guard: IdempotencyGuard) -> Self {
        self.guard = guard;
        self
    }

    /// Run each migration inside its own transaction.
    pub fn transactional(mut self, on: bool) -> Self {
        self.transactional = on;
        self
    }

    /// Execute a loaded migration's statements in order.
    ///
    /// Never returns an error as such: every failure is folded into the
    /// outcome so the runner can aggregate it as data.
    pub async fn execute(&self, migration: &Migration, text: &str) -> ExecutionOutcome {
        match migration.mode {
            ExecutionMode::Batch => self.execute_batch(migration, text).await,
            ExecutionMode::Split => self.execute_split(migration, text).await,
        }
    }

    async fn execute_batch(&self, migration: &Migration, text: &str) -> ExecutionOutcome {
        debug!(migration = %migration.name, "submitting batch");

        if self.transactional {
            if let Err(e) = self.client.execute("BEGIN").await {
                return ExecutionOutcome::Failed(e);
            }
        }

        match self.client.batch_execute(text).await {
            Ok(()) => {
                if self.transactional {
                    if let Err(e) = self.client.execute("COMMIT").await {
                        return ExecutionOutcome::Failed(e);
                    }
                }
                info!(migration = %migration.name, "batch applied");
                ExecutionOutcome::Applied
            }
            Err(e) => {
                if self.transactional && !e.is_connection_lost() {
                    self.try_rollback().await;
                }
                ExecutionOutcome::Failed(e)
            }
        }
    }

    async fn execute_split(&self, migration: &Migration, text: &str) -> ExecutionOutcome {
        if self.transactional {
            if let Err(e) = self.client.execute("BEGIN").await {
                return ExecutionOutcome::Failed(e);
            }
        }

        let mut total = 0usize;
        let mut benign = 0usize;

        for stmt in split_statements(text) {
            total += 1;
            debug!(migration = %migration.name, sql = %stmt, "executing statement");

            if self.transactional {
                if let Err(e) = self
                    .client
                    .execute(&format!("SAVEPOINT {}", STMT_SAVEPOINT))
                    .await
                {
                    self.try_rollback().await;
                    return ExecutionOutcome::Failed(e);
                }
            }

            match self.client.execute(stmt).await {
                Ok(()) => {
                    if self.transactional {
                        if let Err(e) = self
                            .client
                            .execute(&format!("RELEASE SAVEPOINT {}", STMT_SAVEPOINT))
                            .await
                        {
                            self.try_rollback().await;
                            return ExecutionOutcome::Failed(e);
                        }
                    }
                }
                Err(e) => match self.guard.classify(&e) {
                    Classification::Benign => {
                        warn!(
                            migration = %migration.name,
                            error = %e,
                            "statement no-op: effect already present"
                        );
                        benign += 1;
                        if self.transactional {
                            if let Err(e2) = self
                                .client
                                .execute(&format!("ROLLBACK TO SAVEPOINT {}", STMT_SAVEPOINT))
                                .await
                            {
                                self.try_rollback().await;
                                return ExecutionOutcome::Failed(e2);
                            }
                        }
                    }
                    Classification::Genuine => {
                        if self.transactional && !e.is_connection_lost() {
                            self.try_rollback().await;
                        }
                        return ExecutionOutcome::Failed(e);
                    }
                },
            }
        }

        if self.transactional {
            if let Err(e) = self.client.execute("COMMIT").await {
                return ExecutionOutcome::Failed(e);
            }
        }

        if total > 0 && benign == total {
            info!(migration = %migration.name, "already applied");
            ExecutionOutcome::AlreadyApplied
        } else {
            info!(migration = %migration.name, statements = total, "applied");
            ExecutionOutcome::Applied
        }
    }

    async fn try_rollback(&self) {
        if let Err(e) = self.client.execute("ROLLBACK").await {
            warn!(error = %e, "rollback after failure did not complete");
        }
    }
}
