//! Ordered execution of a migration list.

use std::time::Instant;

use tracing::{info, warn};

use crate::client::SqlExecutor;
use crate::error::MigrateResult;
use crate::executor::{ExecutionOutcome, MigrationExecutor};
use crate::guard::IdempotencyGuard;
use crate::history::HistoryTable;
use crate::report::{Outcome, RunReport};
use crate::source::{compute_checksum, Migration};

/// What the runner does after a migration fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContinuationPolicy {
    /// Halt at the first genuine failure; remaining migrations are recorded
    /// as skipped and their statements never reach the database.
    #[default]
    StopOnFailure,
    /// Attempt every migration regardless of earlier failures and collect
    /// all outcomes. A lost connection still ends the run.
    ContinueAndCollect,
}

/// Runner configuration.
#[derive(Debug, Clone, Default)]
pub struct RunnerConfig {
    /// Continuation policy after a failure.
    pub policy: ContinuationPolicy,
    /// Run each migration inside its own transaction.
    pub transactional: bool,
    /// Record applied migrations in a history table. Off by default;
    /// idempotency never depends on it.
    pub history: Option<HistoryTable>,
}

impl RunnerConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the continuation policy.
    pub fn policy(mut self, policy: ContinuationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run each migration inside its own transaction.
    pub fn transactional(mut self, on: bool) -> Self {
        self.transactional = on;
        self
    }

    /// Enable history bookkeeping.
    pub fn with_history(mut self, history: HistoryTable) -> Self {
        self.history = Some(history);
        self
    }
}

/// Orchestrates execution of an ordered migration list against one client.
///
/// Strictly sequential: a migration is not started until the previous one has
/// finished, and declaration order is preserved under every policy.
pub struct MigrationRunner<'a, E: ?Sized> {
    client: &'a E,
    config: RunnerConfig,
    guard: IdempotencyGuard,
}

impl<'a, E: SqlExecutor + ?Sized> MigrationRunner<'a, E> {
    /// Create a runner with the default configuration and guard.
    pub fn new(client: &'a E) -> Self {
        Self {
            client,
            config: RunnerConfig::default(),
            guard: IdempotencyGuard::new(),
        }
    }

    /// Replace the configuration.
    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the idempotency guard.
    pub fn with_guard(mut self, guard: IdempotencyGuard) -> Self {
        self.guard = guard;
        self
    }

    /// Load and execute every migration in declaration order.
    ///
    /// Per-migration failures are data in the returned report, never errors.
    /// The only `Err` paths are setup failures before any migration runs
    /// (history-table initialization).
    pub async fn run(&self, migrations: &[Migration]) -> MigrateResult<RunReport> {
        let start = Instant::now();
        let mut report = RunReport::new();

        if let Some(history) = &self.config.history {
            history.initialize(self.client).await?;
        }

        let executor = MigrationExecutor::new(self.client)
            .with_guard(self.guard.clone())
            .transactional(self.config.transactional);

        // Once set, remaining migrations are recorded as skipped.
        let mut halted: Option<String> = None;

        for migration in migrations {
            if let Some(reason) = &halted {
                report.push(&migration.name, Outcome::Skipped, Some(reason.clone()), 0);
                continue;
            }

            let unit_start = Instant::now();

            let text = match migration.load().await {
                Ok(text) => text,
                Err(e) => {
                    warn!(migration = %migration.name, error = %e, "source unavailable");
                    let duration_ms = unit_start.elapsed().as_millis() as u64;
                    report.push(
                        &migration.name,
                        Outcome::Failed,
                        Some(e.to_string()),
                        duration_ms,
                    );
                    if self.config.policy == ContinuationPolicy::StopOnFailure {
                        halted = Some(format!("not attempted: '{}' failed", migration.name));
                    }
                    continue;
                }
            };
            let checksum = compute_checksum(&text);

            match executor.execute(migration, &text).await {
                ExecutionOutcome::Applied => {
                    let duration_ms = unit_start.elapsed().as_millis() as u64;
                    report.push(&migration.name, Outcome::Applied, None, duration_ms);
                    self.record(&migration.name, &checksum, Outcome::Applied, duration_ms)
                        .await;
                }
                ExecutionOutcome::AlreadyApplied => {
                    let duration_ms = unit_start.elapsed().as_millis() as u64;
                    report.push(&migration.name, Outcome::AlreadyApplied, None, duration_ms);
                    self.record(
                        &migration.name,
                        &checksum,
                        Outcome::AlreadyApplied,
                        duration_ms,
                    )
                    .await;
                }
                ExecutionOutcome::Failed(e) => {
                    let duration_ms = unit_start.elapsed().as_millis() as u64;
                    let lost = e.is_connection_lost();
                    warn!(migration = %migration.name, error = %e, "migration failed");
                    report.push(
                        &migration.name,
                        Outcome::Failed,
                        Some(e.to_string()),
                        duration_ms,
                    );

                    if lost {
                        // Continuing after a lost connection is meaningless.
                        halted = Some("not attempted: connection lost".to_string());
                    } else if self.config.policy == ContinuationPolicy::StopOnFailure {
                        halted = Some(format!("not attempted: '{}' failed", migration.name));
                    }
                }
            }
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        info!(summary = %report.summary(), "migration run finished");
        Ok(report)
    }

    async fn record(&self, name: &str, checksum: &str, outcome: Outcome, duration_ms: u64) {
        if let Some(history) = &self.config.history {
            if let Err(e) = history
                .record(self.client, name, checksum, outcome, duration_ms)
                .await
            {
                warn!(migration = %name, error = %e, "could not record history entry");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RunnerConfig::default();
        assert_eq!(config.policy, ContinuationPolicy::StopOnFailure);
        assert!(!config.transactional);
        assert!(config.history.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = RunnerConfig::new()
            .policy(ContinuationPolicy::ContinueAndCollect)
            .transactional(true)
            .with_history(HistoryTable::default());

        assert_eq!(config.policy, ContinuationPolicy::ContinueAndCollect);
        assert!(config.transactional);
        assert!(config.history.is_some());
    }
}
