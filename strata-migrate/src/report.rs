//! Run reports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Per-migration result, flattened for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// At least one statement took effect.
    Applied,
    /// Every statement was a benign no-op; the migration had already run.
    AlreadyApplied,
    /// A genuine error stopped the migration.
    Failed,
    /// Never attempted because an earlier migration failed.
    Skipped,
}

/// The recorded result of one migration in a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationReport {
    /// Migration name.
    pub name: String,
    /// What happened.
    pub outcome: Outcome,
    /// Error or informational message, when there is one.
    pub message: Option<String>,
    /// Wall-clock duration of the attempt in milliseconds.
    pub duration_ms: u64,
}

/// Ordered outcomes for every declared migration in a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// One entry per declared migration, in declaration order.
    pub migrations: Vec<MigrationReport>,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl RunReport {
    /// Create an empty report stamped with the current time.
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            migrations: Vec::new(),
            duration_ms: 0,
        }
    }

    /// True iff no migration failed. Skipped and already-applied entries do
    /// not count against success.
    pub fn succeeded(&self) -> bool {
        !self
            .migrations
            .iter()
            .any(|m| m.outcome == Outcome::Failed)
    }

    /// Number of migrations with the given outcome.
    pub fn count(&self, outcome: Outcome) -> usize {
        self.migrations
            .iter()
            .filter(|m| m.outcome == outcome)
            .count()
    }

    /// Get a one-line summary of the run.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();

        let applied = self.count(Outcome::Applied);
        if applied > 0 {
            parts.push(format!("{} applied", applied));
        }

        let already = self.count(Outcome::AlreadyApplied);
        if already > 0 {
            parts.push(format!("{} already applied", already));
        }

        let failed = self.count(Outcome::Failed);
        if failed > 0 {
            parts.push(format!("{} failed", failed));
        }

        let skipped = self.count(Outcome::Skipped);
        if skipped > 0 {
            parts.push(format!("{} skipped", skipped));
        }

        if parts.is_empty() {
            "no migrations run".to_string()
        } else {
            format!("{} in {}ms", parts.join(", "), self.duration_ms)
        }
    }

    pub(crate) fn push(
        &mut self,
        name: impl Into<String>,
        outcome: Outcome,
        message: Option<String>,
        duration_ms: u64,
    ) {
        self.migrations.push(MigrationReport {
            name: name.into(),
            outcome,
            message,
            duration_ms,
        });
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}
