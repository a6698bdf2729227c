//! # strata-migrate
//!
//! Migration engine for Strata: applies a named, ordered list of SQL
//! schema-change migrations to a database, tolerating already-applied changes
//! and reporting a per-migration outcome.
//!
//! This crate provides:
//! - Migration sources (inline SQL or files) loaded fresh per run
//! - Naive `;` statement splitting, with a whole-batch mode for sources the
//!   splitter cannot handle
//! - An idempotency guard that classifies statement failures as benign
//!   (effect already present) or genuine
//! - A per-migration executor and an ordered runner with stop-on-failure and
//!   continue-and-collect policies
//! - Verification probes against `information_schema`
//! - Optional, additive history bookkeeping
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐      ┌──────────────┐
//! │ Migration    │────▶│ Splitter     │─────▶│ Executor     │
//! │ (source)     │     │ (split mode) │      │ + Guard      │
//! └──────────────┘     └──────────────┘      └──────┬───────┘
//!        ▲                                          │
//!        │              ┌──────────────┐            ▼
//!        └──────────────│ Runner       │◀──── ExecutionOutcome
//!                       │ (ordered)    │────▶ RunReport
//!                       └──────────────┘
//! ```
//!
//! Idempotency is guard-based, not bookkeeping-based: whether a migration
//! "already ran" is decided by `IF NOT EXISTS`-style DDL and by classifying
//! duplicate-object errors, never by consulting a version table.
//!
//! ## Example
//!
//! ```rust,ignore
//! use strata_migrate::{ContinuationPolicy, Migration, MigrationRunner, RunnerConfig};
//!
//! async fn migrate(client: &impl strata_migrate::SqlExecutor) -> strata_migrate::MigrateResult<()> {
//!     let migrations = vec![
//!         Migration::from_file("0001_users", "migrations/0001_users.sql"),
//!         Migration::from_file("0002_orders", "migrations/0002_orders.sql"),
//!         // Contains a DO $$ ... $$ block; must not be split.
//!         Migration::from_file("0003_backfill", "migrations/0003_backfill.sql").batch(),
//!     ];
//!
//!     let runner = MigrationRunner::new(client)
//!         .with_config(RunnerConfig::new().policy(ContinuationPolicy::StopOnFailure));
//!     let report = runner.run(&migrations).await?;
//!
//!     println!("{}", report.summary());
//!     Ok(())
//! }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod client;
pub mod error;
pub mod executor;
pub mod guard;
pub mod history;
pub mod probe;
pub mod report;
pub mod runner;
pub mod source;
pub mod split;

pub use client::{SqlExecutor, StatementError, StatementErrorKind};
pub use error::{MigrateError, MigrateResult};
pub use executor::{ExecutionMode, ExecutionOutcome, MigrationExecutor};
pub use guard::{Classification, IdempotencyGuard};
pub use history::HistoryTable;
pub use probe::Probe;
pub use report::{MigrationReport, Outcome, RunReport};
pub use runner::{ContinuationPolicy, MigrationRunner, RunnerConfig};
pub use source::{Migration, MigrationSource};
pub use split::split_statements;
