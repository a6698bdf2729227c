//! # Strata
//!
//! Ordered, idempotent SQL schema migrations.
//!
//! Strata applies a named, ordered list of schema-change migrations to a
//! database, tolerating already-applied changes and reporting a per-migration
//! outcome:
//! - Migrations run in declared order, never discovered by globbing
//! - Failures whose cause is "the change is already there" are classified
//!   benign and recovered locally
//! - Sources with semicolons inside procedural bodies run in whole-batch mode
//! - The run produces a structured report, one outcome per declared migration
//!
//! This crate re-exports the engine from `strata-migrate`. Database drivers
//! live in `strata-postgres`; the `strata` binary in `strata-cli`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use strata::{Migration, MigrationRunner};
//! use strata_postgres::PgClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PgClient::connect_url("postgresql://localhost/app").await?;
//!
//!     let migrations = vec![
//!         Migration::from_file("0001_users", "migrations/0001_users.sql"),
//!         Migration::from_file("0002_orders", "migrations/0002_orders.sql"),
//!     ];
//!
//!     let report = MigrationRunner::new(&client).run(&migrations).await?;
//!     println!("{}", report.summary());
//!
//!     std::process::exit(if report.succeeded() { 0 } else { 1 });
//! }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub use strata_migrate::{
    Classification, ContinuationPolicy, ExecutionMode, ExecutionOutcome, HistoryTable,
    IdempotencyGuard, MigrateError, MigrateResult, Migration, MigrationExecutor, MigrationReport,
    MigrationRunner, MigrationSource, Outcome, Probe, RunReport, RunnerConfig, SqlExecutor,
    StatementError, StatementErrorKind, split_statements,
};

/// Engine modules, for callers that want the full paths.
pub mod migrate {
    pub use strata_migrate::*;
}
