//! # strata-postgres
//!
//! PostgreSQL client for the Strata migration engine: a single
//! `tokio-postgres` connection implementing
//! [`strata_migrate::SqlExecutor`], plus database-URL parsing.
//!
//! ## Example
//!
//! ```rust,ignore
//! use strata_migrate::{Migration, MigrationRunner};
//! use strata_postgres::PgClient;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = PgClient::connect_url("postgresql://localhost/app").await?;
//! let migrations = vec![Migration::from_file("0001_users", "migrations/0001_users.sql")];
//! let report = MigrationRunner::new(&client).run(&migrations).await?;
//! println!("{}", report.summary());
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod client;
pub mod config;
pub mod error;

pub use client::PgClient;
pub use config::{PgConfig, SslMode};
pub use error::{PgError, PgResult};
