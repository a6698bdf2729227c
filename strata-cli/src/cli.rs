//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Strata - ordered, idempotent SQL schema migrations
#[derive(Parser, Debug)]
#[command(name = "strata")]
#[command(version)]
#[command(about = "Strata - ordered, idempotent SQL schema migrations", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply the migrations declared in the manifest, in order
    Apply(ApplyArgs),

    /// Run the manifest's verification probes against the database
    Verify(VerifyArgs),

    /// List the migrations declared in the manifest without connecting
    List(ListArgs),

    /// Display version information
    Version,
}

/// Arguments for the `apply` command
#[derive(Args, Debug)]
pub struct ApplyArgs {
    /// Path to the migration manifest
    #[arg(short, long, default_value = "strata.toml")]
    pub manifest: PathBuf,

    /// Database connection URL
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Attempt every migration even after a failure, collecting all outcomes
    #[arg(long)]
    pub continue_on_failure: bool,

    /// Run each migration inside its own transaction
    #[arg(long)]
    pub transactional: bool,

    /// Record applied migrations in a history table
    #[arg(long)]
    pub history: bool,

    /// Name of the history table (only meaningful with --history)
    #[arg(long, default_value = "_strata_history")]
    pub history_table: String,

    /// Print the run report as JSON instead of styled text
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `verify` command
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Path to the migration manifest
    #[arg(short, long, default_value = "strata.toml")]
    pub manifest: PathBuf,

    /// Database connection URL
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,
}

/// Arguments for the `list` command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Path to the migration manifest
    #[arg(short, long, default_value = "strata.toml")]
    pub manifest: PathBuf,
}
