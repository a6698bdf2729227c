//! Strata CLI - ordered, idempotent SQL schema migrations.

use std::process::ExitCode;

use clap::Parser;

use strata_cli::cli::{Cli, Command};
use strata_cli::commands;
use strata_cli::error::CliResult;
use strata_cli::output;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    // Exit codes: 0 = all migrations succeeded or were benign, 1 = at least
    // one genuine failure, 2 = usage or configuration error.
    match run().await {
        Ok(code) => code,
        Err(e) => {
            output::newline();
            output::error(&e.to_string());
            ExitCode::from(2)
        }
    }
}

async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Command::Apply(args) => commands::apply::run(args).await,
        Command::Verify(args) => commands::verify::run(args).await,
        Command::List(args) => commands::list::run(args),
        Command::Version => commands::version::run(),
    }
}
