//! `strata apply` command - apply the manifest's migrations in order.

use std::path::Path;
use std::process::ExitCode;

use strata_migrate::{
    ContinuationPolicy, HistoryTable, MigrationRunner, Outcome, RunReport, RunnerConfig,
};
use strata_postgres::PgClient;

use crate::cli::ApplyArgs;
use crate::config::Manifest;
use crate::error::{CliError, CliResult};
use crate::output;

/// Run the apply command
pub async fn run(args: ApplyArgs) -> CliResult<ExitCode> {
    if !args.json {
        output::header("Apply Migrations");
    }

    let manifest = Manifest::load(&args.manifest)?;
    let base = args.manifest.parent().unwrap_or_else(|| Path::new("."));
    let migrations = manifest.to_migrations(base);

    if migrations.is_empty() {
        output::warn("manifest declares no migrations");
        return Ok(ExitCode::SUCCESS);
    }

    if !args.json {
        output::kv("Manifest", &args.manifest.display().to_string());
        output::kv("Migrations", &migrations.len().to_string());
        output::kv(
            "Policy",
            if args.continue_on_failure {
                "continue and collect"
            } else {
                "stop on failure"
            },
        );
    }

    let client = PgClient::connect_url(&args.database_url).await?;

    let mut config = RunnerConfig::new()
        .policy(if args.continue_on_failure {
            ContinuationPolicy::ContinueAndCollect
        } else {
            ContinuationPolicy::StopOnFailure
        })
        .transactional(args.transactional);
    if args.history {
        config = config.with_history(HistoryTable::new(&args.history_table));
    }

    let report = MigrationRunner::new(&client)
        .with_config(config)
        .run(&migrations)
        .await?;

    if args.json {
        let rendered = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::config(format!("could not render report: {}", e)))?;
        println!("{}", rendered);
    } else {
        render(&report);
    }

    Ok(if report.succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn render(report: &RunReport) {
    output::newline();
    for m in &report.migrations {
        match m.outcome {
            Outcome::Applied => {
                output::success(&format!("{} applied ({}ms)", m.name, m.duration_ms));
            }
            Outcome::AlreadyApplied => {
                output::info(&format!("{} already applied", m.name));
            }
            Outcome::Failed => {
                output::error(&format!(
                    "{} failed: {}",
                    m.name,
                    m.message.as_deref().unwrap_or("unknown error")
                ));
            }
            Outcome::Skipped => {
                output::warn(&format!(
                    "{} skipped ({})",
                    m.name,
                    m.message.as_deref().unwrap_or("not attempted")
                ));
            }
        }
    }
    output::newline();

    if report.succeeded() {
        output::success(&report.summary());
    } else {
        output::error(&report.summary());
    }
}
