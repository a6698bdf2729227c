//! `strata list` command - show the declared migration order.

use std::process::ExitCode;

use strata_migrate::ExecutionMode;

use crate::cli::ListArgs;
use crate::config::Manifest;
use crate::error::CliResult;
use crate::output;

/// Run the list command
pub fn run(args: ListArgs) -> CliResult<ExitCode> {
    output::header("Declared Migrations");

    let manifest = Manifest::load(&args.manifest)?;
    if manifest.migrations.is_empty() {
        output::warn("manifest declares no migrations");
        return Ok(ExitCode::SUCCESS);
    }

    let total = manifest.migrations.len();
    for (i, entry) in manifest.migrations.iter().enumerate() {
        let source = match (&entry.file, &entry.sql) {
            (Some(file), _) => file.display().to_string(),
            _ => "<inline>".to_string(),
        };
        let mode = match entry.mode {
            ExecutionMode::Split => "split",
            ExecutionMode::Batch => "batch",
        };
        output::step(i + 1, total, &format!("{} ({}, {})", entry.name, source, mode));
    }

    if !manifest.probes.is_empty() {
        output::newline();
        for probe in &manifest.probes {
            output::kv("Probe", &probe.describe());
        }
    }

    Ok(ExitCode::SUCCESS)
}
