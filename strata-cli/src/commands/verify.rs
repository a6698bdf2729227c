//! `strata verify` command - check the intended end-state directly.

use std::process::ExitCode;

use strata_postgres::PgClient;

use crate::cli::VerifyArgs;
use crate::config::Manifest;
use crate::error::CliResult;
use crate::output;

/// Run the verify command
pub async fn run(args: VerifyArgs) -> CliResult<ExitCode> {
    output::header("Verify Schema");

    let manifest = Manifest::load(&args.manifest)?;
    if manifest.probes.is_empty() {
        output::warn("manifest declares no probes");
        return Ok(ExitCode::SUCCESS);
    }

    let client = PgClient::connect_url(&args.database_url).await?;

    let mut failures = 0usize;
    for entry in &manifest.probes {
        let present = entry.to_probe().check(&client).await?;
        if present {
            output::success(&format!("{} exists", entry.describe()));
        } else {
            output::error(&format!("{} is missing", entry.describe()));
            failures += 1;
        }
    }

    output::newline();
    if failures == 0 {
        output::success(&format!("{} probes passed", manifest.probes.len()));
        Ok(ExitCode::SUCCESS)
    } else {
        output::error(&format!(
            "{} of {} probes failed",
            failures,
            manifest.probes.len()
        ));
        Ok(ExitCode::FAILURE)
    }
}
