//! `strata version` command - display version information.

use std::process::ExitCode;

use crate::error::CliResult;
use crate::output::kv;

/// Package version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run the version command
pub fn run() -> CliResult<ExitCode> {
    kv("Version", VERSION);
    kv("Binary", "strata");

    #[cfg(debug_assertions)]
    let build_mode = "debug";
    #[cfg(not(debug_assertions))]
    let build_mode = "release";

    kv("Build", build_mode);

    Ok(ExitCode::SUCCESS)
}
