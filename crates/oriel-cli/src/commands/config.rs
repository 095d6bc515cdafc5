use std::process::ExitCode;

use oriel_config::OrielConfig;

use crate::cli::GlobalFlags;
use crate::output::output;

/// Handle `oriel config`: print the merged configuration.
pub fn handle(config: &OrielConfig, flags: &GlobalFlags) -> anyhow::Result<ExitCode> {
    output(config, flags.format)?;
    Ok(ExitCode::SUCCESS)
}
