//! `updraft status`: report the current and latest release.

use std::time::Duration;

use anyhow::Result;
use colored::Colorize;

use super::CliConfig;
use crate::config::{Defaults, EnvOverrides, Options};
use crate::constants::CURRENT_VERSION;
use crate::upgrade::{CheckResult, check_and_update};

/// Run a fresh check without installing and print the outcome.
///
/// The cache is bypassed with a zero check interval, but the result is still
/// written back to it.
pub async fn execute(config: &CliConfig, env: EnvOverrides) -> Result<()> {
    let options = Options {
        auto_update: false,
        check_interval: Some(Duration::ZERO),
        ..config.update_options(env)
    };

    let result = check_and_update(options, &Defaults::standard()).await?;
    println!("{}", describe(CURRENT_VERSION, &result));
    Ok(())
}

/// One-line summary of a status check.
#[must_use]
pub fn describe(current_version: &str, result: &CheckResult) -> String {
    if let Some(reason) = result.skip_reason {
        return format!("updraft {current_version} (update check skipped: {reason})");
    }

    match (&result.latest_version, result.update_available) {
        (Some(latest), true) => format!(
            "updraft {} ({})",
            current_version,
            format!("update available: {latest}").yellow()
        ),
        _ => format!("updraft {} ({})", current_version, "up to date".green()),
    }
}
