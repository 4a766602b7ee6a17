//! The update check run before every command.
//!
//! Failures here never stop the requested command: they are printed and the
//! run carries on with the binary already on disk.

use std::ffi::OsString;
use std::future::Future;
use std::io;
use std::path::Path;

use tracing::{debug, info};

use super::CliConfig;
use crate::config::{Defaults, EnvOverrides, Options};
use crate::upgrade::{check_and_update, restart::restart};

/// Exit code reported when Ctrl-C interrupts the check.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Check for an update with auto-update on, racing Ctrl-C.
///
/// Returns `Some(code)` when the process should exit right away: either the
/// binary was replaced and re-executed, in which case `code` is the child's
/// exit code, or the user interrupted the check. Returns `None` to continue
/// with the requested command.
pub async fn run_update_check(config: &CliConfig, env: EnvOverrides) -> Option<i32> {
    let options = Options {
        auto_update: true,
        ..config.update_options(env)
    };
    let defaults = Defaults::standard();

    let ctrl_c = async {
        let signal = tokio::signal::ctrl_c().await;
        if let Err(e) = &signal {
            debug!("Cannot listen for Ctrl-C during the update check: {}", e);
        }
        signal
    };
    let Some(result) = until_interrupted(check_and_update(options, &defaults), ctrl_c).await else {
        debug!("Update check interrupted");
        return Some(INTERRUPTED_EXIT_CODE);
    };

    let result = match result {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Update check failed: {e:#}");
            return None;
        }
    };

    if let Some(reason) = result.skip_reason {
        debug!("Update check skipped: {}", reason);
    }
    if !result.updated {
        return None;
    }

    restart_updated(&result.executable_path).await
}

/// Drive `work` to completion unless `interrupt` resolves with `Ok` first.
///
/// An interrupt listener that fails only disables itself; `work` keeps
/// running and its output is returned.
async fn until_interrupted<F, I>(work: F, interrupt: I) -> Option<F::Output>
where
    F: Future,
    I: Future<Output = io::Result<()>>,
{
    tokio::select! {
        output = work => Some(output),
        Ok(()) = interrupt => None,
    }
}

async fn restart_updated(executable: &Path) -> Option<i32> {
    let args: Vec<OsString> = std::env::args_os().collect();
    info!("Re-running {:?} with the updated binary", args);

    match restart(executable, &args, std::env::vars_os()).await {
        Ok(code) => Some(code),
        Err(e) => {
            eprintln!("Restart failed after update: {e:#}");
            None
        }
    }
}
