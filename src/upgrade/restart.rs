//! Re-executing the freshly installed binary.
//!
//! After a successful swap the running process still holds the old image.
//! [`restart`] runs the new executable with the original arguments, waits for
//! it and hands back its exit code so the caller can exit with it. The child
//! gets `UPDRAFT_SKIP_UPDATE=1` so it does not check for updates again.

use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;

use anyhow::Result;
use tokio::process::Command;
use tracing::{debug, info};

use crate::constants::SKIP_UPDATE_ENV_VAR;
use crate::core::UpdateError;

/// Run `executable` with `args[1..]` and the exact environment `env`, plus
/// the skip-update marker, and return the child's exit code.
///
/// `args[0]` is the program name of the original invocation and is not
/// passed on. Stdio is inherited. A child terminated by a signal reports
/// exit code 1. Arguments are forwarded as OS strings, so non-UTF-8 values
/// survive.
///
/// # Errors
///
/// - [`UpdateError::RestartMissingExecutable`] if `executable` is empty
/// - [`UpdateError::RestartMissingArgs`] if `args` is empty
/// - [`UpdateError::RestartLaunchFailed`] if the child cannot be started
pub async fn restart<A, I, K, V>(executable: &Path, args: &[A], env: I) -> Result<i32>
where
    A: AsRef<OsStr>,
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<OsStr>,
    V: AsRef<OsStr>,
{
    if executable.as_os_str().is_empty() {
        return Err(UpdateError::RestartMissingExecutable.into());
    }
    let Some((_, forwarded)) = args.split_first() else {
        return Err(UpdateError::RestartMissingArgs.into());
    };

    info!("Restarting {} with {} argument(s)", executable.display(), forwarded.len());

    let status = Command::new(executable)
        .args(forwarded)
        .env_clear()
        .envs(env)
        .env(SKIP_UPDATE_ENV_VAR, "1")
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|e| UpdateError::RestartLaunchFailed {
            path: executable.display().to_string(),
            reason: e.to_string(),
        })?;

    let code = status.code().unwrap_or(1);
    debug!("Restarted process exited with {}", code);
    Ok(code)
}
