//! The `check_and_update` entry point.
//!
//! One call walks a short decision chain and stops at the first terminal
//! state:
//!
//! ```text
//! disabled? ─────────────────────────────► Skipped(disabled)
//! current version not a release? ────────► Skipped(non-release build)
//! resolve latest (cache, else network) ──► error on lookup failure
//! latest empty? ─────────────────────────► Skipped(missing latest version)
//! latest not a version? ─────────────────► Skipped(invalid latest version)
//! current >= latest? ────────────────────► up to date
//! Homebrew install? ─────────────────────► notice: brew upgrade
//! Windows? ──────────────────────────────► notice: download from GitHub
//! auto-update off? ──────────────────────► notice
//! download, verify, swap ────────────────► updated
//! ```

use std::fmt;
use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{Defaults, Options, ResolvedOptions};
use crate::core::UpdateError;
use crate::upgrade::cache::{self, CacheFile};
use crate::upgrade::download::{download_and_replace, is_windows};
use crate::upgrade::install::{self, InstallMethod};
use crate::upgrade::release::fetch_latest_tag;
use crate::upgrade::version::{compare, normalize};

/// Why a check ended without comparing versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkipReason {
    /// Disabled by option or environment variable
    Disabled,
    /// The running binary is a development build
    NonReleaseBuild,
    /// The release lookup produced an empty tag
    MissingLatestVersion,
    /// The latest tag is not a version
    InvalidLatestVersion,
}

impl SkipReason {
    /// Human-readable reason.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SkipReason::Disabled => "disabled",
            SkipReason::NonReleaseBuild => "non-release build",
            SkipReason::MissingLatestVersion => "missing latest version",
            SkipReason::InvalidLatestVersion => "invalid latest version",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one [`check_and_update`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    /// Set when the check was skipped
    pub skip_reason: Option<SkipReason>,
    /// A newer release exists
    pub update_available: bool,
    /// The executable was replaced
    pub updated: bool,
    /// Latest version in display form.
    ///
    /// Set whenever an update is available. When already up to date it is
    /// only set if the value came from the cache.
    pub latest_version: Option<String>,
    /// Install method; only detected when an update is available
    pub install_method: InstallMethod,
    /// Executable path after defaulting
    pub executable_path: PathBuf,
}

impl CheckResult {
    /// Whether the check was skipped.
    #[must_use]
    pub fn skipped(&self) -> bool {
        self.skip_reason.is_some()
    }

    fn skip(reason: SkipReason, executable_path: PathBuf) -> Self {
        Self {
            skip_reason: Some(reason),
            executable_path,
            ..Self::default()
        }
    }
}

/// Check for a newer release and, when allowed, install it in place.
///
/// `options` is merged with `defaults` first. Status lines go to the
/// configured output sink; skips are reported through
/// [`CheckResult::skip_reason`] rather than as errors. Dropping the future
/// cancels any request in flight and leaves the executable untouched.
///
/// # Errors
///
/// - failure to look up the latest release when the cache is stale
/// - an unresolvable executable path when an update would be applied
/// - any download, verification or replacement failure
///
/// # Examples
///
/// ```rust,no_run
/// use updraft::config::{Defaults, EnvOverrides, Options, Output};
/// use updraft::upgrade::check_and_update;
///
/// # async fn example() -> anyhow::Result<()> {
/// let result = check_and_update(
///     Options {
///         current_version: "1.2.0".to_string(),
///         output: Some(Output::stderr()),
///         env: EnvOverrides::from_env(),
///         ..Options::default()
///     },
///     &Defaults::standard(),
/// )
/// .await?;
///
/// if result.update_available {
///     println!("latest: {:?}", result.latest_version);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn check_and_update(options: Options, defaults: &Defaults) -> Result<CheckResult> {
    let opts = options.with_defaults(defaults)?;
    let executable_path = opts.executable_path.clone();

    if opts.no_update || opts.env.update_disabled() {
        debug!("Update check disabled");
        return Ok(CheckResult::skip(SkipReason::Disabled, executable_path));
    }

    let Some(current) = normalize(&opts.current_version) else {
        debug!("Skipping update check for non-release build {:?}", opts.current_version);
        return Ok(CheckResult::skip(SkipReason::NonReleaseBuild, executable_path));
    };

    let (latest_raw, used_cache) = resolve_latest_version(&opts).await?;
    if latest_raw.trim().is_empty() {
        return Ok(CheckResult::skip(SkipReason::MissingLatestVersion, executable_path));
    }

    let Some(latest) = normalize(&latest_raw) else {
        warn!("Latest release tag is not a version: {:?}", latest_raw);
        return Ok(CheckResult::skip(SkipReason::InvalidLatestVersion, executable_path));
    };

    let mut result = CheckResult {
        executable_path,
        ..CheckResult::default()
    };

    if compare(&current, &latest).is_ge() {
        debug!("{} is up to date (latest {})", current.display, latest.display);
        if used_cache {
            result.latest_version = Some(latest.display);
        }
        return Ok(result);
    }

    result.update_available = true;
    result.latest_version = Some(latest.display.clone());
    result.install_method = install::detect(
        &opts.executable_path,
        Some(&opts.resolve_symlinks),
        opts.env.homebrew_prefix.as_deref(),
    );
    info!(
        "Update available: {} -> {} ({} install)",
        current.display, latest.display, result.install_method
    );

    if result.install_method == InstallMethod::Homebrew {
        opts.output.line(format_args!(
            "Update available ({} → {}). Run: brew upgrade {}",
            current.display, latest.display, opts.homebrew_formula
        ));
        return Ok(result);
    }

    if is_windows(&opts.os) {
        opts.output.line(format_args!(
            "Update available ({} → {}). Download the latest release from GitHub.",
            current.display, latest.display
        ));
        return Ok(result);
    }

    if !opts.auto_update {
        opts.output.line(format_args!(
            "Update available ({} → {}).",
            current.display, latest.display
        ));
        return Ok(result);
    }

    opts.output.line(format_args!("Updating {} to {}...", opts.binary_name, latest.display));

    let exec_path = install::resolve_executable(&opts.executable_path, Some(&opts.resolve_symlinks));
    if exec_path.as_os_str().is_empty() {
        return Err(UpdateError::ExecutableNotFound.into());
    }

    download_and_replace(&opts, &exec_path, &latest_raw).await?;

    opts.output.line(format_args!("Updated {} to {}.", opts.binary_name, latest.display));
    result.updated = true;
    Ok(result)
}

/// The latest release tag and whether it came from the cache.
///
/// A fresh cache entry wins. Otherwise the tag is fetched and written back
/// with the current time. An unreadable cache counts as stale and a failed
/// write only logs a warning; a failed fetch is an error.
async fn resolve_latest_version(opts: &ResolvedOptions) -> Result<(String, bool)> {
    let now = (opts.now)();

    let cached = match cache::read(&opts.cache_path).await {
        Ok(cached) => cached,
        Err(e) => {
            debug!("Treating unreadable update cache as stale: {:#}", e);
            CacheFile::default()
        }
    };

    if cached.is_fresh(now, opts.check_interval) {
        debug!("Using cached latest version {}", cached.latest_version);
        return Ok((cached.latest_version, true));
    }

    let latest = fetch_latest_tag(opts).await?;

    let entry = CacheFile {
        checked_at: Some(now),
        latest_version: latest.clone(),
    };
    if let Err(e) = cache::write(&opts.cache_path, &entry).await {
        warn!("Failed to save update cache: {:#}", e);
    }

    Ok((latest, false))
}
