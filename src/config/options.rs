//! Update options and the defaulting step.
//!
//! Callers fill in as much of [`Options`] as they care about and leave the
//! rest unset. [`Options::with_defaults`] merges it with a [`Defaults`] value
//! and yields a [`ResolvedOptions`] in which every field the update path
//! needs is concrete. There is no global mutable configuration: tests pass
//! their own `Defaults`, clock, HTTP client and symlink resolver.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::debug;

use super::{EnvOverrides, Output, default_cache_path};
use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_BINARY_NAME, DEFAULT_CHECK_INTERVAL, DEFAULT_DOWNLOAD_BASE_URL,
    DEFAULT_HOMEBREW_FORMULA, DEFAULT_REPO, DEFAULT_REQUEST_TIMEOUT,
};

/// Source of the current time.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Resolves an executable path through symlinks.
pub type SymlinkResolver = Arc<dyn Fn(&Path) -> io::Result<PathBuf> + Send + Sync>;

/// The immutable default configuration applied by [`Options::with_defaults`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defaults {
    /// GitHub repository in `owner/name` form
    pub repo: String,
    /// Released binary name
    pub binary_name: String,
    /// Homebrew formula to suggest for Cellar installs
    pub homebrew_formula: String,
    /// Release-metadata API base URL
    pub api_base_url: String,
    /// Release asset download base URL
    pub download_base_url: String,
    /// Freshness window of the cached latest version
    pub check_interval: Duration,
    /// Timeout for connecting and for metadata/checksum requests
    pub request_timeout: Duration,
}

impl Defaults {
    /// The defaults the `updraft` binary ships with.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            repo: DEFAULT_REPO.to_string(),
            binary_name: DEFAULT_BINARY_NAME.to_string(),
            homebrew_formula: DEFAULT_HOMEBREW_FORMULA.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            download_base_url: DEFAULT_DOWNLOAD_BASE_URL.to_string(),
            check_interval: DEFAULT_CHECK_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl Default for Defaults {
    fn default() -> Self {
        Self::standard()
    }
}

/// Caller-supplied update configuration. Unset fields take their default.
///
/// Empty strings count as unset. `cache_path` is the exception: an explicit
/// empty path disables the cache instead of selecting the default location.
///
/// # Examples
///
/// ```rust,no_run
/// use updraft::config::{EnvOverrides, Options, Output};
///
/// let options = Options {
///     current_version: env!("CARGO_PKG_VERSION").to_string(),
///     auto_update: true,
///     output: Some(Output::stderr()),
///     env: EnvOverrides::from_env(),
///     ..Options::default()
/// };
/// ```
#[derive(Clone, Default)]
pub struct Options {
    /// GitHub repository in `owner/name` form
    pub repo: Option<String>,
    /// Released binary name
    pub binary_name: Option<String>,
    /// Homebrew formula to suggest for Cellar installs
    pub homebrew_formula: Option<String>,
    /// Version string of the running binary (may carry build metadata after whitespace)
    pub current_version: String,
    /// Replace the binary when a newer release exists
    pub auto_update: bool,
    /// Skip the check entirely
    pub no_update: bool,
    /// Freshness window of the cached latest version
    pub check_interval: Option<Duration>,
    /// Location of the update cache; `Some("")` disables caching
    pub cache_path: Option<PathBuf>,
    /// Release-metadata API base URL
    pub api_base_url: Option<String>,
    /// Release asset download base URL
    pub download_base_url: Option<String>,
    /// HTTP client shared by all requests
    pub client: Option<reqwest::Client>,
    /// Timeout for metadata and checksum requests
    pub request_timeout: Option<Duration>,
    /// Sink for status lines and the progress bar
    pub output: Option<Output>,
    /// Draw a progress bar while downloading
    pub show_progress: bool,
    /// Clock used for cache freshness
    pub now: Option<Clock>,
    /// Target operating system (`std::env::consts::OS` style or release style)
    pub os: Option<String>,
    /// Target architecture (`std::env::consts::ARCH` style or release style)
    pub arch: Option<String>,
    /// Path of the running executable
    pub executable_path: Option<PathBuf>,
    /// Symlink resolver used before install detection and replacement
    pub resolve_symlinks: Option<SymlinkResolver>,
    /// Environment snapshot taken by the caller
    pub env: EnvOverrides,
}

/// [`Options`] after defaulting. Every field is concrete.
#[derive(Clone)]
pub struct ResolvedOptions {
    /// GitHub repository in `owner/name` form
    pub repo: String,
    /// Released binary name
    pub binary_name: String,
    /// Homebrew formula to suggest for Cellar installs
    pub homebrew_formula: String,
    /// Version string of the running binary
    pub current_version: String,
    /// Replace the binary when a newer release exists
    pub auto_update: bool,
    /// Skip the check entirely
    pub no_update: bool,
    /// Freshness window of the cached latest version
    pub check_interval: Duration,
    /// Location of the update cache; empty when caching is disabled
    pub cache_path: PathBuf,
    /// Release-metadata API base URL
    pub api_base_url: String,
    /// Release asset download base URL
    pub download_base_url: String,
    /// HTTP client shared by all requests
    pub client: reqwest::Client,
    /// Timeout for metadata and checksum requests
    pub request_timeout: Duration,
    /// Sink for status lines and the progress bar
    pub output: Output,
    /// Draw a progress bar while downloading
    pub show_progress: bool,
    /// Clock used for cache freshness
    pub now: Clock,
    /// Target operating system
    pub os: String,
    /// Target architecture
    pub arch: String,
    /// Path of the running executable; empty if it could not be determined
    pub executable_path: PathBuf,
    /// Symlink resolver used before install detection and replacement
    pub resolve_symlinks: SymlinkResolver,
    /// Environment snapshot taken by the caller
    pub env: EnvOverrides,
}

impl Options {
    /// Fill every unset field from `defaults` or from the running process.
    ///
    /// `executable_path` falls back to [`std::env::current_exe`] and
    /// `cache_path` to `update.json` in the configuration directory; either
    /// stays empty if the process cannot tell.
    ///
    /// # Errors
    ///
    /// Fails only if a default HTTP client has to be built and the TLS
    /// backend cannot be initialised.
    pub fn with_defaults(self, defaults: &Defaults) -> Result<ResolvedOptions> {
        let request_timeout = self.request_timeout.unwrap_or(defaults.request_timeout);

        let client = match self.client {
            Some(client) => client,
            None => reqwest::Client::builder()
                .connect_timeout(request_timeout)
                .build()
                .context("Failed to build HTTP client")?,
        };

        let executable_path = non_empty_path(self.executable_path).unwrap_or_else(|| {
            std::env::current_exe().unwrap_or_else(|e| {
                debug!("Could not determine current executable: {}", e);
                PathBuf::new()
            })
        });

        let cache_path = match self.cache_path {
            Some(path) => path,
            None => default_cache_path(&self.env).unwrap_or_else(|| {
                debug!("No configuration directory; update cache disabled");
                PathBuf::new()
            }),
        };

        let now: Clock = match self.now {
            Some(now) => now,
            None => Arc::new(Utc::now),
        };
        let resolve_symlinks: SymlinkResolver = match self.resolve_symlinks {
            Some(resolver) => resolver,
            None => Arc::new(|path: &Path| std::fs::canonicalize(path)),
        };

        Ok(ResolvedOptions {
            repo: non_empty(self.repo).unwrap_or_else(|| defaults.repo.clone()),
            binary_name: non_empty(self.binary_name)
                .unwrap_or_else(|| defaults.binary_name.clone()),
            homebrew_formula: non_empty(self.homebrew_formula)
                .unwrap_or_else(|| defaults.homebrew_formula.clone()),
            current_version: self.current_version,
            auto_update: self.auto_update,
            no_update: self.no_update,
            check_interval: self.check_interval.unwrap_or(defaults.check_interval),
            cache_path,
            api_base_url: non_empty(self.api_base_url)
                .unwrap_or_else(|| defaults.api_base_url.clone()),
            download_base_url: non_empty(self.download_base_url)
                .unwrap_or_else(|| defaults.download_base_url.clone()),
            client,
            request_timeout,
            output: self.output.unwrap_or_default(),
            show_progress: self.show_progress,
            now,
            os: non_empty(self.os).unwrap_or_else(|| std::env::consts::OS.to_string()),
            arch: non_empty(self.arch).unwrap_or_else(|| std::env::consts::ARCH.to_string()),
            executable_path,
            resolve_symlinks,
            env: self.env,
        })
    }
}

impl ResolvedOptions {
    /// User agent sent with every request, e.g. `updraft/1.4.0`.
    #[must_use]
    pub fn user_agent(&self) -> String {
        let version = self.current_version.split_whitespace().next().unwrap_or("dev");
        format!("{}/{}", self.binary_name, version)
    }
}

impl fmt::Debug for ResolvedOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedOptions")
            .field("repo", &self.repo)
            .field("binary_name", &self.binary_name)
            .field("current_version", &self.current_version)
            .field("auto_update", &self.auto_update)
            .field("no_update", &self.no_update)
            .field("check_interval", &self.check_interval)
            .field("cache_path", &self.cache_path)
            .field("api_base_url", &self.api_base_url)
            .field("download_base_url", &self.download_base_url)
            .field("os", &self.os)
            .field("arch", &self.arch)
            .field("executable_path", &self.executable_path)
            .finish_non_exhaustive()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn non_empty_path(value: Option<PathBuf>) -> Option<PathBuf> {
    value.filter(|p| !p.as_os_str().is_empty())
}
