//! Default values for the self-update subsystem.
//!
//! These are the raw values behind [`Defaults::standard`](crate::config::Defaults::standard).
//! Nothing in the update path reads them directly; they always flow through a
//! [`Defaults`](crate::config::Defaults) value so tests can substitute their own.

use std::time::Duration;

/// Version of this build, as reported by `updraft version`.
pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

/// GitHub repository (`owner/name`) that publishes releases.
pub const DEFAULT_REPO: &str = "updraft-dev/updraft";

/// Name of the released binary, also the prefix of every release asset.
pub const DEFAULT_BINARY_NAME: &str = "updraft";

/// Homebrew formula users should upgrade when the binary lives in a Cellar.
pub const DEFAULT_HOMEBREW_FORMULA: &str = "updraft-dev/tap/updraft";

/// Base URL of the release-metadata API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// Base URL release assets are downloaded from.
pub const DEFAULT_DOWNLOAD_BASE_URL: &str = "https://github.com";

/// How long a cached latest-version lookup stays fresh (24 hours).
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Timeout for metadata and checksum requests, and for connecting (12 seconds).
///
/// The binary download itself carries no overall timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(12);

/// Directory under the user's home that holds configuration and the update cache.
pub const CONFIG_DIR_NAME: &str = ".updraft";

/// Directory name used under `%LOCALAPPDATA%` on Windows.
pub const WINDOWS_CONFIG_DIR_NAME: &str = "updraft";

/// File name of the update cache, stored beside the configuration file.
pub const CACHE_FILE_NAME: &str = "update.json";

/// Name of the checksum manifest attached to each release.
pub const CHECKSUMS_FILE_NAME: &str = "checksums.txt";

/// Environment variable pointing at an explicit configuration file.
pub const CONFIG_PATH_ENV_VAR: &str = "UPDRAFT_CONFIG_PATH";

/// User-facing switch that disables update checks.
pub const NO_UPDATE_ENV_VAR: &str = "UPDRAFT_NO_UPDATE";

/// Guard set on a restarted child so it does not check for updates again.
pub const SKIP_UPDATE_ENV_VAR: &str = "UPDRAFT_SKIP_UPDATE";

/// Homebrew install prefix, consulted when classifying the install method.
pub const HOMEBREW_PREFIX_ENV_VAR: &str = "HOMEBREW_PREFIX";
