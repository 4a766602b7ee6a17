//! Self-update subsystem.
//!
//! Decides whether a newer release of the binary exists, caches that
//! decision, and when allowed replaces the running executable in place.
//!
//! # Components
//!
//! - [`version`]: normalizes and orders version strings
//! - [`cache`]: JSON cache of the last latest-version lookup
//! - [`install`]: Homebrew vs. manual install detection
//! - [`release`]: latest-release lookup against the GitHub API
//! - [`download`] and [`verification`]: asset download, checksum check and atomic swap
//! - [`restart`]: re-executes the new binary with the original arguments
//! - [`updater`]: the [`check_and_update`] entry point tying it together
//!
//! # Usage
//!
//! A CLI calls [`check_and_update`] once at startup. If the result says
//! `updated`, it calls [`restart`](restart::restart) and exits with the
//! child's exit code; otherwise it carries on with the requested command.
//!
//! ```rust,no_run
//! use updraft::config::{Defaults, EnvOverrides, Options, Output};
//! use updraft::upgrade::{check_and_update, restart::restart};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let result = check_and_update(
//!     Options {
//!         current_version: env!("CARGO_PKG_VERSION").to_string(),
//!         auto_update: true,
//!         output: Some(Output::stderr()),
//!         env: EnvOverrides::from_env(),
//!         ..Options::default()
//!     },
//!     &Defaults::standard(),
//! )
//! .await?;
//!
//! if result.updated {
//!     let args: Vec<_> = std::env::args_os().collect();
//!     let code = restart(&result.executable_path, &args, std::env::vars_os()).await?;
//!     std::process::exit(code);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Safety of the swap
//!
//! The new binary is staged in a temp file beside the executable and only
//! renamed over it after the download completed, was fsynced and passed
//! checksum verification. Every earlier failure, and cancellation by
//! dropping the future, removes the temp file and leaves the executable as
//! it was. Homebrew installs and Windows are never modified; the user is
//! told how to upgrade instead.

pub mod cache;
pub mod download;
pub mod install;
pub mod release;
pub mod restart;
pub mod updater;
pub mod verification;
pub mod version;

pub use cache::CacheFile;
pub use install::InstallMethod;
pub use updater::{CheckResult, SkipReason, check_and_update};
pub use verification::{ChecksumVerifier, Verification};
pub use version::NormalizedVersion;
