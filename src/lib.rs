//! updraft - self-update engine for single-binary CLIs
//!
//! A CLI distributed as a standalone binary through GitHub releases calls
//! [`upgrade::check_and_update`] once per run. It decides whether a newer
//! release exists, remembers that decision for a while, and when allowed
//! downloads the new binary, verifies it and swaps it in for the running
//! executable. The caller then re-executes the new binary with
//! [`upgrade::restart::restart`] so the user's command still completes.
//!
//! # Modules
//!
//! - [`upgrade`] - version comparison, cache, install detection, download and restart
//! - [`config`] - options, defaults, environment snapshot and output sink
//! - [`core`] - error types and user-facing error rendering
//! - [`cli`] - the `updraft` command line
//! - [`utils`] - progress bar rendering
//! - [`constants`] - default values
//!
//! # Behaviour at a Glance
//!
//! - Disabled by `--no-update`, `UPDRAFT_NO_UPDATE` or `UPDRAFT_SKIP_UPDATE`
//! - Development builds (`dev`, empty or non-semver versions) never check
//! - The latest release tag is cached in `~/.updraft/update.json` for 24 hours
//! - Homebrew installs and Windows only get an upgrade instruction
//! - Downloads are checked against the release's `checksums.txt` and
//!   replace the executable with a single rename
//!
//! # Example
//!
//! ```rust,no_run
//! use updraft::config::{Defaults, EnvOverrides, Options, Output};
//! use updraft::upgrade::check_and_update;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let result = check_and_update(
//!     Options {
//!         current_version: "1.2.0".to_string(),
//!         auto_update: true,
//!         output: Some(Output::stderr()),
//!         env: EnvOverrides::from_env(),
//!         ..Options::default()
//!     },
//!     &Defaults::standard(),
//! )
//! .await?;
//! println!("updated: {}", result.updated);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod upgrade;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
