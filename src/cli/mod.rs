//! Command-line interface for the `updraft` binary.
//!
//! Every invocation first runs the startup update check (see [`startup`]),
//! then dispatches to the requested subcommand.
//!
//! # Commands
//!
//! - `version` - Print the version of this build
//! - `status` - Report the current and latest release without installing anything
//!
//! # Global Options
//!
//! - `--no-update` - Skip the update check
//! - `--no-progress` - Do not draw a progress bar while downloading
//! - `--verbose` - Enable debug logging
//! - `--quiet` - Disable logging
//!
//! # Environment Variables
//!
//! - `UPDRAFT_NO_UPDATE` - Any truthy value disables update checks
//! - `UPDRAFT_CONFIG_PATH` - Configuration file; the update cache lives beside it
//! - `RUST_LOG` - Log filter, overriding the default level

pub mod startup;
pub mod status;

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::config::{EnvOverrides, Options, Output};
use crate::constants::CURRENT_VERSION;

/// Runtime settings derived from the global flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Log filter directive; `None` disables logging
    pub log_level: Option<String>,
    /// Skip the update check
    pub no_update: bool,
    /// Suppress the download progress bar
    pub no_progress: bool,
}

impl CliConfig {
    /// Install a stderr tracing subscriber for this configuration.
    ///
    /// `RUST_LOG` takes precedence over the configured level. Installing twice
    /// is harmless; the second attempt is ignored.
    pub fn init_logging(&self) {
        let Some(level) = &self.log_level else {
            return;
        };

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    /// Update options shared by the startup check and `status`.
    #[must_use]
    pub fn update_options(&self, env: EnvOverrides) -> Options {
        Options {
            current_version: CURRENT_VERSION.to_string(),
            no_update: self.no_update,
            show_progress: !self.no_progress,
            output: Some(Output::stderr()),
            env,
            ..Options::default()
        }
    }
}

/// Top-level command line.
#[derive(Parser, Debug)]
#[command(
    name = "updraft",
    about = "A command-line tool that keeps itself up to date",
    version,
    long_about = "updraft checks GitHub for newer releases on startup and replaces itself in place when one is available."
)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable debug logging.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Disable logging.
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Skip the update check for this run.
    #[arg(long, global = true)]
    no_update: bool,

    /// Do not draw a progress bar while downloading an update.
    #[arg(long, global = true)]
    no_progress: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Print the version of this build
    Version,
    /// Show the current and latest release
    Status,
}

impl Cli {
    /// Translate the global flags into a [`CliConfig`].
    ///
    /// Verbose logs at `debug`, quiet disables logging and the default is `warn`.
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("warn".to_string())
        };

        CliConfig {
            log_level,
            no_update: self.no_update,
            no_progress: self.no_progress,
        }
    }

    /// Run the command and return the process exit code.
    ///
    /// When the startup check installed an update, the new binary has already
    /// run the command and its exit code is returned without dispatching here.
    pub async fn execute(self) -> Result<i32> {
        let config = self.build_config();
        config.init_logging();
        let env = EnvOverrides::from_env();

        if runs_startup_check(self.command.as_ref()) {
            if let Some(code) = startup::run_update_check(&config, env.clone()).await {
                return Ok(code);
            }
        }

        match self.command {
            Some(Commands::Version) => {
                println!("updraft {CURRENT_VERSION}");
                Ok(0)
            }
            Some(Commands::Status) => status::execute(&config, env).await.map(|()| 0),
            None => {
                Cli::command().print_help()?;
                println!();
                Ok(0)
            }
        }
    }
}

/// Whether the auto-updating startup check runs before `command`.
///
/// `version` answers from the running binary and returns before any check.
/// `status` performs its own check with auto-update disabled.
fn runs_startup_check(command: Option<&Commands>) -> bool {
    !matches!(command, Some(Commands::Version | Commands::Status))
}
