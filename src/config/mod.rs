//! Configuration for the self-update subsystem.
//!
//! # Modules
//!
//! - `options` - [`Options`], [`Defaults`] and the defaulting step producing [`ResolvedOptions`]
//! - `env` - [`EnvOverrides`], the one-time snapshot of update-related environment variables
//! - `output` - [`Output`], the shared sink for status lines and progress
//!
//! # Configuration Directory
//!
//! **Location:**
//! - Unix/macOS: `~/.updraft/`
//! - Windows: `%LOCALAPPDATA%\updraft\`
//!
//! When `UPDRAFT_CONFIG_PATH` names a configuration file, its parent directory
//! is used instead. The update cache (`update.json`) lives in this directory.

mod env;
mod options;
mod output;

pub use env::{EnvOverrides, env_truthy};
pub use options::{Clock, Defaults, Options, ResolvedOptions, SymlinkResolver};
pub use output::{Output, OutputBuffer};

use std::path::PathBuf;

use crate::constants::{CACHE_FILE_NAME, CONFIG_DIR_NAME, WINDOWS_CONFIG_DIR_NAME};

/// Directory holding the configuration file, or `None` if no home directory exists.
#[must_use]
pub fn config_dir(env: &EnvOverrides) -> Option<PathBuf> {
    if let Some(config_path) = &env.config_path {
        return config_path.parent().map(|p| p.to_path_buf());
    }

    if cfg!(target_os = "windows") {
        dirs::data_local_dir().map(|dir| dir.join(WINDOWS_CONFIG_DIR_NAME))
    } else {
        dirs::home_dir().map(|dir| dir.join(CONFIG_DIR_NAME))
    }
}

/// Default location of the update cache.
#[must_use]
pub fn default_cache_path(env: &EnvOverrides) -> Option<PathBuf> {
    config_dir(env).map(|dir| dir.join(CACHE_FILE_NAME))
}
