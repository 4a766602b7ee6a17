//! Install method detection.
//!
//! Detects how the running binary was installed to decide whether it may be
//! replaced in place or whether the user should be pointed at a package manager.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use crate::config::SymlinkResolver;

/// How the running binary was installed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallMethod {
    /// Could not determine install method
    #[default]
    Unknown,
    /// Installed via Homebrew (the binary lives in a Cellar)
    Homebrew,
    /// Downloaded binary or built from source
    Manual,
}

impl InstallMethod {
    /// Get a human-readable name for this install method.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            InstallMethod::Unknown => "unknown",
            InstallMethod::Homebrew => "homebrew",
            InstallMethod::Manual => "manual",
        }
    }

    /// Whether the binary belongs to a package manager and must not be replaced.
    #[must_use]
    pub const fn is_package_managed(self) -> bool {
        matches!(self, InstallMethod::Homebrew)
    }
}

impl fmt::Display for InstallMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classify the install method of `executable_path`.
///
/// The path is resolved through symlinks first. A path with a `Cellar`
/// directory anywhere in it, or one nested under `<homebrew_prefix>/Cellar`,
/// is a Homebrew install; anything else is manual. An empty path is unknown.
pub fn detect(
    executable_path: &Path,
    resolve_symlinks: Option<&SymlinkResolver>,
    homebrew_prefix: Option<&str>,
) -> InstallMethod {
    let resolved = resolve_executable(executable_path, resolve_symlinks);
    if resolved.as_os_str().is_empty() {
        return InstallMethod::Unknown;
    }

    if is_homebrew_path(&resolved, homebrew_prefix) {
        InstallMethod::Homebrew
    } else {
        InstallMethod::Manual
    }
}

/// Resolve `executable_path` through symlinks.
///
/// Falls back to the original path when there is no resolver, resolution
/// fails or it returns an empty path. An empty input stays empty.
pub fn resolve_executable(
    executable_path: &Path,
    resolve_symlinks: Option<&SymlinkResolver>,
) -> PathBuf {
    if executable_path.as_os_str().is_empty() {
        return PathBuf::new();
    }

    match resolve_symlinks.map(|resolve| resolve(executable_path)) {
        Some(Ok(resolved)) if !resolved.as_os_str().is_empty() => resolved,
        _ => executable_path.to_path_buf(),
    }
}

fn is_homebrew_path(path: &Path, homebrew_prefix: Option<&str>) -> bool {
    let components: Vec<Component<'_>> = path.components().collect();

    // A Cellar directory segment, not the file name itself
    let in_cellar = components
        .iter()
        .take(components.len().saturating_sub(1))
        .any(|c| c.as_os_str() == "Cellar");
    if in_cellar {
        return true;
    }

    let Some(prefix) = homebrew_prefix.map(str::trim).filter(|p| !p.is_empty()) else {
        return false;
    };
    let cellar = Path::new(prefix).join("Cellar");
    path.starts_with(&cellar) && path != cellar.as_path()
}
