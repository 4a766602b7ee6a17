//! On-disk cache of the last latest-version lookup.
//!
//! The cache is a small JSON object:
//!
//! ```json
//! {"checked_at":"2025-06-01T12:00:00Z","latest_version":"v1.4.0"}
//! ```
//!
//! A missing, empty or unparseable file reads as the zero value, which the
//! orchestrator treats as stale. Freshness itself is decided by the
//! orchestrator, not here.

use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

/// Contents of the update cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheFile {
    /// When the latest version was last fetched; `None` means never.
    #[serde(default)]
    pub checked_at: Option<DateTime<Utc>>,
    /// Latest release tag seen at `checked_at`.
    #[serde(default)]
    pub latest_version: String,
}

impl CacheFile {
    /// Whether the entry was written less than `interval` before `now`.
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>, interval: std::time::Duration) -> bool {
        let Some(checked_at) = self.checked_at else {
            return false;
        };
        let Ok(interval) = chrono::Duration::from_std(interval) else {
            return true;
        };
        now.signed_duration_since(checked_at) < interval
    }
}

/// Read the cache at `path`.
///
/// An empty `path` disables caching and always yields the zero value.
///
/// # Errors
///
/// Only I/O errors other than "not found" are returned; absent, empty and
/// malformed files all read as [`CacheFile::default`].
pub async fn read(path: &Path) -> Result<CacheFile> {
    if path.as_os_str().is_empty() {
        return Ok(CacheFile::default());
    }

    let data = match fs::read(path).await {
        Ok(data) => data,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("No update cache at {}", path.display());
            return Ok(CacheFile::default());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read update cache: {}", path.display()));
        }
    };

    if data.iter().all(u8::is_ascii_whitespace) {
        return Ok(CacheFile::default());
    }

    match serde_json::from_slice(&data) {
        Ok(cache) => Ok(cache),
        Err(e) => {
            debug!("Ignoring malformed update cache {}: {}", path.display(), e);
            Ok(CacheFile::default())
        }
    }
}

/// Write `cache` to `path`, creating parent directories as needed.
///
/// An empty `path` is a no-op. On Unix the directory is created owner-only
/// and the file is written with mode `0600`.
pub async fn write(path: &Path, cache: &CacheFile) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Ok(());
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        create_private_dir(parent)
            .await
            .with_context(|| format!("Failed to create cache directory: {}", parent.display()))?;
    }

    let content = serde_json::to_vec(cache).context("Failed to serialize update cache")?;

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options
        .open(path)
        .await
        .with_context(|| format!("Failed to open update cache: {}", path.display()))?;
    tokio::io::AsyncWriteExt::write_all(&mut file, &content)
        .await
        .with_context(|| format!("Failed to write update cache: {}", path.display()))?;
    tokio::io::AsyncWriteExt::flush(&mut file).await?;

    debug!("Saved update cache to {}", path.display());
    Ok(())
}

async fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(0o700);
    builder.create(dir).await
}
