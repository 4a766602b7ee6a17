//! Release asset download and atomic executable replacement.
//!
//! [`download_and_replace`] is the only code that touches the executable. It
//! stages the new binary in a temp file next to the target, so the final
//! step is a same-filesystem rename. Until that rename the running executable
//! is untouched, whatever fails before it.
//!
//! ```text
//! GET <download>/<repo>/releases/latest/download/<asset>
//!   └── each chunk ──┬── temp file (.updraft-update-XXXX in the exe's dir)
//!                    ├── SHA-256
//!                    └── progress bar (when the length is known)
//! fsync + close temp file
//! GET <download>/<repo>/releases/latest/download/checksums.txt
//!   ├── unavailable / not listed → warning, continue
//!   ├── mismatch                 → error, temp file removed
//!   └── match                    → continue
//! chmod 0755 (Unix)
//! rename temp → executable       ← commit point
//! ```

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::config::ResolvedOptions;
use crate::constants::CHECKSUMS_FILE_NAME;
use crate::core::UpdateError;
use crate::upgrade::verification::ChecksumVerifier;
use crate::utils::DownloadProgress;

/// Release naming of an operating system, or `None` if no asset is published.
#[must_use]
pub fn release_os(os: &str) -> Option<&'static str> {
    match os.to_ascii_lowercase().as_str() {
        "darwin" | "macos" => Some("darwin"),
        "linux" => Some("linux"),
        "windows" => Some("windows"),
        _ => None,
    }
}

/// Release naming of an architecture, or `None` if no asset is published.
#[must_use]
pub fn release_arch(arch: &str) -> Option<&'static str> {
    match arch.to_ascii_lowercase().as_str() {
        "amd64" | "x86_64" => Some("amd64"),
        "arm64" | "aarch64" => Some("arm64"),
        _ => None,
    }
}

/// Whether `os` names Windows, in either naming scheme.
#[must_use]
pub fn is_windows(os: &str) -> bool {
    release_os(os) == Some("windows")
}

/// Asset file name for a platform: `<binary>-<os>-<arch>`, plus `.exe` on Windows.
///
/// # Errors
///
/// Returns [`UpdateError::UnsupportedPlatform`] when the OS or architecture
/// has no published asset, or the binary name is empty.
pub fn asset_name(binary_name: &str, os: &str, arch: &str) -> Result<String> {
    let unsupported = || UpdateError::UnsupportedPlatform {
        os: os.to_string(),
        arch: arch.to_string(),
    };

    if binary_name.is_empty() {
        return Err(unsupported().into());
    }
    let (Some(release_os), Some(release_arch)) = (release_os(os), release_arch(arch)) else {
        return Err(unsupported().into());
    };

    let name = format!("{binary_name}-{release_os}-{release_arch}");
    if release_os == "windows" { Ok(format!("{name}.exe")) } else { Ok(name) }
}

/// URL a release file is downloaded from.
#[must_use]
pub fn release_download_url(download_base_url: &str, repo: &str, file_name: &str) -> String {
    format!(
        "{}/{}/releases/latest/download/{}",
        download_base_url.trim_end_matches('/'),
        repo,
        file_name
    )
}

/// Download the release asset for the configured platform and atomically
/// replace `exec_path` with it.
///
/// Dropping the returned future (cancellation) or any error before the final
/// rename removes the temp file and leaves `exec_path` byte-for-byte intact.
///
/// # Errors
///
/// - [`UpdateError::UnsupportedPlatform`] before any network access
/// - [`UpdateError::DownloadFailed`] for a non-200 asset response
/// - [`UpdateError::ChecksumMismatch`] when the manifest disagrees with the download
/// - I/O errors while staging or renaming the file
pub async fn download_and_replace(
    opts: &ResolvedOptions,
    exec_path: &Path,
    target_version: &str,
) -> Result<()> {
    let asset = asset_name(&opts.binary_name, &opts.os, &opts.arch)?;
    let download_url = release_download_url(&opts.download_base_url, &opts.repo, &asset);
    let checksums_url =
        release_download_url(&opts.download_base_url, &opts.repo, CHECKSUMS_FILE_NAME);

    info!("Downloading {} for version {}", asset, target_version);

    let dir = exec_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let staged = tempfile::Builder::new()
        .prefix(&format!(".{}-update-", opts.binary_name))
        .tempfile_in(dir)
        .with_context(|| format!("Update failed: cannot create temp file in {}", dir.display()))?;
    // Dropping `temp_path` deletes the file until `persist` disarms it
    let (mut file, temp_path) = staged.into_parts();
    debug!("Staging download in {}", temp_path.display());

    let mut response = opts
        .client
        .get(&download_url)
        .header(reqwest::header::USER_AGENT, opts.user_agent())
        .send()
        .await
        .with_context(|| format!("Failed to download {download_url}"))?;

    if response.status() != reqwest::StatusCode::OK {
        return Err(UpdateError::DownloadFailed {
            url: download_url,
            status: response.status().to_string(),
        }
        .into());
    }

    let mut hasher = Sha256::new();
    let mut progress = if opts.show_progress {
        DownloadProgress::for_length(response.content_length(), &opts.output)
    } else {
        None
    };

    {
        let mut sinks: Vec<&mut dyn Write> = vec![&mut file, &mut hasher];
        if let Some(progress) = progress.as_mut() {
            sinks.push(progress);
        }
        let mut fan_out = FanOut::new(sinks);

        while let Some(chunk) = response
            .chunk()
            .await
            .with_context(|| format!("Failed to read download from {download_url}"))?
        {
            fan_out.write_all(&chunk).context("Failed to write downloaded update")?;
        }
        fan_out.flush().context("Failed to flush downloaded update")?;
    }

    if let Some(progress) = &progress {
        progress.finish();
    }

    file.sync_all().context("Failed to sync downloaded update to disk")?;
    drop(file);

    let actual = hex::encode(hasher.finalize());
    debug!("Downloaded {} with sha256 {}", asset, actual);
    ChecksumVerifier::verify_from_release(opts, &checksums_url, &asset, &actual).await?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        if let Err(e) = std::fs::set_permissions(&temp_path, std::fs::Permissions::from_mode(0o755))
        {
            if e.kind() != io::ErrorKind::PermissionDenied {
                return Err(e).context("Failed to mark update executable");
            }
            debug!("Ignoring chmod failure on {}: {}", temp_path.display(), e);
        }
    }

    temp_path
        .persist(exec_path)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to replace {}", exec_path.display()))?;

    info!("Replaced {} with {}", exec_path.display(), asset);
    Ok(())
}

/// A writer that forwards every write to each of its sinks in order.
///
/// One failing sink fails the whole write.
pub struct FanOut<'a> {
    sinks: Vec<&'a mut dyn Write>,
}

impl<'a> FanOut<'a> {
    /// Forward writes to `sinks`.
    pub fn new(sinks: Vec<&'a mut dyn Write>) -> Self {
        Self { sinks }
    }
}

impl Write for FanOut<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for sink in &mut self.sinks {
            sink.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        for sink in &mut self.sinks {
            sink.flush()?;
        }
        Ok(())
    }
}
