use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, TimeZone, Utc};
use httpmock::prelude::*;
use tempfile::TempDir;
use updraft::config::{Defaults, Options, Output, OutputBuffer};
use updraft::core::UpdateError;
use updraft::test_utils::{fixed_clock, identity_resolver, init_test_logging, install_fake_binary};
use updraft::upgrade::cache::{self, CacheFile};
use updraft::upgrade::{ChecksumVerifier, InstallMethod, SkipReason, check_and_update};

const OLD_BINARY: &[u8] = b"#!/bin/sh\necho 'updraft 1.2.0'\n";
const NEW_BINARY: &[u8] = b"#!/bin/sh\nexit 3\n";
const ASSET_PATH: &str = "/updraft-dev/updraft/releases/latest/download/updraft-linux-amd64";
const CHECKSUMS_PATH: &str = "/updraft-dev/updraft/releases/latest/download/checksums.txt";
const LATEST_PATH: &str = "/repos/updraft-dev/updraft/releases/latest";

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

/// A mock release server, a scratch directory holding the executable and
/// cache, and a captured output sink.
struct Harness {
    server: MockServer,
    dir: TempDir,
    exe: PathBuf,
    output: Output,
    buffer: OutputBuffer,
}

impl Harness {
    async fn new() -> Result<Self> {
        init_test_logging(None);
        let dir = TempDir::new()?;
        let exe = install_fake_binary(dir.path(), "updraft", OLD_BINARY);
        let (output, buffer) = Output::buffered();
        Ok(Self {
            server: MockServer::start_async().await,
            dir,
            exe,
            output,
            buffer,
        })
    }

    fn cache_path(&self) -> PathBuf {
        self.dir.path().join("config").join("update.json")
    }

    fn options(&self, current_version: &str) -> Options {
        Options {
            current_version: current_version.to_string(),
            cache_path: Some(self.cache_path()),
            api_base_url: Some(self.server.base_url()),
            download_base_url: Some(self.server.base_url()),
            output: Some(self.output.clone()),
            now: Some(fixed_clock(now())),
            os: Some("linux".to_string()),
            arch: Some("x86_64".to_string()),
            executable_path: Some(self.exe.clone()),
            resolve_symlinks: Some(identity_resolver()),
            ..Options::default()
        }
    }

    async fn seed_cache(&self, latest: &str, checked_ago: chrono::Duration) -> Result<()> {
        cache::write(
            &self.cache_path(),
            &CacheFile {
                checked_at: Some(now() - checked_ago),
                latest_version: latest.to_string(),
            },
        )
        .await
    }

    fn exe_contents(&self) -> Vec<u8> {
        std::fs::read(&self.exe).unwrap()
    }

    fn staged_files(&self) -> Vec<String> {
        std::fs::read_dir(self.dir.path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(".updraft-update-"))
            .collect()
    }
}

/// Every skip condition returns before touching the network, even with a
/// stale cache that would otherwise force a lookup.
#[tokio::test]
async fn test_skip_conditions_make_no_requests() -> Result<()> {
    let h = Harness::new().await?;
    let any = h
        .server
        .mock_async(|_when, then| {
            then.status(500);
        })
        .await;
    h.seed_cache("9.9.9", chrono::Duration::hours(48)).await?;

    let disabled = check_and_update(
        Options {
            no_update: true,
            ..h.options("1.2.0")
        },
        &Defaults::standard(),
    )
    .await?;
    assert_eq!(disabled.skip_reason, Some(SkipReason::Disabled));

    let dev = check_and_update(h.options("dev"), &Defaults::standard()).await?;
    assert_eq!(dev.skip_reason, Some(SkipReason::NonReleaseBuild));
    assert_eq!(dev.executable_path, h.exe);

    any.assert_calls_async(0).await;
    let cached = cache::read(&h.cache_path()).await?;
    assert_eq!(cached.latest_version, "9.9.9");
    assert_eq!(cached.checked_at, Some(now() - chrono::Duration::hours(48)));
    assert!(h.buffer.contents().is_empty());
    Ok(())
}

/// A fresh cached tag is used without a lookup and only a notice is printed.
#[tokio::test]
async fn test_cached_update_notice_without_network() -> Result<()> {
    let h = Harness::new().await?;
    let any = h
        .server
        .mock_async(|_when, then| {
            then.status(500);
        })
        .await;
    h.seed_cache("1.3.0", chrono::Duration::minutes(1)).await?;

    let result = check_and_update(h.options("1.2.0"), &Defaults::standard()).await?;

    assert!(result.update_available);
    assert!(!result.updated);
    assert_eq!(result.latest_version.as_deref(), Some("1.3.0"));
    assert_eq!(h.buffer.lines(), vec!["Update available (1.2.0 → 1.3.0)."]);
    any.assert_calls_async(0).await;
    assert_eq!(h.exe_contents(), OLD_BINARY);
    Ok(())
}

/// A network lookup that finds the current version refreshes the cache.
#[tokio::test]
async fn test_network_lookup_refreshes_cache() -> Result<()> {
    let h = Harness::new().await?;
    let latest = h
        .server
        .mock_async(|when, then| {
            when.method(GET).path(LATEST_PATH);
            then.status(200).body(r#"{"tag_name":"v2.0.0"}"#);
        })
        .await;

    let result = check_and_update(h.options("2.0.0"), &Defaults::standard()).await?;

    assert!(!result.update_available);
    assert!(!result.updated);
    latest.assert_calls_async(1).await;

    let cached = cache::read(&h.cache_path()).await?;
    assert_eq!(cached.latest_version, "v2.0.0");
    assert_eq!(cached.checked_at, Some(now()));

    // A second run within the interval is served from the cache
    let again = check_and_update(h.options("2.0.0"), &Defaults::standard()).await?;
    assert_eq!(again.latest_version.as_deref(), Some("2.0.0"));
    latest.assert_calls_async(1).await;
    Ok(())
}

/// Auto-update downloads, verifies and swaps the executable, which then runs.
#[tokio::test]
async fn test_auto_update_replaces_executable() -> Result<()> {
    let h = Harness::new().await?;
    h.seed_cache("v1.3.0", chrono::Duration::hours(1)).await?;
    let asset = h
        .server
        .mock_async(|when, then| {
            when.method(GET)
                .path(ASSET_PATH)
                .header("user-agent", "updraft/1.2.0");
            then.status(200).body(NEW_BINARY);
        })
        .await;
    let manifest = format!(
        "{}  updraft-darwin-arm64\n{}  updraft-linux-amd64\n",
        "a".repeat(64),
        ChecksumVerifier::sha256_hex(NEW_BINARY)
    );
    h.server
        .mock_async(|when, then| {
            when.method(GET).path(CHECKSUMS_PATH);
            then.status(200).body(manifest);
        })
        .await;

    let result = check_and_update(
        Options {
            auto_update: true,
            ..h.options("1.2.0")
        },
        &Defaults::standard(),
    )
    .await?;

    assert!(result.update_available);
    assert!(result.updated);
    assert_eq!(result.install_method, InstallMethod::Manual);
    assert_eq!(
        h.buffer.lines(),
        vec!["Updating updraft to 1.3.0...", "Updated updraft to 1.3.0."]
    );
    asset.assert_calls_async(1).await;
    assert_eq!(h.exe_contents(), NEW_BINARY);
    assert!(h.staged_files().is_empty());

    #[cfg(unix)]
    {
        let code = updraft::upgrade::restart::restart(
            &result.executable_path,
            &["updraft".to_string(), "version".to_string()],
            Vec::<(String, String)>::new(),
        )
        .await?;
        assert_eq!(code, 3);
    }
    Ok(())
}

/// A checksum mismatch aborts before the rename and cleans up the staged file.
#[tokio::test]
async fn test_checksum_mismatch_keeps_old_binary() -> Result<()> {
    let h = Harness::new().await?;
    h.seed_cache("1.3.0", chrono::Duration::hours(1)).await?;
    h.server
        .mock_async(|when, then| {
            when.method(GET).path(ASSET_PATH);
            then.status(200).body(NEW_BINARY);
        })
        .await;
    h.server
        .mock_async(|when, then| {
            when.method(GET).path(CHECKSUMS_PATH);
            then.status(200)
                .body(format!("{}  updraft-linux-amd64\n", "f".repeat(64)));
        })
        .await;

    let err = check_and_update(
        Options {
            auto_update: true,
            ..h.options("1.2.0")
        },
        &Defaults::standard(),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<UpdateError>(),
        Some(UpdateError::ChecksumMismatch { .. })
    ));
    assert_eq!(h.exe_contents(), OLD_BINARY);
    assert!(h.staged_files().is_empty());
    assert_eq!(h.buffer.lines(), vec!["Updating updraft to 1.3.0..."]);
    Ok(())
}

/// A failed asset download is an error and leaves the executable alone.
#[tokio::test]
async fn test_download_failure_keeps_old_binary() -> Result<()> {
    let h = Harness::new().await?;
    h.seed_cache("1.3.0", chrono::Duration::hours(1)).await?;
    h.server
        .mock_async(|when, then| {
            when.method(GET).path(ASSET_PATH);
            then.status(404);
        })
        .await;

    let err = check_and_update(
        Options {
            auto_update: true,
            ..h.options("1.2.0")
        },
        &Defaults::standard(),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<UpdateError>(),
        Some(UpdateError::DownloadFailed { .. })
    ));
    assert_eq!(h.exe_contents(), OLD_BINARY);
    assert!(h.staged_files().is_empty());
    Ok(())
}

/// Homebrew installs are pointed at brew even with auto-update on.
#[tokio::test]
async fn test_homebrew_install_is_not_replaced() -> Result<()> {
    let h = Harness::new().await?;
    h.seed_cache("1.3.0", chrono::Duration::hours(1)).await?;
    let any = h
        .server
        .mock_async(|_when, then| {
            then.status(500);
        })
        .await;
    let cellar_exe = PathBuf::from("/opt/homebrew/Cellar/updraft/1.2.0/bin/updraft");

    let result = check_and_update(
        Options {
            auto_update: true,
            resolve_symlinks: Some(Arc::new(move |_: &Path| -> std::io::Result<PathBuf> {
                Ok(cellar_exe.clone())
            })),
            ..h.options("1.2.0")
        },
        &Defaults::standard(),
    )
    .await?;

    assert_eq!(result.install_method, InstallMethod::Homebrew);
    assert!(!result.updated);
    assert_eq!(
        h.buffer.lines(),
        vec!["Update available (1.2.0 → 1.3.0). Run: brew upgrade updraft-dev/tap/updraft"]
    );
    any.assert_calls_async(0).await;
    assert_eq!(h.exe_contents(), OLD_BINARY);
    Ok(())
}

/// An unsupported platform fails before any download is attempted.
#[tokio::test]
async fn test_unsupported_platform_fails_without_download() -> Result<()> {
    let h = Harness::new().await?;
    h.seed_cache("1.3.0", chrono::Duration::hours(1)).await?;
    let any = h
        .server
        .mock_async(|_when, then| {
            then.status(500);
        })
        .await;

    let err = check_and_update(
        Options {
            auto_update: true,
            arch: Some("s390x".to_string()),
            ..h.options("1.2.0")
        },
        &Defaults::standard(),
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<UpdateError>(),
        Some(UpdateError::UnsupportedPlatform { .. })
    ));
    any.assert_calls_async(0).await;
    assert_eq!(h.exe_contents(), OLD_BINARY);
    Ok(())
}

/// Dropping the future mid-download leaves no trace on disk.
#[tokio::test]
async fn test_cancelled_download_leaves_executable_intact() -> Result<()> {
    let h = Harness::new().await?;
    h.seed_cache("1.3.0", chrono::Duration::hours(1)).await?;
    h.server
        .mock_async(|when, then| {
            when.method(GET).path(ASSET_PATH);
            then.status(200).delay(Duration::from_secs(5)).body(NEW_BINARY);
        })
        .await;

    let defaults = Defaults::standard();
    let check = check_and_update(
        Options {
            auto_update: true,
            ..h.options("1.2.0")
        },
        &defaults,
    );
    let outcome = tokio::time::timeout(Duration::from_millis(200), check).await;

    assert!(outcome.is_err(), "check should still be waiting on the download");
    assert_eq!(h.exe_contents(), OLD_BINARY);
    assert!(h.staged_files().is_empty());
    Ok(())
}
