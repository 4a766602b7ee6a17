//! Checksum manifest lookup and digest verification.
//!
//! Every release carries a `checksums.txt` manifest with one
//! `<sha256-hex> <asset-name>` pair per line:
//!
//! ```text
//! 9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08  updraft-darwin-arm64
//! 60303ae22b998861bce3b28f33eec1be758a213c86c93c076dbe9f558c11c752  updraft-linux-amd64
//! ```
//!
//! Verification is asymmetric. A manifest that cannot be fetched, or that has
//! no line for the asset, only produces a warning. A manifest line that exists
//! and disagrees with the download is a hard [`UpdateError::ChecksumMismatch`].

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::config::ResolvedOptions;
use crate::core::UpdateError;

/// Result of checking a download against the checksum manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// The manifest listed the asset and the digests match.
    Verified,
    /// The manifest has no line for the asset.
    NotListed,
    /// The manifest could not be fetched; carries the reason.
    Unavailable(String),
}

/// Checksum helpers for downloaded release assets.
pub struct ChecksumVerifier;

impl ChecksumVerifier {
    /// Hex-encoded SHA-256 of `data`.
    #[must_use]
    pub fn sha256_hex(data: &[u8]) -> String {
        hex::encode(Sha256::digest(data))
    }

    /// Find the digest for `asset` in a checksum manifest.
    ///
    /// The matching line is the one whose last whitespace-separated field is
    /// exactly `asset`; its first field is the digest. Lines with fewer than
    /// two fields are skipped.
    #[must_use]
    pub fn parse_manifest(manifest: &str, asset: &str) -> Option<String> {
        manifest.lines().find_map(|line| {
            let fields: Vec<&str> = line.split_whitespace().collect();
            match fields.as_slice() {
                [digest, .., name] if *name == asset => Some((*digest).to_string()),
                _ => None,
            }
        })
    }

    /// Compare an expected digest with the actual one, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`UpdateError::ChecksumMismatch`] if they differ.
    pub fn verify_digest(asset: &str, expected: &str, actual: &str) -> Result<()> {
        if !expected.eq_ignore_ascii_case(actual) {
            return Err(UpdateError::ChecksumMismatch {
                asset: asset.to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Download the checksum manifest and return the digest listed for `asset`.
    ///
    /// `Ok(None)` means the manifest was fetched but has no line for the asset.
    ///
    /// # Errors
    ///
    /// Network failures and non-200 responses are returned as errors.
    pub async fn fetch_expected_checksum(
        opts: &ResolvedOptions,
        checksums_url: &str,
        asset: &str,
    ) -> Result<Option<String>> {
        debug!("Fetching checksums from: {}", checksums_url);

        let response = opts
            .client
            .get(checksums_url)
            .header(reqwest::header::USER_AGENT, opts.user_agent())
            .timeout(opts.request_timeout)
            .send()
            .await
            .context("Failed to fetch checksums file")?;

        if response.status() != reqwest::StatusCode::OK {
            anyhow::bail!("checksum request failed: {}", response.status());
        }

        let content = response.text().await.context("Failed to read checksums file content")?;
        Ok(Self::parse_manifest(&content, asset))
    }

    /// Check `actual_digest` against the release manifest.
    ///
    /// Fetch failures and missing entries are reported as [`Verification`]
    /// values and written to the output sink as warnings; only a confirmed
    /// mismatch is an error.
    pub async fn verify_from_release(
        opts: &ResolvedOptions,
        checksums_url: &str,
        asset: &str,
        actual_digest: &str,
    ) -> Result<Verification> {
        match Self::fetch_expected_checksum(opts, checksums_url, asset).await {
            Err(e) => {
                warn!("Checksum manifest unavailable: {:#}", e);
                opts.output.line(format_args!("Warning: failed to verify checksum: {e:#}"));
                Ok(Verification::Unavailable(format!("{e:#}")))
            }
            Ok(None) => {
                warn!("No checksum found for asset: {}", asset);
                opts.output.line("Warning: checksum not found; skipping verification.");
                Ok(Verification::NotListed)
            }
            Ok(Some(expected)) => {
                Self::verify_digest(asset, &expected, actual_digest)?;
                info!("Checksum verification successful for {}", asset);
                Ok(Verification::Verified)
            }
        }
    }
}
