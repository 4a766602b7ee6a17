//! Latest-release lookup against the GitHub releases API.

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use crate::config::ResolvedOptions;
use crate::core::UpdateError;

/// The part of a GitHub release response we read.
#[derive(Debug, Deserialize)]
struct LatestRelease {
    #[serde(default)]
    tag_name: Option<String>,
}

/// URL of the latest-release endpoint for `repo`.
#[must_use]
pub fn latest_release_url(api_base_url: &str, repo: &str) -> String {
    format!("{}/repos/{}/releases/latest", api_base_url.trim_end_matches('/'), repo)
}

/// Fetch the tag of the latest published release, e.g. `v1.4.0`.
///
/// The tag is returned as-is; normalizing it is up to the caller.
///
/// # Errors
///
/// - network failures and timeouts
/// - [`UpdateError::ReleaseLookupFailed`] for a non-2xx response
/// - [`UpdateError::MissingTagName`] if the body has no `tag_name`
pub async fn fetch_latest_tag(opts: &ResolvedOptions) -> Result<String> {
    let url = latest_release_url(&opts.api_base_url, &opts.repo);
    debug!("Fetching latest release from: {}", url);

    let response = opts
        .client
        .get(&url)
        .header(reqwest::header::ACCEPT, "application/vnd.github+json")
        .header(reqwest::header::USER_AGENT, opts.user_agent())
        .timeout(opts.request_timeout)
        .send()
        .await
        .with_context(|| format!("Failed to fetch latest release from {url}"))?;

    let status = response.status();
    if !status.is_success() {
        return Err(UpdateError::ReleaseLookupFailed {
            url,
            status: status.to_string(),
        }
        .into());
    }

    let release: LatestRelease =
        response.json().await.context("Failed to parse latest release response")?;
    let tag = release.tag_name.ok_or(UpdateError::MissingTagName)?;

    debug!("Latest release tag: {}", tag);
    Ok(tag)
}
