//! Error types for the self-update subsystem.
//!
//! Library functions return [`anyhow::Result`] and attach context as they
//! propagate. Failures a caller may want to react to individually are raised
//! as [`UpdateError`] variants, which survive the trip through `anyhow` and can
//! be recovered with [`anyhow::Error::downcast_ref`].
//!
//! Conditions that merely skip an update (disabled, development build, missing
//! release tag) are not errors at all; they are reported through
//! [`CheckResult::skip_reason`](crate::upgrade::CheckResult::skip_reason).
//!
//! # Presentation
//!
//! The binary converts whatever bubbles up into an [`ErrorContext`] via
//! [`user_friendly_error`], which pairs the message with optional details and
//! an actionable suggestion:
//!
//! ```text
//! error: Checksum mismatch for updraft-linux-amd64
//! details: expected 3a7b..., downloaded 9f01...
//! suggestion: Retry later; if this persists, download the release manually
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Domain failures of the update subsystem.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UpdateError {
    /// No release asset is published for this OS/architecture pair.
    #[error("Unsupported platform: {os}/{arch}")]
    UnsupportedPlatform {
        /// Operating system as supplied in the options
        os: String,
        /// Architecture as supplied in the options
        arch: String,
    },

    /// The release asset download returned a non-200 status.
    #[error("Download failed: {url} returned {status}")]
    DownloadFailed {
        /// URL that was requested
        url: String,
        /// HTTP status line
        status: String,
    },

    /// The release-metadata endpoint returned a non-success status.
    #[error("Release lookup failed: {url} returned {status}")]
    ReleaseLookupFailed {
        /// URL that was requested
        url: String,
        /// HTTP status line
        status: String,
    },

    /// Release metadata carried no `tag_name`.
    #[error("Release metadata has no tag_name")]
    MissingTagName,

    /// The manifest listed a digest for the asset and the download did not match it.
    #[error("Checksum mismatch for {asset}")]
    ChecksumMismatch {
        /// Asset file name
        asset: String,
        /// Digest listed in the checksum manifest
        expected: String,
        /// Digest of the downloaded bytes
        actual: String,
    },

    /// The running executable could not be located on disk.
    #[error("Update failed: could not resolve executable path")]
    ExecutableNotFound,

    /// Restart was requested without an executable path.
    #[error("Missing executable path for restart")]
    RestartMissingExecutable,

    /// Restart was requested with an empty argument list.
    #[error("Missing args for restart")]
    RestartMissingArgs,

    /// The child process could not be started.
    #[error("Failed to launch {path}: {reason}")]
    RestartLaunchFailed {
        /// Executable that failed to start
        path: String,
        /// Underlying OS error
        reason: String,
    },
}

/// An error paired with optional details and a suggestion for the user.
#[derive(Debug)]
pub struct ErrorContext {
    /// Primary message
    pub message: String,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a context with no details or suggestion.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with a suggestion where one is known.
///
/// The whole `anyhow` chain is searched for an [`UpdateError`], so context
/// added on the way up does not hide it.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let message = format!("{error:#}");

    let Some(update_error) = error.chain().find_map(|e| e.downcast_ref::<UpdateError>()) else {
        if error.chain().any(|e| e.downcast_ref::<reqwest::Error>().is_some()) {
            return ErrorContext::new(message)
                .with_suggestion("Check your network connection, or set UPDRAFT_NO_UPDATE=1 to skip update checks");
        }
        return ErrorContext::new(message);
    };

    match update_error {
        UpdateError::UnsupportedPlatform { .. } => ErrorContext::new(message)
            .with_suggestion("Build from source or download a compatible release manually"),
        UpdateError::ChecksumMismatch { expected, actual, .. } => ErrorContext::new(message)
            .with_details(format!("expected {expected}, downloaded {actual}"))
            .with_suggestion("Retry later; if this persists, download the release manually"),
        UpdateError::DownloadFailed { .. } | UpdateError::ReleaseLookupFailed { .. } => {
            ErrorContext::new(message)
                .with_suggestion("Check your network connection or try again later")
        }
        UpdateError::ExecutableNotFound => ErrorContext::new(message)
            .with_suggestion("Reinstall updraft from the latest GitHub release"),
        UpdateError::RestartLaunchFailed { .. } => ErrorContext::new(message)
            .with_details("The update was installed; only the automatic re-run failed")
            .with_suggestion("Run the command again"),
        UpdateError::MissingTagName
        | UpdateError::RestartMissingExecutable
        | UpdateError::RestartMissingArgs => ErrorContext::new(message),
    }
}
