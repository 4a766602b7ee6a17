//! Test utilities for updraft.
//!
//! Helpers shared by unit and integration tests: once-guarded logging, a
//! fixed clock, a symlink resolver that leaves paths alone, and a stand-in
//! executable to update.
//!
//! Available under `cfg(test)` and with the `test-utils` feature.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};

use chrono::{DateTime, Utc};
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::config::{Clock, SymlinkResolver};

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has any effect. With `level` set, that level is used;
/// otherwise `RUST_LOG` is honoured, and without either nothing is logged.
///
/// ```rust,no_run
/// use tracing::Level;
///
/// updraft::test_utils::init_test_logging(None);
/// updraft::test_utils::init_test_logging(Some(Level::DEBUG));
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// A clock that always returns `at`.
#[must_use]
pub fn fixed_clock(at: DateTime<Utc>) -> Clock {
    Arc::new(move || at)
}

/// A resolver that returns its input unchanged.
#[must_use]
pub fn identity_resolver() -> SymlinkResolver {
    Arc::new(|path: &Path| -> std::io::Result<PathBuf> { Ok(path.to_path_buf()) })
}

/// Write a stand-in executable named `name` into `dir` and return its path.
///
/// # Panics
///
/// Panics if the file cannot be written.
pub fn install_fake_binary(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("failed to write fake binary");

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
            .expect("failed to mark fake binary executable");
    }

    path
}
