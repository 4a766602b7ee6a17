//! Shared output sink for user-facing status lines and the progress bar.

use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

/// A cloneable handle to the writer status messages are printed on.
///
/// The update subsystem never prints to stdout or stderr directly; every
/// message goes through the `Output` supplied in
/// [`Options`](super::Options). The default discards everything.
#[derive(Clone)]
pub struct Output {
    inner: Arc<Mutex<dyn Write + Send>>,
}

impl Output {
    /// Wrap any writer.
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            inner: Arc::new(Mutex::new(writer)),
        }
    }

    /// Standard error of the current process.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    /// A sink that drops everything written to it.
    #[must_use]
    pub fn discard() -> Self {
        Self::new(io::sink())
    }

    /// An in-memory sink together with a handle for reading what was written.
    #[must_use]
    pub fn buffered() -> (Self, OutputBuffer) {
        let buffer: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
        let output = Self {
            inner: buffer.clone(),
        };
        (output, OutputBuffer { buffer })
    }

    /// Print one status line.
    ///
    /// Write failures are logged and otherwise ignored; a closed terminal must
    /// not turn into an update failure.
    pub fn line(&self, message: impl fmt::Display) {
        let mut writer = self.lock();
        if let Err(e) = writeln!(writer, "{message}").and_then(|()| writer.flush()) {
            debug!("Failed to write status line: {}", e);
        }
    }

    /// Write raw text without a trailing newline.
    pub fn write_str(&self, text: &str) -> io::Result<()> {
        let mut writer = self.lock();
        writer.write_all(text.as_bytes())?;
        writer.flush()
    }

    fn lock(&self) -> MutexGuard<'_, dyn Write + Send + 'static> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Output {
    fn default() -> Self {
        Self::discard()
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Output").finish_non_exhaustive()
    }
}

/// Read side of [`Output::buffered`].
#[derive(Clone, Debug)]
pub struct OutputBuffer {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl OutputBuffer {
    /// Everything written so far, lossily decoded as UTF-8.
    #[must_use]
    pub fn contents(&self) -> String {
        let bytes = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Non-empty lines written so far.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect()
    }
}
