//! Download progress drawn onto an [`Output`] sink.
//!
//! indicatif normally draws to a terminal. Here the target is whatever sink
//! the caller configured, so [`OutputTerm`] adapts an [`Output`] to
//! indicatif's [`TermLike`] using plain ANSI cursor movement.
//!
//! The bar is purely a side channel: [`DownloadProgress::for_length`]
//! returns `None` when the expected size is unknown or zero, and drawing
//! failures never reach the download.

use std::fmt;
use std::io::{self, Write};

use indicatif::{ProgressBar as IndicatifBar, ProgressDrawTarget, ProgressStyle, TermLike};

use crate::config::Output;

/// Width assumed for the sink; it is rarely a real terminal.
const TERM_WIDTH: u16 = 80;

/// Adapter exposing an [`Output`] as an indicatif terminal.
#[derive(Clone)]
pub struct OutputTerm {
    output: Output,
}

impl OutputTerm {
    /// Wrap `output`.
    #[must_use]
    pub fn new(output: Output) -> Self {
        Self { output }
    }

    fn escape(&self, n: usize, code: char) -> io::Result<()> {
        if n == 0 {
            return Ok(());
        }
        self.output.write_str(&format!("\x1b[{n}{code}"))
    }
}

impl fmt::Debug for OutputTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputTerm").finish_non_exhaustive()
    }
}

impl TermLike for OutputTerm {
    fn width(&self) -> u16 {
        TERM_WIDTH
    }

    fn move_cursor_up(&self, n: usize) -> io::Result<()> {
        self.escape(n, 'A')
    }

    fn move_cursor_down(&self, n: usize) -> io::Result<()> {
        self.escape(n, 'B')
    }

    fn move_cursor_right(&self, n: usize) -> io::Result<()> {
        self.escape(n, 'C')
    }

    fn move_cursor_left(&self, n: usize) -> io::Result<()> {
        self.escape(n, 'D')
    }

    fn write_line(&self, s: &str) -> io::Result<()> {
        self.output.write_str(&format!("{s}\n"))
    }

    fn write_str(&self, s: &str) -> io::Result<()> {
        self.output.write_str(s)
    }

    fn clear_line(&self) -> io::Result<()> {
        self.output.write_str("\r\x1b[2K")
    }

    fn flush(&self) -> io::Result<()> {
        Ok(())
    }
}

/// A byte-counting progress bar for the binary download.
///
/// Implements [`Write`] so it can sit in the same fan-out as the temp file
/// and the digest; writes only advance the bar and never fail.
pub struct DownloadProgress {
    bar: IndicatifBar,
}

impl DownloadProgress {
    /// A bar for a download of `content_length` bytes, or `None` if the
    /// length is unknown or zero.
    #[must_use]
    pub fn for_length(content_length: Option<u64>, output: &Output) -> Option<Self> {
        let len = content_length.filter(|len| *len > 0)?;

        let bar = IndicatifBar::with_draw_target(
            Some(len),
            ProgressDrawTarget::term_like(Box::new(OutputTerm::new(output.clone()))),
        );
        bar.set_style(download_style());
        bar.set_message("Downloading update");
        Some(Self { bar })
    }

    /// Clear the bar from the sink.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    /// Bytes counted so far.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

impl Write for DownloadProgress {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.bar.inc(buf.len() as u64);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn download_style() -> ProgressStyle {
    ProgressStyle::with_template("{msg} [{bar:24}] {bytes}/{total_bytes}")
        .map(|style| style.progress_chars("=>-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}
