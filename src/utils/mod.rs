//! Supporting utilities.
//!
//! - [`progress`] - indicatif progress bar drawn onto an [`Output`](crate::config::Output) sink

pub mod progress;

pub use progress::{DownloadProgress, OutputTerm};
