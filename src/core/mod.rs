//! Core types shared across the crate.
//!
//! Currently this is the error vocabulary: [`UpdateError`] for failures the
//! update subsystem raises, and [`ErrorContext`] for presenting them.

pub mod error;

pub use error::{ErrorContext, UpdateError, user_friendly_error};
