//! Integration test suite for updraft
//!
//! End-to-end tests of the self-update flow against a local mock release
//! server, and of the `updraft` binary itself.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **self_update**: `check_and_update` from skip conditions through the binary swap
//! - **cli**: the compiled binary via `assert_cmd`

mod cli;
mod self_update;
