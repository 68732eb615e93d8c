// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # cdc-console-observability
//!
//! Logging for the host-side tools of the CDC console.
//!
//! The firmware crates log through the `log` facade; this crate installs a
//! `tracing` subscriber that also receives those records, filtered with
//! per-crate debug flags.
//!
//! ## Features
//! - `file-logging`: timestamped run folders with daily rotation and retention

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

pub use cli::*;
pub use config::*;
pub use init::*;

/// Known crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "cdc-console",
    "cdc-console-core",
    "cdc-console-hal",
    "cdc-console-config",
    "cdc-console-observability",
];

/// `tracing` target prefix used by a crate (`-` becomes `_`)
pub fn crate_target(crate_name: &str) -> String {
    crate_name.replace('-', "_")
}
