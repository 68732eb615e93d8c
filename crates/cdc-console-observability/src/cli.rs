// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! CLI argument parsing for per-crate debug flags
//!
//! Supports flags like `--debug-cdc-console-core`, `--debug-cdc-console-hal`,
//! etc. to raise one crate to debug level without flooding the rest.

use std::collections::BTreeSet;
use std::env;

use crate::{crate_target, KNOWN_CRATES};

/// Environment variable holding comma-separated crate names (or `all`)
pub const DEBUG_ENV: &str = "CDC_CONSOLE_DEBUG";

/// Parse debug flags from command-line arguments
///
/// # Example
/// ```rust
/// use cdc_console_observability::CrateDebugFlags;
///
/// let flags = CrateDebugFlags::from_args(std::env::args());
/// if flags.is_enabled("cdc-console-core") {
///     // Enable debug logging for the core crate
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrateDebugFlags {
    pub enabled_crates: BTreeSet<String>,
}

impl CrateDebugFlags {
    /// Parse debug flags from command-line arguments
    ///
    /// Looks for arguments matching `--debug-{crate-name}` pattern.
    /// Also supports `--debug-all` to enable all crates.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut flags = CrateDebugFlags::default();
        for arg in args {
            if arg == "--debug-all" {
                flags.enable_all();
            } else if let Some(crate_name) = arg.strip_prefix("--debug-") {
                flags.enable(crate_name);
            }
        }
        flags
    }

    /// Enable debug for each named crate (`all` enables every known crate)
    pub fn with_crates<I, S>(mut self, crates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in crates {
            let name = name.as_ref().trim();
            if name == "all" {
                self.enable_all();
            } else if !name.is_empty() {
                self.enable(name);
            }
        }
        self
    }

    /// Add the crates named in `CDC_CONSOLE_DEBUG`
    pub fn with_env(self) -> Self {
        match env::var(DEBUG_ENV) {
            Ok(value) => self.with_crates(value.split(',')),
            Err(_) => self,
        }
    }

    pub fn enable(&mut self, crate_name: &str) {
        self.enabled_crates.insert(crate_name.to_string());
    }

    fn enable_all(&mut self) {
        for crate_name in KNOWN_CRATES {
            self.enable(crate_name);
        }
    }

    /// Check if debug is enabled for a specific crate
    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.enabled_crates.contains(crate_name)
    }

    /// Check if debug is enabled for any crate
    pub fn any_enabled(&self) -> bool {
        !self.enabled_crates.is_empty()
    }

    /// Get log level for a crate
    ///
    /// Returns `tracing::Level::DEBUG` if enabled, `tracing::Level::INFO` otherwise.
    pub fn log_level(&self, crate_name: &str) -> tracing::Level {
        if self.is_enabled(crate_name) {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Create a tracing filter from debug flags
    ///
    /// Format: `"cdc_console_core=debug,cdc_console_hal=debug,info"`, where the
    /// trailing directive is `default_level`.
    pub fn to_filter_string(&self, default_level: &str) -> String {
        let mut filters: Vec<String> = self
            .enabled_crates
            .iter()
            .map(|name| format!("{}=debug", crate_target(name)))
            .collect();
        filters.push(default_level.to_lowercase());
        filters.join(",")
    }
}

/// Parse debug flags from the process arguments and `CDC_CONSOLE_DEBUG`
///
/// Environment variable format: comma-separated crate names, e.g.
/// `"cdc-console-core,cdc-console-hal"`, or `all`.
pub fn parse_debug_flags() -> CrateDebugFlags {
    CrateDebugFlags::from_args(env::args()).with_env()
}

/// Generate help text for debug flags
pub fn debug_flags_help() -> String {
    format!(
        r#"Debug Flags:
  --debug-all                    Enable debug logging for all crates
  --debug-{{crate-name}}          Enable debug logging for specific crate

Available crates:
  {}

Environment Variable:
  {env}={{crate-name}}[,{{crate-name}}]  Enable debug for crates (comma-separated)
  {env}=all                            Enable debug for all crates

Examples:
  --debug-cdc-console-core
  {env}=cdc-console-core,cdc-console-hal
"#,
        KNOWN_CRATES.join(", "),
        env = DEBUG_ENV
    )
}
