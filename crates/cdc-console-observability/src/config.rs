// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level for crates without a debug flag (trace, debug, info, warn, error)
    pub level: String,

    /// Console line format
    pub format: LogFormat,

    /// Print the emitting module path
    pub with_target: bool,

    /// Base directory for run folders (`file-logging` feature)
    pub log_dir: PathBuf,

    /// Keep run folders for N days
    pub retention_days: u64,

    /// Keep the N most recent run folders
    pub retention_runs: usize,
}

/// Console line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Full,
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            format: LogFormat::Full,
            with_target: false,
            log_dir: PathBuf::from("./logs"),
            retention_days: 30,
            retention_runs: 10,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: impl Into<String>) -> Self {
        LoggingConfig {
            level: level.into(),
            ..LoggingConfig::default()
        }
    }
}
