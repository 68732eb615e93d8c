// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Installs one global `tracing` subscriber. `log` records from the
//! `no_std` crates are bridged into it, so firmware logging shows up in host
//! tools without changes.

use anyhow::{Context, Result};
use tracing::Subscriber;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;
use crate::config::{LogFormat, LoggingConfig};

#[cfg(feature = "file-logging")]
use chrono::{NaiveDateTime, Utc};
#[cfg(feature = "file-logging")]
use std::path::{Path, PathBuf};
#[cfg(feature = "file-logging")]
use tracing_appender::rolling;

#[cfg(feature = "file-logging")]
const RUN_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Build the `EnvFilter` for the debug flags on top of `level`
pub fn build_filter(debug_flags: &CrateDebugFlags, level: &str) -> Result<EnvFilter> {
    let directives = debug_flags.to_filter_string(level);
    EnvFilter::try_new(&directives)
        .with_context(|| format!("Invalid log filter directives: {}", directives))
}

fn console_layer<S>(config: &LoggingConfig) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let layer = tracing_subscriber::fmt::layer()
        .with_target(config.with_target)
        .with_file(false)
        .with_line_number(false);
    match config.format {
        LogFormat::Full => layer.boxed(),
        LogFormat::Compact => layer.compact().boxed(),
    }
}

/// Initialize console-only logging
///
/// # Errors
///
/// Fails when the filter does not parse or a global subscriber is already
/// installed.
pub fn init_console_logging(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(debug_flags, &config.level)?;

    Registry::default()
        .with(console_layer(config).with_filter(filter))
        .try_init()
        .context("Failed to install the tracing subscriber")?;

    tracing::debug!(filter = %debug_flags.to_filter_string(&config.level), "Logging initialized");
    Ok(())
}

/// Logging initialization result; flushes the log file on drop
#[cfg(feature = "file-logging")]
pub struct LoggingGuard {
    _file_guard: tracing_appender::non_blocking::WorkerGuard,
    log_dir: PathBuf,
}

#[cfg(feature = "file-logging")]
impl LoggingGuard {
    /// Get the run folder path
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

/// Initialize logging with console output and a per-run log file
///
/// Creates a timestamped folder structure:
/// ```text
/// ./logs/
///   └── run_20250101_120000/
///       └── cdc_console.log.2025-01-01
/// ```
///
/// Old run folders are removed according to `retention_days` and
/// `retention_runs`.
#[cfg(feature = "file-logging")]
pub fn init_logging(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<LoggingGuard> {
    let timestamp = Utc::now().format(RUN_TIMESTAMP_FORMAT);
    let run_folder = config.log_dir.join(format!("run_{}", timestamp));
    std::fs::create_dir_all(&run_folder)
        .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;

    cleanup_old_logs(&config.log_dir, config.retention_days, config.retention_runs)?;

    let file_appender = rolling::daily(&run_folder, "cdc_console.log");
    let (non_blocking, file_guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_filter(build_filter(debug_flags, &config.level)?);

    Registry::default()
        .with(console_layer(config).with_filter(build_filter(debug_flags, &config.level)?))
        .with(file_layer)
        .try_init()
        .context("Failed to install the tracing subscriber")?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
        log_dir: run_folder,
    })
}

/// Remove run folders older than `retention_days`, then all but the
/// `retention_runs` most recent
///
/// Returns how many folders were removed.
#[cfg(feature = "file-logging")]
pub fn cleanup_old_logs(
    base_log_dir: &Path,
    retention_days: u64,
    retention_runs: usize,
) -> Result<usize> {
    if !base_log_dir.exists() {
        return Ok(0);
    }

    let cutoff = Utc::now() - chrono::Duration::days(retention_days as i64);

    let mut runs = Vec::new();
    for entry in std::fs::read_dir(base_log_dir)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let stamp = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_prefix("run_"))
            .and_then(|ts| NaiveDateTime::parse_from_str(ts, RUN_TIMESTAMP_FORMAT).ok());
        if let Some(stamp) = stamp {
            runs.push((path, stamp.and_utc()));
        }
    }

    // oldest first
    runs.sort_by_key(|(_, started)| *started);
    let excess = runs.len().saturating_sub(retention_runs);

    let mut removed = 0;
    for (index, (path, started)) in runs.iter().enumerate() {
        if index >= excess && *started >= cutoff {
            continue;
        }
        match std::fs::remove_dir_all(path) {
            Ok(()) => removed += 1,
            Err(e) => eprintln!(
                "Warning: Failed to remove old log directory {}: {}",
                path.display(),
                e
            ),
        }
    }

    Ok(removed)
}
