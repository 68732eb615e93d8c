// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Checks that values are within the ranges the console can honour. All
//! problems are collected and reported together.

use cdc_console_core::MAX_PACKET_SIZE;

use crate::{CdcConsoleConfig, ConfigError, ConfigResult};

/// Smallest receive buffer worth configuring: one full packet
pub const MIN_RX_BUFFER_SIZE: usize = MAX_PACKET_SIZE;

pub const MAX_RX_BUFFER_SIZE: usize = 4096;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    OutOfRange {
        field: String,
        value: u64,
        min: u64,
        max: u64,
    },
    InvalidValue {
        field: String,
        reason: String,
    },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange {
                field,
                value,
                min,
                max,
            } => {
                write!(
                    f,
                    "{} = {} is outside valid range ({}-{})",
                    field, value, min, max
                )
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &CdcConsoleConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_console(config, &mut errors);
    validate_control(config, &mut errors);
    validate_logging(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn check_range(
    field: &str,
    value: usize,
    min: usize,
    max: usize,
    errors: &mut Vec<ConfigValidationError>,
) {
    if value < min || value > max {
        errors.push(ConfigValidationError::OutOfRange {
            field: field.to_string(),
            value: value as u64,
            min: min as u64,
            max: max as u64,
        });
    }
}

fn validate_console(config: &CdcConsoleConfig, errors: &mut Vec<ConfigValidationError>) {
    check_range(
        "console.rx_buffer_size",
        config.console.rx_buffer_size,
        MIN_RX_BUFFER_SIZE,
        MAX_RX_BUFFER_SIZE,
        errors,
    );
    check_range(
        "console.discard_read_len",
        config.console.discard_read_len,
        1,
        MAX_PACKET_SIZE,
        errors,
    );
}

fn validate_control(config: &CdcConsoleConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.control.bootloader_reset && config.control.reset_baud_rate == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "control.reset_baud_rate".to_string(),
            reason: "must be greater than 0".to_string(),
        });
    }
}

fn validate_logging(config: &CdcConsoleConfig, errors: &mut Vec<ConfigValidationError>) {
    let level = config.logging.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!(
                "'{}' is not one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }
}
