// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{CdcConsoleConfig, ConfigError, ConfigResult};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// File name searched for when no path is given
pub const CONFIG_FILE_NAME: &str = "cdc_console.toml";

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "CDC_CONSOLE_CONFIG_PATH";

/// Find the configuration file
///
/// Search order:
/// 1. `CDC_CONSOLE_CONFIG_PATH` environment variable
/// 2. Current working directory: `./cdc_console.toml`
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by {} not found: {}",
            CONFIG_PATH_ENV,
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        for ancestor in cwd.ancestors().skip(1).take(5) {
            search_paths.push(ancestor.join(CONFIG_FILE_NAME));
        }
    }

    if let Some(path) = search_paths.iter().find(|p| p.exists()) {
        return Ok(path.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet {} to specify a custom location.",
        CONFIG_FILE_NAME, search_list, CONFIG_PATH_ENV
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if the config file is not found or contains invalid TOML.
/// Values are not validated here; see [`validate_config`](crate::validate_config).
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<CdcConsoleConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: CdcConsoleConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `CDC_CONSOLE_INTERRUPT_CHAR` -> `console.interrupt_char` (decimal or `0x..`)
/// - `CDC_CONSOLE_INTERRUPT_ENABLED` -> `console.interrupt_enabled`
/// - `CDC_CONSOLE_DISCARD_READ_LEN` -> `console.discard_read_len`
/// - `CDC_CONSOLE_RESET_BAUD_RATE` -> `control.reset_baud_rate`
/// - `CDC_CONSOLE_BOOTLOADER_RESET` -> `control.bootloader_reset`
/// - `CDC_CONSOLE_MAX_WRITE_ATTEMPTS` -> `transmit.max_write_attempts`
/// - `CDC_CONSOLE_LOG_LEVEL` -> `logging.level`
///
/// Values that fail to parse are ignored.
pub fn apply_environment_overrides(config: &mut CdcConsoleConfig) {
    if let Some(byte) = env_value("CDC_CONSOLE_INTERRUPT_CHAR").and_then(|v| parse_byte(&v)) {
        config.console.interrupt_char = byte;
    }
    if let Some(value) = env_value("CDC_CONSOLE_INTERRUPT_ENABLED") {
        config.console.interrupt_enabled = parse_flag(&value);
    }
    if let Some(len) = env_value("CDC_CONSOLE_DISCARD_READ_LEN").and_then(|v| v.parse().ok()) {
        config.console.discard_read_len = len;
    }
    if let Some(baud) = env_value("CDC_CONSOLE_RESET_BAUD_RATE").and_then(|v| v.parse().ok()) {
        config.control.reset_baud_rate = baud;
    }
    if let Some(value) = env_value("CDC_CONSOLE_BOOTLOADER_RESET") {
        config.control.bootloader_reset = parse_flag(&value);
    }
    if let Some(attempts) = env_value("CDC_CONSOLE_MAX_WRITE_ATTEMPTS").and_then(|v| v.parse().ok())
    {
        config.transmit.max_write_attempts = attempts;
    }
    if let Some(level) = env_value("CDC_CONSOLE_LOG_LEVEL") {
        config.logging.level = level;
    }
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - Map of CLI arguments (e.g., `{"reset_baud_rate": "1200", "log_level": "debug"}`)
pub fn apply_cli_overrides(config: &mut CdcConsoleConfig, cli_args: &HashMap<String, String>) {
    if let Some(byte) = cli_args.get("interrupt_char").and_then(|v| parse_byte(v)) {
        config.console.interrupt_char = byte;
    }
    if let Some(value) = cli_args.get("interrupt_enabled") {
        config.console.interrupt_enabled = parse_flag(value);
    }
    if let Some(size) = cli_args.get("rx_buffer_size").and_then(|v| v.parse().ok()) {
        config.console.rx_buffer_size = size;
    }
    if let Some(len) = cli_args.get("discard_read_len").and_then(|v| v.parse().ok()) {
        config.console.discard_read_len = len;
    }
    if let Some(baud) = cli_args.get("reset_baud_rate").and_then(|v| v.parse().ok()) {
        config.control.reset_baud_rate = baud;
    }
    if let Some(value) = cli_args.get("bootloader_reset") {
        config.control.bootloader_reset = parse_flag(value);
    }
    if let Some(attempts) = cli_args.get("max_write_attempts").and_then(|v| v.parse().ok()) {
        config.transmit.max_write_attempts = attempts;
    }
    if let Some(level) = cli_args.get("log_level") {
        config.logging.level = level.clone();
    }
}

fn env_value(name: &str) -> Option<String> {
    env::var(name).ok()
}

fn parse_flag(value: &str) -> bool {
    let value = value.to_lowercase();
    value == "true" || value == "1" || value == "yes"
}

fn parse_byte(value: &str) -> Option<u8> {
    let value = value.trim();
    match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16).ok(),
        None => value.parse().ok(),
    }
}
