// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines the structs that map to sections in
//! `cdc_console.toml`. Every field has a default, so an empty file is a
//! valid configuration.

use cdc_console_core::{
    ConsoleSettings, WritePolicy, BOOTLOADER_RESET_BAUD, DEFAULT_INTERRUPT_CHAR,
    DEFAULT_MAX_WRITE_ATTEMPTS, DEFAULT_RX_CAPACITY, MAX_PACKET_SIZE,
};
use serde::{Deserialize, Serialize};

use crate::{ConfigError, ConfigResult};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CdcConsoleConfig {
    pub console: ConsoleConfig,
    pub control: ControlConfig,
    pub transmit: TransmitConfig,
    pub logging: LoggingConfig,
}

/// Receive side: interrupt character and buffer sizing
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub interrupt_char: u8,
    pub interrupt_enabled: bool,
    /// Must match the capacity the firmware was compiled with
    pub rx_buffer_size: usize,
    pub discard_read_len: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            interrupt_char: DEFAULT_INTERRUPT_CHAR,
            interrupt_enabled: true,
            rx_buffer_size: DEFAULT_RX_CAPACITY,
            discard_read_len: MAX_PACKET_SIZE,
        }
    }
}

/// Reset-to-bootloader convention
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ControlConfig {
    pub bootloader_reset: bool,
    pub reset_baud_rate: u32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            bootloader_reset: true,
            reset_baud_rate: BOOTLOADER_RESET_BAUD,
        }
    }
}

/// Transmit retry budget
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TransmitConfig {
    /// 0 = retry forever
    pub max_write_attempts: u32,
}

impl Default for TransmitConfig {
    fn default() -> Self {
        Self {
            max_write_attempts: DEFAULT_MAX_WRITE_ATTEMPTS,
        }
    }
}

impl TransmitConfig {
    pub fn write_policy(&self) -> WritePolicy {
        match self.max_write_attempts {
            0 => WritePolicy::UNBOUNDED,
            n => WritePolicy::bounded(n),
        }
    }
}

/// Host-side logging
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Crates logged at debug regardless of `level`
    pub debug_crates: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            debug_crates: Vec::new(),
        }
    }
}

impl CdcConsoleConfig {
    /// Runtime settings for the console core
    pub fn console_settings(&self) -> ConsoleSettings {
        ConsoleSettings {
            interrupt_char: self
                .console
                .interrupt_enabled
                .then_some(self.console.interrupt_char),
            reset_baud_rate: self
                .control
                .bootloader_reset
                .then_some(self.control.reset_baud_rate),
            discard_read_len: self.console.discard_read_len,
            write_policy: self.transmit.write_policy(),
        }
    }

    /// Compare `rx_buffer_size` with the capacity a console was built with
    ///
    /// # Errors
    ///
    /// `ConfigError::CapacityMismatch` when they differ.
    pub fn check_rx_capacity(&self, compiled: usize) -> ConfigResult<()> {
        if self.console.rx_buffer_size != compiled {
            return Err(ConfigError::CapacityMismatch {
                configured: self.console.rx_buffer_size,
                compiled,
            });
        }
        Ok(())
    }
}
