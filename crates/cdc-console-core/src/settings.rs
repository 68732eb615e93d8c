// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use crate::control::BOOTLOADER_RESET_BAUD;
use crate::filter::DEFAULT_INTERRUPT_CHAR;
use crate::transmit::WritePolicy;
use crate::transport::MAX_PACKET_SIZE;

/// Receive buffer capacity used when none is given
pub const DEFAULT_RX_CAPACITY: usize = 128;

/// Runtime knobs for a [`CdcConsole`](crate::CdcConsole)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsoleSettings {
    /// Byte diverted into a cancellation signal; `None` disables filtering
    pub interrupt_char: Option<u8>,

    /// Baud rate that arms reset-on-disconnect; `None` disables the convention
    pub reset_baud_rate: Option<u32>,

    /// Bytes read and dropped when the connection is first enabled
    pub discard_read_len: usize,

    /// Transmit retry budget
    pub write_policy: WritePolicy,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            interrupt_char: Some(DEFAULT_INTERRUPT_CHAR),
            reset_baud_rate: Some(BOOTLOADER_RESET_BAUD),
            discard_read_len: MAX_PACKET_SIZE,
            write_policy: WritePolicy::default(),
        }
    }
}
