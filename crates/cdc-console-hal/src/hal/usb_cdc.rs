// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! USB CDC (Communications Device Class) Hardware Abstraction Layer
//!
//! Application code (a REPL, a log sink) talks to the console through the
//! UART-like [`UsbCdcProvider`] trait, so it does not care whether the bytes
//! come from `usbd-serial`, a vendor SDK or the in-memory loopback.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ Application (interpreter loop)               │
//! └─────────────────┬────────────────────────────┘
//!                   │ uses
//! ┌─────────────────▼────────────────────────────┐
//! │ UsbCdcProvider trait (THIS FILE)             │
//! │ - write() / read() / flush()                 │
//! │ - is_connected() / connection_status()       │
//! └─────────────────┬────────────────────────────┘
//!                   │ implemented by
//! ┌─────────────────▼────────────────────────────┐
//! │ CdcConsole<T: CdcTransport, H: HostHooks, N> │
//! │ - LoopbackTransport (host)                   │
//! │ - UsbdSerialTransport (usb-device)           │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cdc_console_hal::hal::{writeln, UsbCdcProvider};
//!
//! writeln(&mut console, b">>> ")?;
//!
//! let mut line = [0u8; 64];
//! let len = cdc_console_hal::hal::read_line(&mut console, &mut line)?;
//! ```

use cdc_console_core::{CdcConsole, CdcError, CdcTransport, HostHooks};

/// USB CDC connection status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsbConnectionStatus {
    /// Interface not enumerated by the host
    Disconnected,
    /// Enumerated, but no terminal holds the port open (DTR low)
    Enumerated,
    /// Enumerated and DTR asserted
    Connected,
}

/// USB CDC serial provider trait
///
/// Follows UART-like semantics: `write()` sends data, `read()` receives
/// data. `read()` never blocks; it returns `Ok(0)` when nothing is waiting.
///
/// Implementations do NOT need to be `Send` or `Sync`.
pub trait UsbCdcProvider {
    /// Platform-specific error type
    type Error: core::fmt::Debug;

    /// Whether the interface is usable for I/O
    fn is_connected(&self) -> bool;

    /// More detail than `is_connected()`
    fn connection_status(&self) -> UsbConnectionStatus;

    /// Send data to the host
    ///
    /// # Returns
    ///
    /// - `Ok(n)` where `n` is the number of bytes consumed
    /// - `Err(e)` if the write failed
    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error>;

    /// Receive data from the host
    ///
    /// # Returns
    ///
    /// - `Ok(n)` where `n` is the number of bytes read (0 if no data available)
    /// - `Err(e)` if the read failed
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, Self::Error>;

    /// Block until queued TX data has been handed to the transport
    fn flush(&mut self) -> Result<(), Self::Error>;

    /// Number of bytes available to read (default: 0, unknown)
    fn available(&self) -> usize {
        0
    }
}

impl<T, H, const N: usize> UsbCdcProvider for CdcConsole<T, H, N>
where
    T: CdcTransport,
    H: HostHooks,
{
    type Error = CdcError;

    fn is_connected(&self) -> bool {
        CdcConsole::is_connected(self)
    }

    fn connection_status(&self) -> UsbConnectionStatus {
        if !CdcConsole::is_connected(self) {
            UsbConnectionStatus::Disconnected
        } else if self.dtr() {
            UsbConnectionStatus::Connected
        } else {
            UsbConnectionStatus::Enumerated
        }
    }

    fn write(&mut self, data: &[u8]) -> Result<usize, Self::Error> {
        CdcConsole::write(self, data)?;
        Ok(data.len())
    }

    fn read(&mut self, buffer: &mut [u8]) -> Result<usize, Self::Error> {
        Ok(self.read_into(buffer))
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        // the transmit gate hands every byte to the transport before returning
        Ok(())
    }

    fn available(&self) -> usize {
        self.available_count()
    }
}

/// Helper: Write a complete line with newline
pub fn writeln<T: UsbCdcProvider>(usb: &mut T, data: &[u8]) -> Result<(), T::Error> {
    usb.write(data)?;
    usb.write(b"\n")?;
    Ok(())
}

/// Helper: Read until newline or buffer full
///
/// Returns the number of bytes read (including newline if present).
pub fn read_line<T: UsbCdcProvider>(usb: &mut T, buffer: &mut [u8]) -> Result<usize, T::Error> {
    let mut total = 0;
    while total < buffer.len() {
        let n = usb.read(&mut buffer[total..total + 1])?;
        if n == 0 {
            break; // No more data available
        }
        total += n;

        if buffer[total - 1] == b'\n' {
            break;
        }
    }
    Ok(total)
}
