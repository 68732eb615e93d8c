// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # cdc-console - USB CDC serial console for interpreter firmware
//!
//! Bridges an interrupt-driven USB CDC-ACM transport and a single-threaded
//! cooperative interpreter loop: received bytes are buffered in an
//! interrupt-safe ring, Ctrl-C becomes a keyboard interrupt instead of
//! data, opening the port at 1200 baud and dropping DTR reboots into the
//! bootloader, and writes retry while the endpoint is busy.
//!
//! ## Crates
//!
//! | Crate | Re-exported as | `no_std` |
//! |---|---|---|
//! | `cdc-console-core` | [`driver`] | yes |
//! | `cdc-console-hal` | [`hal`] | yes |
//! | `cdc-console-config` | [`config`] | no |
//! | `cdc-console-observability` | [`observability`] | no |
//!
//! Firmware depends on `cdc-console-core` and `cdc-console-hal` directly.
//! This umbrella crate is for host tools: it adds the [`sim`] module, a
//! scripted host session over the in-memory loopback transport.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cdc_console::prelude::*;
//!
//! let mut sim: Simulator = Simulator::new(ConsoleSettings::default());
//! sim.plug_in();
//! sim.open_port(115_200)?;
//! sim.type_text(b"1 + 1\r")?;
//! sim.run_foreground()?;
//! println!("{}", String::from_utf8_lossy(&sim.host_output()));
//! # Ok::<(), cdc_console::driver::CdcError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Interpreter loop (foreground)                          │
//! │  bytes_available / read / write                         │
//! └─────────────────────────────────────────────────────────┘
//!                         ↕
//! ┌─────────────────────────────────────────────────────────┐
//! │  CdcConsole: ring buffer, interrupt filter, connection, │
//! │  control monitor, transmit gate                         │
//! └─────────────────────────────────────────────────────────┘
//!                         ↕  dispatch(TransportEvent)
//! ┌─────────────────────────────────────────────────────────┐
//! │  CdcTransport: usbd-serial, vendor stack, loopback      │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

// Re-export member crates
pub use cdc_console_config as config;
pub use cdc_console_core as driver;
pub use cdc_console_hal as hal;
pub use cdc_console_observability as observability;

pub mod sim;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::driver::prelude::*;
    pub use crate::driver::{ConsoleStats, WritePolicy};
    pub use crate::hal::{LoopbackTransport, RecordingHost, UsbCdcProvider};
    pub use crate::sim::{SimReport, Simulator};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_facade_imports() {
        use crate::prelude::*;
        let settings = ConsoleSettings::default();
        assert_eq!(settings.interrupt_char, Some(0x03));
    }
}
