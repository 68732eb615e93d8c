// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # CDC Console Core
//!
//! Byte-stream bridge between an interrupt-driven USB CDC-ACM transport and
//! a single-threaded cooperative foreground loop (an interpreter REPL).
//!
//! This crate provides:
//! - **Ring buffer** (`ring_buffer`) - fixed-capacity receive queue shared
//!   between the receive interrupt and the foreground, guarded by
//!   `critical-section`
//! - **Interrupt character filter** (`filter`) - diverts Ctrl-C into a
//!   cancellation signal instead of storing it
//! - **Connection state machine** (`connection`) - lazy one-shot activation
//! - **Control signal monitor** (`control`) - the "open at 1200 baud, then
//!   close" bootloader reset convention
//! - **Transmit gate** (`transmit`) - busy-retry with a bounded budget
//! - **Console** (`console`) - the stream API and transport handlers
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cdc_console_core::{CdcConsole, ConsoleSettings};
//!
//! let console: CdcConsole<_, _, 128> =
//!     CdcConsole::new(transport, hooks, ConsoleSettings::default());
//!
//! // USB interrupt
//! for event in transport_events {
//!     let _ = console.dispatch(event);
//! }
//!
//! // Interpreter loop
//! while console.bytes_available() {
//!     let byte = console.read();
//!     console.write(&[byte])?;
//! }
//! ```
//!
//! ## Features
//!
//! - `default` = `[]` (no_std)
//! - `std` = `std::error::Error` implementations

#![cfg_attr(not(any(test, feature = "std")), no_std)]

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod connection;
pub mod console;
pub mod control;
pub mod error;
pub mod filter;
pub mod host;
pub mod ring_buffer;
pub mod settings;
pub mod stats;
pub mod transmit;
pub mod transport;

pub use connection::{Connection, ConnectionState};
pub use console::CdcConsole;
pub use control::{
    ControlAction, ControlLineState, ControlMonitor, LineCoding, Parity, StopBits,
    BOOTLOADER_RESET_BAUD,
};
pub use error::{CdcError, Result, TransportError};
pub use filter::{IngestOutcome, InterruptFilter, DEFAULT_INTERRUPT_CHAR};
pub use host::HostHooks;
pub use ring_buffer::{RingBuffer, SharedRingBuffer};
pub use settings::{ConsoleSettings, DEFAULT_RX_CAPACITY};
pub use stats::ConsoleStats;
pub use transmit::{TransmitGate, WritePolicy, DEFAULT_MAX_WRITE_ATTEMPTS};
pub use transport::{CallbackKind, CdcTransport, TransferStatus, TransportEvent, MAX_PACKET_SIZE};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        CdcConsole, CdcError, CdcTransport, ConsoleSettings, ControlLineState, HostHooks,
        LineCoding, TransportError, TransportEvent,
    };
}
