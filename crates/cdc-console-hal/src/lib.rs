// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(any(test, feature = "std")), no_std)]

//! # CDC Console HAL
//!
//! Platform abstraction and implementations around the CDC console core.
//!
//! This crate provides:
//! - **HAL traits** (`hal` module) - `UsbCdcProvider`, the UART-like view of
//!   the console that application code writes against
//! - **Platform implementations** (`platforms` module) - concrete transports
//!   and host hooks
//!
//! ## Feature Flags
//!
//! - `std` - in-memory `LoopbackTransport` and `RecordingHost` for host tools
//!   and tests
//! - `usbd` - `UsbdSerialTransport` over `usb-device` + `usbd-serial`
//! - `cortex-m` - `CortexMHooks`, resetting through the system control block

/// Hardware abstraction traits.
pub mod hal;

/// Concrete transports and host hooks.
pub mod platforms;

pub use hal::{read_line, writeln, UsbCdcProvider, UsbConnectionStatus};

#[cfg(feature = "std")]
pub use platforms::{LoopbackTransport, RecordingHost};

#[cfg(feature = "usbd")]
pub use platforms::UsbdSerialTransport;

#[cfg(feature = "cortex-m")]
pub use platforms::CortexMHooks;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::hal::{UsbCdcProvider, UsbConnectionStatus};
    pub use cdc_console_core::prelude::*;
}
