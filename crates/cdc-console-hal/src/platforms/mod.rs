// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Platform implementations for the console
//!
//! Each module provides a [`CdcTransport`](cdc_console_core::CdcTransport)
//! or a set of [`HostHooks`](cdc_console_core::HostHooks).
//!
//! Available platforms:
//! - Loopback (host builds, `std`)
//! - usb-device / usbd-serial (`usbd`)
//! - ARM Cortex-M system reset (`cortex-m`)

#[cfg(feature = "std")]
pub mod loopback;

#[cfg(feature = "usbd")]
pub mod usbd;

#[cfg(feature = "cortex-m")]
pub mod cortex_m;

#[cfg(feature = "std")]
pub use loopback::{LoopbackTransport, RecordingHost};

#[cfg(feature = "usbd")]
pub use usbd::UsbdSerialTransport;

#[cfg(feature = "cortex-m")]
pub use self::cortex_m::CortexMHooks;
