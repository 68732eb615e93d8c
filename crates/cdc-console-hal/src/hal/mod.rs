// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/// USB CDC serial communication trait, implemented by the console.
pub mod usb_cdc;

pub use usb_cdc::{read_line, writeln, UsbCdcProvider, UsbConnectionStatus};
