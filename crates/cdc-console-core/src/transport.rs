// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Transport capability interface
//!
//! The console depends on the USB stack only through [`CdcTransport`]. A
//! vendor stack becomes one implementation of the trait; tests use an
//! in-memory fake.
//!
//! ```text
//! ┌──────────────────────────────┐   register_callback / read / write
//! │ CdcConsole (foreground + ISR)│ ─────────────────────────────────┐
//! └──────────────▲───────────────┘                                  │
//!                │ dispatch(TransportEvent)                         │
//! ┌──────────────┴───────────────────────────────────────────────────▼┐
//! │ CdcTransport implementation (usbd-serial, loopback, vendor SDK...) │
//! └────────────────────────────────────────────────────────────────────┘
//! ```

use crate::control::{ControlLineState, LineCoding};
use crate::error::TransportError;

/// Largest full-speed bulk packet; sizes the on-stack staging buffers
pub const MAX_PACKET_SIZE: usize = 64;

/// Callbacks the console arms on the transport when it becomes enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackKind {
    /// Bulk-out (host → device) transfer finished
    ReceiveComplete,
    /// Bulk-in (device → host) transfer finished
    TransmitComplete,
    /// Host changed DTR/RTS
    ControlStateChanged,
    /// Host requested a new baud rate / framing
    LineCodingChanged,
}

impl CallbackKind {
    /// Every kind, in registration order
    pub const ALL: [CallbackKind; 4] = [
        CallbackKind::ReceiveComplete,
        CallbackKind::TransmitComplete,
        CallbackKind::ControlStateChanged,
        CallbackKind::LineCodingChanged,
    ];

    /// Bit used by transports that keep armed kinds in a mask
    pub const fn mask(self) -> u8 {
        match self {
            CallbackKind::ReceiveComplete => 0b0001,
            CallbackKind::TransmitComplete => 0b0010,
            CallbackKind::ControlStateChanged => 0b0100,
            CallbackKind::LineCodingChanged => 0b1000,
        }
    }
}

/// Completion code passed with a bulk transfer callback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStatus {
    Ok,
    Stalled,
    Aborted,
    Reset,
    Error,
}

/// One callback invocation, as delivered by a transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent {
    ReceiveComplete {
        endpoint: u8,
        status: TransferStatus,
        byte_count: usize,
    },
    TransmitComplete {
        endpoint: u8,
        status: TransferStatus,
        byte_count: usize,
    },
    ControlStateChanged(ControlLineState),
    LineCodingChanged(LineCoding),
}

impl TransportEvent {
    /// Callback kind that must be armed for this event to be delivered
    pub fn kind(&self) -> CallbackKind {
        match self {
            TransportEvent::ReceiveComplete { .. } => CallbackKind::ReceiveComplete,
            TransportEvent::TransmitComplete { .. } => CallbackKind::TransmitComplete,
            TransportEvent::ControlStateChanged(_) => CallbackKind::ControlStateChanged,
            TransportEvent::LineCodingChanged(_) => CallbackKind::LineCodingChanged,
        }
    }
}

/// USB CDC transport as seen by the console
///
/// Methods take `&self`: the transport is used from the receive interrupt
/// and from the foreground loop, so implementations provide their own
/// interrupt-safe interior mutability.
pub trait CdcTransport {
    /// Whether the CDC interface has been enumerated by the host
    fn is_enabled(&self) -> bool;

    /// Start delivering events of `kind`
    ///
    /// Called once per kind, during the Disabled → Enabled transition.
    fn register_callback(&self, kind: CallbackKind);

    /// Copy received payload bytes into `buf`
    ///
    /// Returns the number of bytes written into `buf`. Implementations hand
    /// back the actual payload of the completed transfer.
    fn read(&self, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// Queue `data` for transmission to the host
    ///
    /// Returns how many leading bytes were accepted. `Ok(0)` and
    /// `Err(TransportError::Busy)` both mean "not ready, try again".
    fn write(&self, data: &[u8]) -> Result<usize, TransportError>;
}

impl<T: CdcTransport + ?Sized> CdcTransport for &T {
    fn is_enabled(&self) -> bool {
        (**self).is_enabled()
    }

    fn register_callback(&self, kind: CallbackKind) {
        (**self).register_callback(kind)
    }

    fn read(&self, buf: &mut [u8]) -> Result<usize, TransportError> {
        (**self).read(buf)
    }

    fn write(&self, data: &[u8]) -> Result<usize, TransportError> {
        (**self).write(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masks_are_distinct() {
        let mut seen = 0u8;
        for kind in CallbackKind::ALL {
            assert_eq!(seen & kind.mask(), 0);
            seen |= kind.mask();
        }
        assert_eq!(seen, 0b1111);
    }

    #[test]
    fn test_event_kind() {
        let event = TransportEvent::ReceiveComplete {
            endpoint: 1,
            status: TransferStatus::Ok,
            byte_count: 3,
        };
        assert_eq!(event.kind(), CallbackKind::ReceiveComplete);
        let event = TransportEvent::ControlStateChanged(ControlLineState::new(true, false));
        assert_eq!(event.kind(), CallbackKind::ControlStateChanged);
    }
}
