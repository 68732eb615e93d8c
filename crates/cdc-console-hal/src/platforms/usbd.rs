// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! `usb-device` + `usbd-serial` transport
//!
//! Supports any microcontroller with a `usb_device::bus::UsbBus`
//! implementation (RP2040, STM32, nRF52, SAMD...).
//!
//! `usb-device` is polled rather than callback driven, so the USB interrupt
//! handler calls [`UsbdSerialTransport::poll`] and dispatches what it
//! returns:
//!
//! ```rust,ignore
//! #[interrupt]
//! fn USBCTRL_IRQ() {
//!     for event in CONSOLE.transport().poll() {
//!         let _ = CONSOLE.dispatch(event);
//!     }
//! }
//! ```
//!
//! `poll` stages at most one packet of received bytes per call and reports
//! line coding and DTR/RTS changes by comparing against the last values
//! seen. `usbd-serial` does not expose bulk-in completions, so no
//! `TransmitComplete` events are produced.

use core::cell::RefCell;

use cdc_console_core::{
    CallbackKind, CdcTransport, ControlLineState, LineCoding, Parity, StopBits, TransferStatus,
    TransportError, TransportEvent, MAX_PACKET_SIZE,
};
use critical_section::Mutex;
use usb_device::bus::UsbBus;
use usb_device::device::{UsbDevice, UsbDeviceState};
use usb_device::UsbError;
use usbd_serial::SerialPort;

/// Bulk-out endpoint address reported in receive events
const OUT_ENDPOINT: u8 = 0x01;

/// Events produced by one `poll` call
pub type PollEvents = heapless::Vec<TransportEvent, 4>;

struct UsbdInner<'a, B: UsbBus> {
    device: UsbDevice<'a, B>,
    serial: SerialPort<'a, B>,
    armed: u8,
    staged: heapless::Vec<u8, MAX_PACKET_SIZE>,
    control: ControlLineState,
    line_coding: Option<LineCoding>,
}

impl<B: UsbBus> UsbdInner<'_, B> {
    fn armed(&self, kind: CallbackKind) -> bool {
        self.armed & kind.mask() != 0
    }
}

/// CDC transport over a `usbd-serial` port
pub struct UsbdSerialTransport<'a, B: UsbBus> {
    inner: Mutex<RefCell<UsbdInner<'a, B>>>,
}

impl<'a, B: UsbBus> UsbdSerialTransport<'a, B> {
    /// Wrap an already built device and its serial class
    pub fn new(device: UsbDevice<'a, B>, serial: SerialPort<'a, B>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(UsbdInner {
                device,
                serial,
                armed: 0,
                staged: heapless::Vec::new(),
                control: ControlLineState::default(),
                line_coding: None,
            })),
        }
    }

    /// Service the USB peripheral; call from the USB interrupt
    ///
    /// Returns the events for every armed callback whose condition occurred.
    pub fn poll(&self) -> PollEvents {
        critical_section::with(|cs| {
            let mut guard = self.inner.borrow_ref_mut(cs);
            let inner = &mut *guard;
            let mut events = PollEvents::new();

            if !inner.device.poll(&mut [&mut inner.serial]) {
                return events;
            }

            let coding = convert_line_coding(inner.serial.line_coding());
            if inner.line_coding != Some(coding) {
                inner.line_coding = Some(coding);
                if inner.armed(CallbackKind::LineCodingChanged) {
                    let _ = events.push(TransportEvent::LineCodingChanged(coding));
                }
            }

            let control = ControlLineState::new(inner.serial.dtr(), inner.serial.rts());
            if control != inner.control {
                inner.control = control;
                if inner.armed(CallbackKind::ControlStateChanged) {
                    let _ = events.push(TransportEvent::ControlStateChanged(control));
                }
            }

            // unarmed data stays in the class buffer for the enable-time discard
            if inner.staged.is_empty() && inner.armed(CallbackKind::ReceiveComplete) {
                let mut packet = [0u8; MAX_PACKET_SIZE];
                match inner.serial.read(&mut packet) {
                    Ok(0) | Err(UsbError::WouldBlock) => {}
                    Ok(n) => {
                        let _ = inner.staged.extend_from_slice(&packet[..n]);
                        let _ = events.push(TransportEvent::ReceiveComplete {
                            endpoint: OUT_ENDPOINT,
                            status: TransferStatus::Ok,
                            byte_count: n,
                        });
                    }
                    Err(err) => log::debug!("Serial read failed during poll: {:?}", err),
                }
            }

            events
        })
    }

    /// Current device state as reported by `usb-device`
    pub fn device_state(&self) -> UsbDeviceState {
        critical_section::with(|cs| self.inner.borrow_ref(cs).device.state())
    }
}

impl<B: UsbBus> CdcTransport for UsbdSerialTransport<'_, B> {
    fn is_enabled(&self) -> bool {
        self.device_state() == UsbDeviceState::Configured
    }

    fn register_callback(&self, kind: CallbackKind) {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).armed |= kind.mask());
    }

    fn read(&self, buf: &mut [u8]) -> Result<usize, TransportError> {
        critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            if inner.staged.is_empty() {
                return match inner.serial.read(buf) {
                    Ok(n) => Ok(n),
                    Err(UsbError::WouldBlock) => Ok(0),
                    Err(err) => Err(transport_error(err)),
                };
            }

            let n = buf.len().min(inner.staged.len());
            buf[..n].copy_from_slice(&inner.staged[..n]);
            let rest = inner.staged.len() - n;
            inner.staged.copy_within(n.., 0);
            inner.staged.truncate(rest);
            Ok(n)
        })
    }

    fn write(&self, data: &[u8]) -> Result<usize, TransportError> {
        critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            match inner.serial.write(data) {
                Ok(n) => Ok(n),
                Err(err) => Err(transport_error(err)),
            }
        })
    }
}

fn transport_error(err: UsbError) -> TransportError {
    let code = match err {
        UsbError::WouldBlock => return TransportError::Busy,
        UsbError::BufferOverflow => -2,
        UsbError::InvalidState => -3,
        UsbError::Unsupported => -4,
        _ => -1,
    };
    TransportError::Failure { code }
}

fn convert_line_coding(coding: &usbd_serial::LineCoding) -> LineCoding {
    LineCoding {
        baud_rate: coding.data_rate(),
        stop_bits: match coding.stop_bits() {
            usbd_serial::StopBits::One => StopBits::One,
            usbd_serial::StopBits::OnePointFive => StopBits::OnePointFive,
            usbd_serial::StopBits::Two => StopBits::Two,
        },
        parity: match coding.parity_type() {
            usbd_serial::ParityType::None => Parity::None,
            usbd_serial::ParityType::Odd => Parity::Odd,
            usbd_serial::ParityType::Mark => Parity::Mark,
            usbd_serial::ParityType::Space => Parity::Space,
            _ => Parity::Even,
        },
        data_bits: coding.data_bits(),
    }
}
