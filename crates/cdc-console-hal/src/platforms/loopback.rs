// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! In-memory host ⇄ device pipe
//!
//! [`LoopbackTransport`] plays both ends of a CDC-ACM link. The device side
//! is its [`CdcTransport`] implementation; the `host_*` methods act as the
//! PC. Each host action returns the [`TransportEvent`] a real stack would
//! raise, or `None` when the console has not armed that callback yet, so a
//! driver loop can hand it straight to `CdcConsole::dispatch`.
//!
//! Transmit-side busy and failure outcomes can be injected to exercise the
//! transmit gate.

use core::cell::RefCell;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};

use cdc_console_core::{
    CallbackKind, CdcTransport, ControlLineState, HostHooks, LineCoding, TransferStatus,
    TransportError, TransportEvent,
};
use critical_section::Mutex;

/// Bulk-out endpoint reported in receive events
pub const OUT_ENDPOINT: u8 = 0x01;

/// Bulk-in endpoint reported in transmit events
pub const IN_ENDPOINT: u8 = 0x81;

#[derive(Default)]
struct LoopbackState {
    enabled: bool,
    armed: u8,
    to_device: VecDeque<u8>,
    to_host: Vec<u8>,
    write_script: VecDeque<Result<usize, TransportError>>,
    tx_chunk: Option<usize>,
    line_coding: LineCoding,
    control: ControlLineState,
}

impl LoopbackState {
    fn armed(&self, kind: CallbackKind) -> bool {
        self.armed & kind.mask() != 0
    }

    fn event(&self, event: TransportEvent) -> Option<TransportEvent> {
        self.armed(event.kind()).then_some(event)
    }
}

/// In-memory CDC transport
pub struct LoopbackTransport {
    state: Mutex<RefCell<LoopbackState>>,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(LoopbackState::default())),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut LoopbackState) -> R) -> R {
        critical_section::with(|cs| f(&mut self.state.borrow_ref_mut(cs)))
    }

    // ── host side ────────────────────────────────────────────────────────

    /// Host finished enumerating the CDC interface
    pub fn enumerate(&self) {
        log::debug!("Loopback enumerated");
        self.with(|s| s.enabled = true);
    }

    /// Cable pulled: the interface reports disabled
    pub fn detach(&self) {
        self.with(|s| s.enabled = false);
    }

    /// Host sends `bytes` in one bulk-out transfer
    pub fn host_write(&self, bytes: &[u8]) -> Option<TransportEvent> {
        self.with(|s| {
            s.to_device.extend(bytes.iter().copied());
            s.event(TransportEvent::ReceiveComplete {
                endpoint: OUT_ENDPOINT,
                status: TransferStatus::Ok,
                byte_count: bytes.len(),
            })
        })
    }

    /// Host issues SET_LINE_CODING
    pub fn host_set_line_coding(&self, coding: LineCoding) -> Option<TransportEvent> {
        self.with(|s| {
            s.line_coding = coding;
            s.event(TransportEvent::LineCodingChanged(coding))
        })
    }

    /// Host issues SET_CONTROL_LINE_STATE
    pub fn host_set_control_lines(&self, state: ControlLineState) -> Option<TransportEvent> {
        self.with(|s| {
            s.control = state;
            s.event(TransportEvent::ControlStateChanged(state))
        })
    }

    /// Drain everything the device has transmitted
    ///
    /// Also returns the transmit-complete event for the drained bytes when
    /// that callback is armed.
    pub fn host_read(&self) -> (Vec<u8>, Option<TransportEvent>) {
        self.with(|s| {
            let out = core::mem::take(&mut s.to_host);
            let event = if out.is_empty() {
                None
            } else {
                s.event(TransportEvent::TransmitComplete {
                    endpoint: IN_ENDPOINT,
                    status: TransferStatus::Ok,
                    byte_count: out.len(),
                })
            };
            (out, event)
        })
    }

    /// Outcomes for the next device writes; afterwards writes succeed
    pub fn inject_write_outcomes(&self, outcomes: &[Result<usize, TransportError>]) {
        self.with(|s| s.write_script.extend(outcomes.iter().copied()));
    }

    /// Accept at most `chunk` bytes per device write (`None` = unlimited)
    pub fn set_tx_chunk(&self, chunk: Option<usize>) {
        self.with(|s| s.tx_chunk = chunk);
    }

    /// Bytes sent by the host and not yet read by the device
    pub fn pending_to_device(&self) -> usize {
        self.with(|s| s.to_device.len())
    }

    pub fn is_armed(&self, kind: CallbackKind) -> bool {
        self.with(|s| s.armed(kind))
    }

    pub fn line_coding(&self) -> LineCoding {
        self.with(|s| s.line_coding)
    }

    pub fn control_lines(&self) -> ControlLineState {
        self.with(|s| s.control)
    }
}

impl Default for LoopbackTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl CdcTransport for LoopbackTransport {
    fn is_enabled(&self) -> bool {
        self.with(|s| s.enabled)
    }

    fn register_callback(&self, kind: CallbackKind) {
        log::trace!("Loopback armed {:?}", kind);
        self.with(|s| s.armed |= kind.mask());
    }

    fn read(&self, buf: &mut [u8]) -> Result<usize, TransportError> {
        self.with(|s| {
            let n = buf.len().min(s.to_device.len());
            for (slot, byte) in buf.iter_mut().zip(s.to_device.drain(..n)) {
                *slot = byte;
            }
            Ok(n)
        })
    }

    fn write(&self, data: &[u8]) -> Result<usize, TransportError> {
        self.with(|s| {
            let limit = match s.write_script.pop_front() {
                Some(Ok(n)) => n,
                Some(Err(err)) => return Err(err),
                None => s.tx_chunk.unwrap_or(data.len()),
            };
            let accepted = limit.min(data.len());
            s.to_host.extend_from_slice(&data[..accepted]);
            Ok(accepted)
        })
    }
}

/// Host hooks for simulations: counts every request
///
/// `scheduler_yield` gives up the OS time slice, standing in for the
/// interpreter's background tasks.
#[derive(Debug, Default)]
pub struct RecordingHost {
    resets: AtomicU32,
    activity: AtomicU32,
    cancellations: AtomicU32,
    yields: AtomicU32,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resets(&self) -> u32 {
        self.resets.load(Ordering::Relaxed)
    }

    pub fn activity(&self) -> u32 {
        self.activity.load(Ordering::Relaxed)
    }

    pub fn cancellations(&self) -> u32 {
        self.cancellations.load(Ordering::Relaxed)
    }

    pub fn yields(&self) -> u32 {
        self.yields.load(Ordering::Relaxed)
    }
}

impl HostHooks for RecordingHost {
    fn request_bootloader_reset(&self) {
        log::info!("Bootloader reset requested");
        self.resets.fetch_add(1, Ordering::Relaxed);
    }

    fn notify_console_activity(&self) {
        self.activity.fetch_add(1, Ordering::Relaxed);
    }

    fn raise_cancellation(&self) {
        log::info!("KeyboardInterrupt raised");
        self.cancellations.fetch_add(1, Ordering::Relaxed);
    }

    fn scheduler_yield(&self) {
        self.yields.fetch_add(1, Ordering::Relaxed);
        std::thread::yield_now();
    }
}
