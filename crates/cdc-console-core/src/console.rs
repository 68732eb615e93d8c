// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! The console driver
//!
//! [`CdcConsole`] owns the receive ring, the filter, the connection flag,
//! the control monitor and the transmit gate. Every method takes `&self` so
//! one instance (typically in a `static`) can be reached from the USB
//! interrupt and from the interpreter loop:
//!
//! | Context | Methods |
//! |---|---|
//! | foreground | `bytes_available`, `read`, `try_read`, `read_into`, `write`, `is_connected` |
//! | interrupt | `dispatch`, `on_receive_complete`, `on_transmit_complete`, `on_control_state_changed`, `on_line_coding_changed` |

use crate::connection::{Connection, ConnectionState};
use crate::control::{ControlAction, ControlLineState, ControlMonitor, LineCoding};
use crate::error::{CdcError, Result, TransportError};
use crate::filter::{IngestOutcome, InterruptFilter};
use crate::host::HostHooks;
use crate::ring_buffer::SharedRingBuffer;
use crate::settings::{ConsoleSettings, DEFAULT_RX_CAPACITY};
use crate::stats::{bump, ConsoleStats, StatsCounters};
use crate::transmit::{TransmitGate, WritePolicy};
use crate::transport::{CdcTransport, TransferStatus, TransportEvent, MAX_PACKET_SIZE};

/// Byte-stream bridge between a USB CDC transport and a cooperative loop
pub struct CdcConsole<T, H, const N: usize = DEFAULT_RX_CAPACITY> {
    transport: T,
    host: H,
    rx: SharedRingBuffer<N>,
    filter: InterruptFilter,
    connection: Connection,
    control: ControlMonitor,
    gate: TransmitGate,
    stats: StatsCounters,
    discard_read_len: usize,
}

impl<T, H, const N: usize> CdcConsole<T, H, N>
where
    T: CdcTransport,
    H: HostHooks,
{
    pub fn new(transport: T, host: H, settings: ConsoleSettings) -> Self {
        Self {
            transport,
            host,
            rx: SharedRingBuffer::new(),
            filter: InterruptFilter::new(settings.interrupt_char),
            connection: Connection::new(),
            control: ControlMonitor::new(settings.reset_baud_rate),
            gate: TransmitGate::new(settings.write_policy),
            stats: StatsCounters::new(),
            discard_read_len: settings.discard_read_len,
        }
    }

    pub fn with_defaults(transport: T, host: H) -> Self {
        Self::new(transport, host, ConsoleSettings::default())
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Receive buffer capacity
    pub fn capacity(&self) -> usize {
        N
    }

    // ── Foreground stream API ────────────────────────────────────────────

    /// Whether at least one received byte is waiting
    ///
    /// Also takes the lazy enable step, so polling this is enough to bring
    /// the connection up.
    pub fn bytes_available(&self) -> bool {
        let enabled = self.ensure_enabled();
        enabled && self.rx.occupancy() > 0
    }

    /// Number of received bytes waiting (0 while not enabled)
    pub fn available_count(&self) -> usize {
        if self.ensure_enabled() {
            self.rx.occupancy()
        } else {
            0
        }
    }

    /// Next received byte, or 0 when there is none
    ///
    /// A received NUL byte is indistinguishable from "nothing"; callers
    /// check [`bytes_available`](Self::bytes_available) first or use
    /// [`try_read`](Self::try_read).
    pub fn read(&self) -> u8 {
        self.try_read().unwrap_or(0)
    }

    /// Next received byte
    ///
    /// # Errors
    ///
    /// [`CdcError::NotEnabled`] before the interface is enumerated,
    /// [`CdcError::Empty`] when nothing is buffered.
    pub fn try_read(&self) -> Result<u8> {
        if !self.ensure_enabled() {
            return Err(CdcError::NotEnabled);
        }
        if self.rx.occupancy() == 0 {
            return Err(CdcError::Empty);
        }

        self.host.notify_console_activity();
        let byte = self.rx.dequeue()?;
        self.stats.update(|s| bump(&mut s.bytes_read, 1));
        Ok(byte)
    }

    /// Drain up to `out.len()` bytes, returning how many were copied
    pub fn read_into(&self, out: &mut [u8]) -> usize {
        if !self.ensure_enabled() || out.is_empty() || self.rx.occupancy() == 0 {
            return 0;
        }

        self.host.notify_console_activity();
        let taken = self.rx.dequeue_into(out);
        self.stats.update(|s| bump(&mut s.bytes_read, taken));
        taken
    }

    /// Send `data` to the host
    ///
    /// Before the interface is enabled the bytes are dropped and the call
    /// succeeds.
    ///
    /// # Errors
    ///
    /// Only when the transmit budget runs out; see [`TransmitGate::send`].
    pub fn write(&self, data: &[u8]) -> Result<()> {
        if !self.ensure_enabled() {
            log::trace!("Dropped {} bytes written before enable", data.len());
            return Ok(());
        }

        let sent = self.gate.send(&self.transport, &self.host, data)?;
        self.stats.update(|s| bump(&mut s.bytes_written, sent));
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.ensure_enabled()
    }

    /// Disabled → Enabled transition; see [`Connection::ensure_enabled`]
    pub fn ensure_enabled(&self) -> bool {
        self.connection
            .ensure_enabled(&self.transport, self.discard_read_len)
    }

    pub fn state(&self) -> ConnectionState {
        self.connection.state()
    }

    pub fn interrupt_char(&self) -> Option<u8> {
        self.filter.sentinel()
    }

    /// Change or disable (`None`) the interrupt character
    pub fn set_interrupt_char(&self, sentinel: Option<u8>) {
        self.filter.set_sentinel(sentinel);
    }

    pub fn reset_on_disconnect(&self) -> bool {
        self.control.reset_on_disconnect()
    }

    /// Last DTR value reported by the host
    pub fn dtr(&self) -> bool {
        self.control.dtr()
    }

    pub fn write_policy(&self) -> WritePolicy {
        self.gate.policy()
    }

    pub fn stats(&self) -> ConsoleStats {
        self.stats.snapshot()
    }

    // ── Transport (interrupt context) handlers ───────────────────────────

    /// Route one transport event to its handler
    pub fn dispatch(&self, event: TransportEvent) -> Result<()> {
        match event {
            TransportEvent::ReceiveComplete {
                endpoint,
                status,
                byte_count,
            } => self.on_receive_complete(endpoint, status, byte_count),
            TransportEvent::TransmitComplete {
                endpoint,
                status,
                byte_count,
            } => self.on_transmit_complete(endpoint, status, byte_count),
            TransportEvent::ControlStateChanged(state) => self.on_control_state_changed(state),
            TransportEvent::LineCodingChanged(coding) => {
                self.on_line_coding_changed(&coding);
                Ok(())
            }
        }
    }

    /// Filter `batch` into the receive ring
    ///
    /// Raises one cancellation when the batch contains the interrupt
    /// character; that case is a success.
    ///
    /// # Errors
    ///
    /// [`CdcError::Overflow`] when the batch does not fit; nothing is kept.
    pub fn ingest(&self, batch: &[u8]) -> Result<IngestOutcome> {
        match self.filter.ingest(&self.rx, batch) {
            Ok(outcome) => {
                self.record_ingest(&outcome);
                if outcome.is_interrupted() {
                    self.host.raise_cancellation();
                }
                Ok(outcome)
            }
            Err(err) => {
                self.record_overflow(batch.len());
                Err(err)
            }
        }
    }

    /// Bulk-out transfer of `byte_count` bytes finished
    ///
    /// Reads the transfer from the transport one packet at a time into an
    /// on-stack buffer of `N` bytes, then commits it in a single step: a
    /// failed read leaves the ring untouched. If the whole transfer does not
    /// fit, it is drained and dropped and `Overflow` is reported. After an
    /// interrupt character the rest of the transfer is drained unexamined.
    ///
    /// # Errors
    ///
    /// [`CdcError::Overflow`], or [`CdcError::TransportFailure`] when the
    /// transport read fails.
    pub fn on_receive_complete(
        &self,
        endpoint: u8,
        status: TransferStatus,
        byte_count: usize,
    ) -> Result<()> {
        if status != TransferStatus::Ok {
            log::debug!("Bulk-out on EP{} completed with {:?}", endpoint, status);
        }

        let available = self.rx.free();
        if byte_count > available {
            if let Err(err) = self.drain(byte_count) {
                log::warn!("Draining overflowed transfer failed: {}", err);
            }
            self.record_overflow(byte_count);
            return Err(CdcError::Overflow {
                requested: byte_count,
                available,
            });
        }

        // byte_count <= free space <= N
        let mut staging = [0u8; N];
        let mut filled = 0;
        while filled < byte_count {
            let want = (byte_count - filled).min(MAX_PACKET_SIZE);
            let packet = &mut staging[filled..filled + want];
            let got = match self.transport.read(packet) {
                Ok(got) => got.min(want),
                Err(TransportError::Busy) => 0,
                Err(TransportError::Failure { code }) => {
                    log::debug!("Bulk-out read failed after {} of {} bytes", filled, byte_count);
                    return Err(CdcError::TransportFailure { code });
                }
            };
            if got == 0 {
                log::debug!("Transport delivered {} bytes short", byte_count - filled);
                break;
            }
            let sentinel_seen = self.filter.find(&staging[filled..filled + got]).is_some();
            filled += got;
            if sentinel_seen {
                break;
            }
        }

        if filled == 0 {
            return Ok(());
        }
        let outcome = self.ingest(&staging[..filled])?;
        let remaining = byte_count - filled;
        if outcome.is_interrupted() && remaining > 0 {
            self.stats.update(|s| bump(&mut s.dropped_bytes, remaining));
            if let Err(err) = self.drain(remaining) {
                log::warn!("Draining interrupted transfer failed: {}", err);
            }
        }
        Ok(())
    }

    /// Bulk-in transfer finished; nothing to do
    pub fn on_transmit_complete(
        &self,
        _endpoint: u8,
        _status: TransferStatus,
        _byte_count: usize,
    ) -> Result<()> {
        Ok(())
    }

    /// Host changed DTR/RTS; may request a bootloader reset
    pub fn on_control_state_changed(&self, state: ControlLineState) -> Result<()> {
        if let ControlAction::RequestBootloaderReset = self.control.on_control_state_changed(state) {
            log::warn!("DTR dropped after 1200-baud open, requesting bootloader reset");
            self.stats.update(|s| s.resets_requested = s.resets_requested.saturating_add(1));
            self.host.request_bootloader_reset();
        }
        Ok(())
    }

    /// Host requested new line coding; always accepted
    pub fn on_line_coding_changed(&self, coding: &LineCoding) -> bool {
        log::debug!("Line coding changed to {} baud", coding.baud_rate);
        self.control.on_line_coding_changed(coding)
    }

    // ── internals ────────────────────────────────────────────────────────

    fn drain(&self, mut count: usize) -> Result<()> {
        let mut scratch = [0u8; MAX_PACKET_SIZE];
        while count > 0 {
            let want = count.min(MAX_PACKET_SIZE);
            match self.transport.read(&mut scratch[..want]) {
                Ok(0) | Err(TransportError::Busy) => break,
                Ok(got) => count -= got.min(want),
                Err(TransportError::Failure { code }) => {
                    return Err(CdcError::TransportFailure { code })
                }
            }
        }
        Ok(())
    }

    fn record_ingest(&self, outcome: &IngestOutcome) {
        self.stats.update(|s| match *outcome {
            IngestOutcome::Stored { stored } => bump(&mut s.bytes_received, stored),
            IngestOutcome::Interrupted { stored, discarded } => {
                bump(&mut s.bytes_received, stored);
                // the interrupt character itself is not counted as dropped
                bump(&mut s.dropped_bytes, discarded.saturating_sub(1));
                s.interrupts_raised = s.interrupts_raised.saturating_add(1);
            }
        });
    }

    fn record_overflow(&self, len: usize) {
        log::debug!("Receive overflow, dropped {} bytes", len);
        self.stats.update(|s| {
            s.overflowed_batches = s.overflowed_batches.saturating_add(1);
            bump(&mut s.dropped_bytes, len);
        });
    }
}
