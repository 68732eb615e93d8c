// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Scripted host sessions over the loopback transport
//!
//! [`Simulator`] owns a console wired to a [`LoopbackTransport`] and a
//! [`RecordingHost`]. Host-side actions (plugging in, opening the port,
//! typing) deliver their transport events the way the USB interrupt would;
//! [`Simulator::run_foreground`] plays the interpreter loop, echoing every
//! byte it reads.

use std::fmt;

use anyhow::Context;
use cdc_console_config::CdcConsoleConfig;
use cdc_console_core::{
    CdcConsole, CdcError, ConnectionState, ConsoleSettings, ConsoleStats, ControlLineState,
    LineCoding, TransportEvent, DEFAULT_RX_CAPACITY,
};
use cdc_console_hal::{LoopbackTransport, RecordingHost};

type SimConsole<const N: usize> = CdcConsole<LoopbackTransport, RecordingHost, N>;

/// Console plus a fake host PC
pub struct Simulator<const N: usize = DEFAULT_RX_CAPACITY> {
    console: SimConsole<N>,
    echoed: Vec<u8>,
}

impl<const N: usize> Simulator<N> {
    pub fn new(settings: ConsoleSettings) -> Self {
        Self {
            console: CdcConsole::new(LoopbackTransport::new(), RecordingHost::new(), settings),
            echoed: Vec::new(),
        }
    }

    /// Build from a loaded configuration
    ///
    /// # Errors
    ///
    /// Fails when the configured `rx_buffer_size` differs from `N`.
    pub fn from_config(config: &CdcConsoleConfig) -> anyhow::Result<Self> {
        config
            .check_rx_capacity(N)
            .context("Simulator receive buffer does not match configuration")?;
        Ok(Self::new(config.console_settings()))
    }

    pub fn console(&self) -> &SimConsole<N> {
        &self.console
    }

    pub fn transport(&self) -> &LoopbackTransport {
        self.console.transport()
    }

    pub fn host(&self) -> &RecordingHost {
        self.console.host()
    }

    /// Cable inserted and enumerated; the foreground notices on its next poll
    pub fn plug_in(&self) -> bool {
        self.transport().enumerate();
        self.console.is_connected()
    }

    /// Terminal opens the port at `baud` and raises DTR/RTS
    pub fn open_port(&self, baud: u32) -> Result<(), CdcError> {
        tracing::debug!(baud, "Host opens port");
        self.deliver(self.transport().host_set_line_coding(LineCoding::new(baud)))?;
        self.deliver(
            self.transport()
                .host_set_control_lines(ControlLineState::new(true, true)),
        )
    }

    /// Terminal closes the port, dropping DTR/RTS
    pub fn close_port(&self) -> Result<(), CdcError> {
        tracing::debug!("Host closes port");
        self.deliver(
            self.transport()
                .host_set_control_lines(ControlLineState::new(false, false)),
        )
    }

    /// Host sends `text` as one bulk transfer
    pub fn type_text(&self, text: &[u8]) -> Result<(), CdcError> {
        self.deliver(self.transport().host_write(text))
    }

    /// One pass of the interpreter loop: read everything and echo it
    ///
    /// Returns the number of bytes read.
    pub fn run_foreground(&mut self) -> Result<usize, CdcError> {
        let mut line = [0u8; 64];
        let mut total = 0;
        loop {
            let n = self.console.read_into(&mut line);
            if n == 0 {
                break;
            }
            self.console.write(&line[..n])?;
            self.echoed.extend_from_slice(&line[..n]);
            total += n;
        }
        Ok(total)
    }

    /// Drain what the device transmitted to the host
    pub fn host_output(&self) -> Vec<u8> {
        let (output, event) = self.transport().host_read();
        if let Err(err) = self.deliver(event) {
            tracing::warn!(%err, "Transmit-complete handler failed");
        }
        output
    }

    /// Every byte the foreground has read so far
    pub fn echoed(&self) -> &[u8] {
        &self.echoed
    }

    pub fn report(&self) -> SimReport {
        let host = self.host();
        SimReport {
            state: self.console.state(),
            stats: self.console.stats(),
            cancellations: host.cancellations(),
            resets: host.resets(),
            activity: host.activity(),
            yields: host.yields(),
        }
    }

    fn deliver(&self, event: Option<TransportEvent>) -> Result<(), CdcError> {
        match event {
            Some(event) => self.console.dispatch(event),
            None => {
                tracing::trace!("Event dropped: callback not armed");
                Ok(())
            }
        }
    }
}

/// Summary of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimReport {
    pub state: ConnectionState,
    pub stats: ConsoleStats,
    pub cancellations: u32,
    pub resets: u32,
    pub activity: u32,
    pub yields: u32,
}

impl fmt::Display for SimReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Connection:          {:?}", self.state)?;
        writeln!(f, "Bytes received:      {}", self.stats.bytes_received)?;
        writeln!(f, "Bytes read:          {}", self.stats.bytes_read)?;
        writeln!(f, "Bytes written:       {}", self.stats.bytes_written)?;
        writeln!(f, "Overflowed batches:  {}", self.stats.overflowed_batches)?;
        writeln!(f, "Dropped bytes:       {}", self.stats.dropped_bytes)?;
        writeln!(f, "Keyboard interrupts: {}", self.cancellations)?;
        writeln!(f, "Scheduler yields:    {}", self.yields)?;
        write!(f, "Bootloader resets:   {}", self.resets)
    }
}
