// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Console traffic counters
//!
//! Counters live in a critical-section cell rather than atomics: Cortex-M0+
//! has no atomic read-modify-write, and the counters are bumped from both
//! the receive interrupt and the foreground loop.

use core::cell::Cell;

use critical_section::Mutex;

/// Snapshot of console counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsoleStats {
    /// Bytes committed to the receive buffer
    pub bytes_received: u32,
    /// Bytes handed to the foreground reader
    pub bytes_read: u32,
    /// Bytes accepted by the transport
    pub bytes_written: u32,
    /// Receive batches rejected for lack of space
    pub overflowed_batches: u32,
    /// Received bytes never stored (overflow or after an interrupt character)
    pub dropped_bytes: u32,
    /// Cancellation signals raised
    pub interrupts_raised: u32,
    /// Bootloader resets requested
    pub resets_requested: u32,
}

pub(crate) struct StatsCounters {
    inner: Mutex<Cell<ConsoleStats>>,
}

impl StatsCounters {
    pub(crate) const fn new() -> Self {
        Self {
            inner: Mutex::new(Cell::new(ConsoleStats {
                bytes_received: 0,
                bytes_read: 0,
                bytes_written: 0,
                overflowed_batches: 0,
                dropped_bytes: 0,
                interrupts_raised: 0,
                resets_requested: 0,
            })),
        }
    }

    pub(crate) fn update(&self, f: impl FnOnce(&mut ConsoleStats)) {
        critical_section::with(|cs| {
            let cell = self.inner.borrow(cs);
            let mut stats = cell.get();
            f(&mut stats);
            cell.set(stats);
        });
    }

    pub(crate) fn snapshot(&self) -> ConsoleStats {
        critical_section::with(|cs| self.inner.borrow(cs).get())
    }
}

/// Saturating `usize` → counter increment
pub(crate) fn bump(counter: &mut u32, by: usize) {
    let by = u32::try_from(by).unwrap_or(u32::MAX);
    *counter = counter.saturating_add(by);
}
