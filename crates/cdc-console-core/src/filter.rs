// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Interrupt character filter
//!
//! Sits between a completed bulk-out transfer and the receive buffer. The
//! configured interrupt character (Ctrl-C by default) is never stored: it
//! ends the batch, and the caller turns it into a cancellation signal.

use core::sync::atomic::{AtomicU16, Ordering};

use crate::error::{CdcError, Result};
use crate::ring_buffer::SharedRingBuffer;

/// Ctrl-C
pub const DEFAULT_INTERRUPT_CHAR: u8 = 0x03;

// Out of byte range: filtering disabled
const NO_SENTINEL: u16 = 0x100;

/// What [`InterruptFilter::ingest`] did with a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Whole batch stored
    Stored {
        stored: usize,
    },
    /// Interrupt character found; bytes before it stored, it and the rest dropped
    Interrupted {
        stored: usize,
        discarded: usize,
    },
}

impl IngestOutcome {
    pub fn stored(&self) -> usize {
        match *self {
            IngestOutcome::Stored { stored } => stored,
            IngestOutcome::Interrupted { stored, .. } => stored,
        }
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self, IngestOutcome::Interrupted { .. })
    }
}

/// Scans received batches for the interrupt character
///
/// The character can be changed or disabled at runtime from the foreground
/// while the receive interrupt reads it; a single 16-bit atomic keeps both
/// sides consistent without a critical section.
pub struct InterruptFilter {
    sentinel: AtomicU16,
}

impl InterruptFilter {
    pub const fn new(sentinel: Option<u8>) -> Self {
        Self {
            sentinel: AtomicU16::new(encode(sentinel)),
        }
    }

    /// Current interrupt character, `None` when filtering is off
    pub fn sentinel(&self) -> Option<u8> {
        let raw = self.sentinel.load(Ordering::Relaxed);
        u8::try_from(raw).ok()
    }

    pub fn set_sentinel(&self, sentinel: Option<u8>) {
        self.sentinel.store(encode(sentinel), Ordering::Relaxed);
    }

    /// Position of the first interrupt character in `batch`
    pub fn find(&self, batch: &[u8]) -> Option<usize> {
        let sentinel = self.sentinel()?;
        batch.iter().position(|&b| b == sentinel)
    }

    /// Store `batch` in `ring`, stopping at the interrupt character
    ///
    /// Capacity is checked against the whole batch before anything is
    /// committed, and the check plus the copy run in one critical section.
    /// Raising the cancellation is left to the caller so that it happens
    /// after interrupts are re-enabled.
    ///
    /// # Errors
    ///
    /// [`CdcError::Overflow`] if `batch` is larger than the free space; the
    /// ring is unchanged.
    pub fn ingest<const N: usize>(
        &self,
        ring: &SharedRingBuffer<N>,
        batch: &[u8],
    ) -> Result<IngestOutcome> {
        let cut = self.find(batch);
        ring.with(|ring| {
            let available = ring.free();
            if batch.len() > available {
                return Err(CdcError::Overflow {
                    requested: batch.len(),
                    available,
                });
            }

            match cut {
                Some(index) => {
                    ring.try_enqueue_batch(&batch[..index])?;
                    Ok(IngestOutcome::Interrupted {
                        stored: index,
                        discarded: batch.len() - index,
                    })
                }
                None => {
                    ring.try_enqueue_batch(batch)?;
                    Ok(IngestOutcome::Stored {
                        stored: batch.len(),
                    })
                }
            }
        })
    }
}

impl Default for InterruptFilter {
    fn default() -> Self {
        Self::new(Some(DEFAULT_INTERRUPT_CHAR))
    }
}

const fn encode(sentinel: Option<u8>) -> u16 {
    match sentinel {
        Some(byte) => byte as u16,
        None => NO_SENTINEL,
    }
}
