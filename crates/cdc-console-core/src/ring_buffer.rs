// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Fixed-capacity receive ring buffer
//!
//! [`RingBuffer`] is the plain circular queue. [`SharedRingBuffer`] wraps it
//! in a `critical_section::Mutex` so that the USB receive interrupt (producer)
//! and the foreground loop (consumer) can both hold `&` references. Every
//! mutation of the occupancy count happens with interrupts suppressed, never
//! under a blocking lock, because the producer cannot block.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::error::{CdcError, Result};

/// Circular byte queue with capacity `N`
///
/// All indices are zero at construction. `head` is only advanced by
/// [`dequeue_one`](Self::dequeue_one), `tail` only by
/// [`try_enqueue_batch`](Self::try_enqueue_batch).
#[derive(Debug)]
pub struct RingBuffer<const N: usize> {
    data: [u8; N],
    head: usize,
    tail: usize,
    count: usize,
}

impl<const N: usize> RingBuffer<N> {
    const NONZERO_CAPACITY: () = assert!(N > 0, "ring buffer capacity must be non-zero");

    /// Create an empty buffer
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::NONZERO_CAPACITY;
        Self {
            data: [0; N],
            head: 0,
            tail: 0,
            count: 0,
        }
    }

    /// Total capacity in bytes
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Bytes currently held
    pub fn occupancy(&self) -> usize {
        self.count
    }

    /// Bytes that can be enqueued right now
    pub fn free(&self) -> usize {
        N - self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Index of the next byte to dequeue
    pub fn head(&self) -> usize {
        self.head
    }

    /// Index of the next slot to fill
    pub fn tail(&self) -> usize {
        self.tail
    }

    /// Append `bytes` in order, all or nothing
    ///
    /// # Errors
    ///
    /// Returns [`CdcError::Overflow`] when `bytes` does not fit. The buffer
    /// is left untouched in that case and none of the offered bytes are kept.
    pub fn try_enqueue_batch(&mut self, bytes: &[u8]) -> Result<()> {
        let available = self.free();
        if bytes.len() > available {
            return Err(CdcError::Overflow {
                requested: bytes.len(),
                available,
            });
        }

        for &byte in bytes {
            self.data[self.tail] = byte;
            self.tail = Self::advance(self.tail);
            self.count += 1;
        }
        Ok(())
    }

    /// Remove and return the oldest byte
    ///
    /// # Errors
    ///
    /// Returns [`CdcError::Empty`] when nothing is buffered.
    pub fn dequeue_one(&mut self) -> Result<u8> {
        if self.count == 0 {
            return Err(CdcError::Empty);
        }

        let byte = self.data[self.head];
        self.head = Self::advance(self.head);
        self.count -= 1;
        Ok(byte)
    }

    /// Drop all content and return the indices to zero
    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.count = 0;
    }

    const fn advance(index: usize) -> usize {
        let next = index + 1;
        if next == N {
            0
        } else {
            next
        }
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// [`RingBuffer`] shared between interrupt and foreground contexts
pub struct SharedRingBuffer<const N: usize> {
    inner: Mutex<RefCell<RingBuffer<N>>>,
}

impl<const N: usize> SharedRingBuffer<N> {
    /// Create an empty shared buffer (usable in a `static`)
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(RingBuffer::new())),
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Run `f` on the buffer inside a critical section
    ///
    /// Use this when a check and a mutation must be one atomic step with
    /// respect to the other context.
    pub fn with<R>(&self, f: impl FnOnce(&mut RingBuffer<N>) -> R) -> R {
        critical_section::with(|cs| f(&mut self.inner.borrow_ref_mut(cs)))
    }

    /// Producer side: append a whole batch or nothing
    pub fn enqueue_batch(&self, bytes: &[u8]) -> Result<()> {
        self.with(|ring| ring.try_enqueue_batch(bytes))
    }

    /// Consumer side: take one byte
    pub fn dequeue(&self) -> Result<u8> {
        self.with(|ring| ring.dequeue_one())
    }

    /// Consumer side: take up to `out.len()` bytes, returning how many
    pub fn dequeue_into(&self, out: &mut [u8]) -> usize {
        self.with(|ring| {
            let mut taken = 0;
            for slot in out.iter_mut() {
                match ring.dequeue_one() {
                    Ok(byte) => {
                        *slot = byte;
                        taken += 1;
                    }
                    Err(_) => break,
                }
            }
            taken
        })
    }

    pub fn occupancy(&self) -> usize {
        self.with(|ring| ring.occupancy())
    }

    pub fn free(&self) -> usize {
        self.with(|ring| ring.free())
    }

    /// Logical reset (device re-enumeration)
    pub fn clear(&self) {
        self.with(|ring| ring.clear());
    }
}

impl<const N: usize> Default for SharedRingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
