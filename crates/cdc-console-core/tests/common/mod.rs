// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Shared test doubles: an in-memory transport and a recording host

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use cdc_console_core::{
    CallbackKind, CdcTransport, HostHooks, TransferStatus, TransportError, TransportEvent,
};

/// Transport double driven by the test as if it were the host PC
#[derive(Default)]
pub struct FakeTransport {
    enabled: Cell<bool>,
    registered: RefCell<Vec<CallbackKind>>,
    inbound: RefCell<VecDeque<u8>>,
    read_failure: Cell<Option<i32>>,
    // (successful reads left, code)
    failure_after: Cell<Option<(usize, i32)>>,
    outbound: RefCell<Vec<u8>>,
    write_script: RefCell<VecDeque<Result<usize, TransportError>>>,
    write_calls: Cell<usize>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Host finished enumerating the CDC interface
    pub fn enumerate(&self) {
        self.enabled.set(true);
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    /// Bytes sitting in the transport before any transfer completes
    pub fn preload(&self, bytes: &[u8]) {
        self.inbound.borrow_mut().extend(bytes.iter().copied());
    }

    /// Host sends `bytes`; returns the completion event to dispatch
    pub fn host_sends(&self, bytes: &[u8]) -> TransportEvent {
        self.preload(bytes);
        TransportEvent::ReceiveComplete {
            endpoint: 1,
            status: TransferStatus::Ok,
            byte_count: bytes.len(),
        }
    }

    pub fn pending_inbound(&self) -> usize {
        self.inbound.borrow().len()
    }

    pub fn fail_reads(&self, code: Option<i32>) {
        self.read_failure.set(code);
    }

    /// Let `successful` more reads through, then fail every read with `code`
    pub fn fail_reads_after(&self, successful: usize, code: i32) {
        self.failure_after.set(Some((successful, code)));
    }

    /// Outcomes for the next writes; afterwards every write is accepted
    pub fn script_writes(&self, outcomes: &[Result<usize, TransportError>]) {
        self.write_script.borrow_mut().extend(outcomes.iter().copied());
    }

    pub fn sent(&self) -> Vec<u8> {
        self.outbound.borrow().clone()
    }

    pub fn write_calls(&self) -> usize {
        self.write_calls.get()
    }

    pub fn registered(&self) -> Vec<CallbackKind> {
        self.registered.borrow().clone()
    }
}

impl CdcTransport for FakeTransport {
    fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    fn register_callback(&self, kind: CallbackKind) {
        self.registered.borrow_mut().push(kind);
    }

    fn read(&self, buf: &mut [u8]) -> Result<usize, TransportError> {
        if let Some(code) = self.read_failure.get() {
            return Err(TransportError::Failure { code });
        }
        match self.failure_after.get() {
            Some((0, code)) => return Err(TransportError::Failure { code }),
            Some((left, code)) => self.failure_after.set(Some((left - 1, code))),
            None => {}
        }
        let mut inbound = self.inbound.borrow_mut();
        let mut n = 0;
        while n < buf.len() {
            match inbound.pop_front() {
                Some(byte) => {
                    buf[n] = byte;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }

    fn write(&self, data: &[u8]) -> Result<usize, TransportError> {
        self.write_calls.set(self.write_calls.get() + 1);
        let accepted = match self.write_script.borrow_mut().pop_front() {
            Some(Ok(n)) => n.min(data.len()),
            Some(Err(err)) => return Err(err),
            None => data.len(),
        };
        self.outbound.borrow_mut().extend_from_slice(&data[..accepted]);
        Ok(accepted)
    }
}

/// Host hooks that only count invocations
#[derive(Default)]
pub struct RecordingHost {
    pub resets: Cell<u32>,
    pub activity: Cell<u32>,
    pub cancellations: Cell<u32>,
    pub yields: Cell<u32>,
}

impl HostHooks for RecordingHost {
    fn request_bootloader_reset(&self) {
        self.resets.set(self.resets.get() + 1);
    }

    fn notify_console_activity(&self) {
        self.activity.set(self.activity.get() + 1);
    }

    fn raise_cancellation(&self) {
        self.cancellations.set(self.cancellations.get() + 1);
    }

    fn scheduler_yield(&self) {
        self.yields.set(self.yields.get() + 1);
    }
}
