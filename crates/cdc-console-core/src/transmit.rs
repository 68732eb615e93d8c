// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Transmit gate
//!
//! Hands outgoing bytes to the transport, yielding to the host scheduler
//! while the endpoint is busy. The retry budget counts consecutive attempts
//! that made no progress; any accepted prefix resets it.

use crate::error::{CdcError, Result, TransportError};
use crate::host::HostHooks;
use crate::transport::CdcTransport;

pub const DEFAULT_MAX_WRITE_ATTEMPTS: u32 = 10_000;

/// How long a write may keep retrying
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WritePolicy {
    /// `None` retries forever
    pub max_attempts: Option<u32>,
}

impl WritePolicy {
    pub const UNBOUNDED: WritePolicy = WritePolicy { max_attempts: None };

    pub const fn bounded(max_attempts: u32) -> Self {
        Self {
            max_attempts: Some(max_attempts),
        }
    }
}

impl Default for WritePolicy {
    fn default() -> Self {
        Self::bounded(DEFAULT_MAX_WRITE_ATTEMPTS)
    }
}

pub struct TransmitGate {
    policy: WritePolicy,
}

impl TransmitGate {
    pub const fn new(policy: WritePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> WritePolicy {
        self.policy
    }

    /// Push all of `data` through `transport`
    ///
    /// Returns the number of bytes sent, which is always `data.len()` on
    /// success.
    ///
    /// # Errors
    ///
    /// When the budget runs out: [`CdcError::WriteBusy`] if the last attempt
    /// was busy, [`CdcError::TransportFailure`] if it was a hard failure.
    /// Bytes accepted before that point have already been queued.
    pub fn send<T, H>(&self, transport: &T, host: &H, data: &[u8]) -> Result<usize>
    where
        T: CdcTransport + ?Sized,
        H: HostHooks + ?Sized,
    {
        let mut offset = 0;
        let mut stalled: u32 = 0;

        while offset < data.len() {
            let remaining = &data[offset..];
            let last = match transport.write(remaining) {
                Ok(accepted) if accepted > 0 => {
                    offset += accepted.min(remaining.len());
                    stalled = 0;
                    continue;
                }
                Ok(_) | Err(TransportError::Busy) => TransportError::Busy,
                Err(failure) => failure,
            };

            stalled = stalled.saturating_add(1);
            if let Some(max) = self.policy.max_attempts {
                if stalled >= max.max(1) {
                    log::warn!(
                        "Write gave up after {} attempts ({} of {} bytes sent): {}",
                        stalled,
                        offset,
                        data.len(),
                        last
                    );
                    return Err(match last {
                        TransportError::Busy => CdcError::WriteBusy { attempts: stalled },
                        TransportError::Failure { code } => CdcError::TransportFailure { code },
                    });
                }
            }
            host.scheduler_yield();
        }

        Ok(offset)
    }
}

impl Default for TransmitGate {
    fn default() -> Self {
        Self::new(WritePolicy::default())
    }
}
