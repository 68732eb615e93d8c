// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Lazy, one-shot connection activation
//!
//! The console starts `Disabled`. The first stream call that finds the
//! transport enumerated arms the transport callbacks, flips to `Enabled`
//! and throws away whatever the transport buffered before the connection.
//! There is no way back to `Disabled` for this instance; re-enumeration
//! is handled by building a fresh console.

use core::sync::atomic::{AtomicBool, Ordering};

use crate::transport::{CallbackKind, CdcTransport, MAX_PACKET_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disabled,
    Enabled,
}

/// Connection flag, written only from the foreground context
pub struct Connection {
    enabled: AtomicBool,
}

impl Connection {
    pub const fn new() -> Self {
        Self {
            enabled: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> ConnectionState {
        if self.is_enabled() {
            ConnectionState::Enabled
        } else {
            ConnectionState::Disabled
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Take the Disabled → Enabled transition if the transport is ready
    ///
    /// Returns whether the connection is enabled after the call. Calls made
    /// while already enabled do not touch the transport. `discard_len` bytes
    /// (capped at one packet) are read and dropped right after enabling.
    pub fn ensure_enabled<T: CdcTransport + ?Sized>(&self, transport: &T, discard_len: usize) -> bool {
        if self.is_enabled() {
            return true;
        }
        if !transport.is_enabled() {
            return false;
        }

        for kind in CallbackKind::ALL {
            transport.register_callback(kind);
        }
        self.enabled.store(true, Ordering::Release);

        let mut scratch = [0u8; MAX_PACKET_SIZE];
        let len = discard_len.min(MAX_PACKET_SIZE);
        match transport.read(&mut scratch[..len]) {
            Ok(dropped) => log::debug!("Discarded {} pre-connection bytes", dropped),
            Err(err) => log::debug!("Pre-connection discard read failed: {}", err),
        }

        log::info!("CDC console enabled");
        true
    }
}

impl Default for Connection {
    fn default() -> Self {
        Self::new()
    }
}
