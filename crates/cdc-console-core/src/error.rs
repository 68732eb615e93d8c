// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for console and transport operations

use core::fmt;

/// Outcome of a transport read or write that did not succeed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// Endpoint or transmit queue not ready; retrying later may succeed
    Busy,

    /// Any other non-success outcome reported by the vendor stack
    Failure {
        /// Vendor-specific status code
        code: i32,
    },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Busy => write!(f, "Transport busy"),
            TransportError::Failure { code } => write!(f, "Transport failure (code {})", code),
        }
    }
}

/// Console errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CdcError {
    /// Offered batch exceeds free ring capacity; nothing was stored
    Overflow {
        /// Bytes offered
        requested: usize,
        /// Free bytes at the time of the offer
        available: usize,
    },

    /// No byte buffered
    Empty,

    /// Stream used before the CDC interface was enumerated
    NotEnabled,

    /// Transport stayed busy for the whole retry budget
    WriteBusy {
        /// Consecutive attempts made without progress
        attempts: u32,
    },

    /// Transport reported a non-busy failure
    TransportFailure {
        /// Vendor-specific status code
        code: i32,
    },
}

impl fmt::Display for CdcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CdcError::Overflow {
                requested,
                available,
            } => {
                write!(
                    f,
                    "Receive buffer overflow: offered {} bytes, {} free",
                    requested, available
                )
            }
            CdcError::Empty => write!(f, "Receive buffer empty"),
            CdcError::NotEnabled => write!(f, "CDC interface not enabled"),
            CdcError::WriteBusy { attempts } => {
                write!(f, "Transport still busy after {} attempts", attempts)
            }
            CdcError::TransportFailure { code } => {
                write!(f, "Transport failure (code {})", code)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TransportError {}

#[cfg(feature = "std")]
impl std::error::Error for CdcError {}

/// Result type for console operations
pub type Result<T> = core::result::Result<T, CdcError>;
