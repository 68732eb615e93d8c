// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! ARM Cortex-M host hooks
//!
//! The board supplies three plain functions: one that leaves the
//! "enter bootloader" marker wherever its bootloader looks (a magic RAM word,
//! a retained register), one that suspends reload-on-change, and one that
//! schedules a keyboard interrupt in the interpreter. The reset itself goes
//! through the system control block.

use cdc_console_core::HostHooks;
use ::cortex_m::peripheral::SCB;

/// [`HostHooks`] for Cortex-M boards
#[derive(Clone, Copy)]
pub struct CortexMHooks {
    prepare_reset: fn(),
    on_activity: fn(),
    on_cancel: fn(),
}

impl CortexMHooks {
    pub const fn new(prepare_reset: fn(), on_activity: fn(), on_cancel: fn()) -> Self {
        Self {
            prepare_reset,
            on_activity,
            on_cancel,
        }
    }
}

impl HostHooks for CortexMHooks {
    fn request_bootloader_reset(&self) {
        log::warn!("Resetting into bootloader");
        (self.prepare_reset)();
        SCB::sys_reset();
    }

    fn notify_console_activity(&self) {
        (self.on_activity)();
    }

    fn raise_cancellation(&self) {
        (self.on_cancel)();
    }

    fn scheduler_yield(&self) {
        ::cortex_m::asm::nop();
    }
}
