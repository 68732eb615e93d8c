// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/// Actions the console asks of the firmware that hosts it
///
/// The reset and cancellation hooks are called from interrupt context and
/// must not block or allocate.
pub trait HostHooks {
    /// Reboot into the bootloader
    ///
    /// Real implementations do not return. The signature returns `()` so
    /// test doubles can record the request.
    fn request_bootloader_reset(&self);

    /// The stream is being read; suspend reload-on-file-change
    fn notify_console_activity(&self);

    /// Deliver a keyboard interrupt to the running program
    fn raise_cancellation(&self);

    /// Cooperative scheduler hook, run between busy transmit attempts
    fn scheduler_yield(&self) {}
}

impl<H: HostHooks + ?Sized> HostHooks for &H {
    fn request_bootloader_reset(&self) {
        (**self).request_bootloader_reset()
    }

    fn notify_console_activity(&self) {
        (**self).notify_console_activity()
    }

    fn raise_cancellation(&self) {
        (**self).raise_cancellation()
    }

    fn scheduler_yield(&self) {
        (**self).scheduler_yield()
    }
}
