// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Control-line monitor and the 1200-baud bootloader convention
//!
//! Opening the port at 1200 baud and then closing it (DTR dropped) asks the
//! device to reboot into its bootloader. This rides on top of the standard
//! CDC control requests; the CDC class itself does not define it.

use core::sync::atomic::{AtomicBool, Ordering};

/// Baud rate that arms the reset-on-disconnect convention
pub const BOOTLOADER_RESET_BAUD: u32 = 1200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    One,
    OnePointFive,
    Two,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Odd,
    Even,
    Mark,
    Space,
}

/// Line coding requested by the host (SET_LINE_CODING)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineCoding {
    pub baud_rate: u32,
    pub stop_bits: StopBits,
    pub parity: Parity,
    pub data_bits: u8,
}

impl LineCoding {
    /// 8N1 at `baud_rate`
    pub const fn new(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            stop_bits: StopBits::One,
            parity: Parity::None,
            data_bits: 8,
        }
    }
}

impl Default for LineCoding {
    fn default() -> Self {
        Self::new(115_200)
    }
}

/// Control line state set by the host (SET_CONTROL_LINE_STATE)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlLineState {
    pub dtr: bool,
    pub rts: bool,
}

impl ControlLineState {
    pub const fn new(dtr: bool, rts: bool) -> Self {
        Self { dtr, rts }
    }
}

/// What the owner must do after a control-state notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    None,
    RequestBootloaderReset,
}

/// Derives the reset-on-disconnect policy from host notifications
///
/// Both handlers run in transport (interrupt) context; the flags are only
/// written there and read from the foreground.
pub struct ControlMonitor {
    reset_baud_rate: Option<u32>,
    reset_on_disconnect: AtomicBool,
    dtr: AtomicBool,
}

impl ControlMonitor {
    /// `reset_baud_rate` of `None` disables the convention
    pub const fn new(reset_baud_rate: Option<u32>) -> Self {
        Self {
            reset_baud_rate,
            reset_on_disconnect: AtomicBool::new(false),
            dtr: AtomicBool::new(false),
        }
    }

    /// Record new line coding; always accepted
    pub fn on_line_coding_changed(&self, coding: &LineCoding) -> bool {
        let armed = self.reset_baud_rate == Some(coding.baud_rate);
        self.reset_on_disconnect.store(armed, Ordering::Relaxed);
        true
    }

    /// Record new control lines and decide whether to reset
    ///
    /// Every notification with DTR low while armed requests a reset. The
    /// armed flag is left set; the reset itself ends the session.
    pub fn on_control_state_changed(&self, state: ControlLineState) -> ControlAction {
        self.dtr.store(state.dtr, Ordering::Relaxed);
        if !state.dtr && self.reset_on_disconnect.load(Ordering::Relaxed) {
            ControlAction::RequestBootloaderReset
        } else {
            ControlAction::None
        }
    }

    pub fn reset_on_disconnect(&self) -> bool {
        self.reset_on_disconnect.load(Ordering::Relaxed)
    }

    /// Last DTR value reported by the host
    pub fn dtr(&self) -> bool {
        self.dtr.load(Ordering::Relaxed)
    }

    pub fn reset_baud_rate(&self) -> Option<u32> {
        self.reset_baud_rate
    }
}

impl Default for ControlMonitor {
    fn default() -> Self {
        Self::new(Some(BOOTLOADER_RESET_BAUD))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_1200_baud_arms_reset() {
        let monitor = ControlMonitor::default();
        assert!(!monitor.reset_on_disconnect());
        assert!(monitor.on_line_coding_changed(&LineCoding::new(1200)));
        assert!(monitor.reset_on_disconnect());
    }

    #[test]
    fn test_other_baud_disarms() {
        let monitor = ControlMonitor::default();
        monitor.on_line_coding_changed(&LineCoding::new(1200));
        assert!(monitor.on_line_coding_changed(&LineCoding::new(9600)));
        assert!(!monitor.reset_on_disconnect());
    }

    #[test]
    fn test_armed_flag_survives_control_events() {
        let monitor = ControlMonitor::default();
        monitor.on_line_coding_changed(&LineCoding::new(1200));
        monitor.on_control_state_changed(ControlLineState::new(true, true));
        monitor.on_control_state_changed(ControlLineState::new(true, false));
        assert!(monitor.reset_on_disconnect());
        assert_eq!(
            monitor.on_control_state_changed(ControlLineState::new(false, false)),
            ControlAction::RequestBootloaderReset
        );
        assert!(monitor.reset_on_disconnect());
    }

    #[test]
    fn test_dtr_drop_without_arming_does_nothing() {
        let monitor = ControlMonitor::default();
        monitor.on_line_coding_changed(&LineCoding::new(115_200));
        assert_eq!(
            monitor.on_control_state_changed(ControlLineState::new(false, false)),
            ControlAction::None
        );
    }

    #[test]
    fn test_dtr_high_never_resets() {
        let monitor = ControlMonitor::default();
        monitor.on_line_coding_changed(&LineCoding::new(1200));
        assert_eq!(
            monitor.on_control_state_changed(ControlLineState::new(true, false)),
            ControlAction::None
        );
        assert!(monitor.dtr());
    }

    #[test]
    fn test_disabled_convention() {
        let monitor = ControlMonitor::new(None);
        monitor.on_line_coding_changed(&LineCoding::new(1200));
        assert!(!monitor.reset_on_disconnect());
        assert_eq!(
            monitor.on_control_state_changed(ControlLineState::default()),
            ControlAction::None
        );
    }
}
