// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! End-to-end host sessions through the umbrella crate

use cdc_console::config::{load_config, validate_config, CdcConsoleConfig};
use cdc_console::driver::{ConnectionState, BOOTLOADER_RESET_BAUD};
use cdc_console::prelude::*;
use std::io::Write;

fn connected_sim() -> Simulator {
    let sim = Simulator::new(ConsoleSettings::default());
    assert!(sim.plug_in());
    sim.open_port(115_200).unwrap();
    sim
}

#[test]
fn test_typed_line_is_echoed_back() {
    let mut sim = connected_sim();
    sim.type_text(b"1 + 1\r").unwrap();

    assert_eq!(sim.run_foreground().unwrap(), 6);
    assert_eq!(sim.echoed(), b"1 + 1\r");
    assert_eq!(sim.host_output(), b"1 + 1\r".to_vec());

    let report = sim.report();
    assert_eq!(report.state, ConnectionState::Enabled);
    assert_eq!(report.stats.bytes_read, 6);
    assert_eq!(report.stats.bytes_written, 6);
    assert_eq!(report.resets, 0);
}

#[test]
fn test_ctrl_c_cancels_pending_input() {
    let mut sim = connected_sim();
    sim.type_text(b"while True: pass\x03").unwrap();
    sim.run_foreground().unwrap();

    let report = sim.report();
    assert_eq!(report.cancellations, 1);
    assert_eq!(report.stats.interrupts_raised, 1);
    assert!(sim.echoed().iter().all(|&b| b != 0x03));
}

#[test]
fn test_bytes_sent_before_enumeration_are_discarded() {
    let mut sim = Simulator::<128>::new(ConsoleSettings::default());
    // not enumerated yet: events are not delivered, data waits in the endpoint
    sim.type_text(b"stale").unwrap();
    assert!(sim.plug_in());
    sim.open_port(115_200).unwrap();

    assert_eq!(sim.run_foreground().unwrap(), 0);
    assert!(sim.echoed().is_empty());
}

#[test]
fn test_1200_baud_touch_requests_one_reset() {
    let sim = connected_sim();
    sim.close_port().unwrap();
    assert_eq!(sim.report().resets, 0);

    sim.open_port(BOOTLOADER_RESET_BAUD).unwrap();
    sim.close_port().unwrap();
    assert_eq!(sim.report().resets, 1);
    assert_eq!(sim.report().stats.resets_requested, 1);
}

#[test]
fn test_config_file_drives_the_session() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cdc_console.toml");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(
        file,
        "[console]\ninterrupt_enabled = false\n\n[control]\nbootloader_reset = false\n"
    )
    .unwrap();

    let config = load_config(Some(&path), None).unwrap();
    validate_config(&config).unwrap();

    let mut sim: Simulator = Simulator::from_config(&config).unwrap();
    assert!(sim.plug_in());
    sim.open_port(BOOTLOADER_RESET_BAUD).unwrap();
    sim.type_text(b"a\x03b").unwrap();
    sim.run_foreground().unwrap();
    sim.close_port().unwrap();

    assert_eq!(sim.echoed(), b"a\x03b");
    let report = sim.report();
    assert_eq!(report.cancellations, 0);
    assert_eq!(report.resets, 0);
}

#[test]
fn test_capacity_mismatch_is_rejected() {
    let mut config = CdcConsoleConfig::default();
    config.console.rx_buffer_size = 256;
    assert!(Simulator::<128>::from_config(&config).is_err());
    assert!(Simulator::<256>::from_config(&config).is_ok());
}
