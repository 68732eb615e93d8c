// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! End-to-end console behaviour against the in-memory transport

mod common;

use cdc_console_core::{
    CallbackKind, CdcConsole, CdcError, ConnectionState, ConsoleSettings, ControlLineState,
    IngestOutcome, LineCoding, TransferStatus, TransportError, TransportEvent, WritePolicy,
};
use common::{FakeTransport, RecordingHost};

type TestConsole<const N: usize> = CdcConsole<FakeTransport, RecordingHost, N>;

fn console_with<const N: usize>(settings: ConsoleSettings) -> TestConsole<N> {
    CdcConsole::new(FakeTransport::new(), RecordingHost::default(), settings)
}

fn enabled_console<const N: usize>() -> TestConsole<N> {
    let console = console_with::<N>(ConsoleSettings::default());
    console.transport().enumerate();
    assert!(console.is_connected());
    console
}

fn read_all<const N: usize>(console: &TestConsole<N>) -> Vec<u8> {
    let mut out = Vec::new();
    while console.bytes_available() {
        out.push(console.read());
    }
    out
}

// ── connection lifecycle ─────────────────────────────────────────────────

#[test]
fn test_not_connected_until_transport_enumerates() {
    let console = console_with::<16>(ConsoleSettings::default());
    assert!(!console.is_connected());
    assert_eq!(console.state(), ConnectionState::Disabled);
    assert!(console.transport().registered().is_empty());

    console.transport().enumerate();
    assert!(console.is_connected());
    assert_eq!(console.state(), ConnectionState::Enabled);
}

#[test]
fn test_enable_transition_is_idempotent() {
    let console = console_with::<16>(ConsoleSettings::default());
    console.transport().enumerate();

    assert!(!console.bytes_available());
    for _ in 0..5 {
        assert!(console.is_connected());
    }
    assert_eq!(console.transport().registered(), CallbackKind::ALL.to_vec());

    // once enabled, the transport flag is no longer consulted
    console.transport().set_enabled(false);
    assert!(console.is_connected());
    assert_eq!(console.transport().registered().len(), 4);
}

#[test]
fn test_enable_discards_pre_connection_bytes() {
    let console = console_with::<16>(ConsoleSettings::default());
    console.transport().preload(b"garbage from before the port was opened");
    console.transport().enumerate();

    assert!(!console.bytes_available());
    assert_eq!(console.transport().pending_inbound(), 0);
}

#[test]
fn test_discard_read_is_capped_by_setting() {
    let settings = ConsoleSettings {
        discard_read_len: 4,
        ..ConsoleSettings::default()
    };
    let console = console_with::<16>(settings);
    console.transport().preload(b"0123456789");
    console.transport().enumerate();
    assert!(console.is_connected());
    assert_eq!(console.transport().pending_inbound(), 6);
}

#[test]
fn test_stream_calls_before_enable() {
    let console = console_with::<16>(ConsoleSettings::default());

    assert!(!console.bytes_available());
    assert_eq!(console.available_count(), 0);
    assert_eq!(console.read(), 0);
    assert_eq!(console.try_read(), Err(CdcError::NotEnabled));
    assert_eq!(console.write(b"dropped"), Ok(()));

    assert!(console.transport().sent().is_empty());
    assert_eq!(console.transport().write_calls(), 0);
    assert_eq!(console.host().activity.get(), 0);
}

// ── receive path ─────────────────────────────────────────────────────────

#[test]
fn test_received_bytes_are_read_in_order() {
    let console = enabled_console::<32>();
    let event = console.transport().host_sends(b"print(1)");
    console.dispatch(event).unwrap();
    let event = console.transport().host_sends(b"\r\n");
    console.dispatch(event).unwrap();

    assert_eq!(console.available_count(), 10);
    assert_eq!(read_all(&console), b"print(1)\r\n");
    assert_eq!(console.stats().bytes_received, 10);
    assert_eq!(console.stats().bytes_read, 10);
}

#[test]
fn test_interrupt_character_scenario() {
    let console = enabled_console::<32>();
    let event = console.transport().host_sends(b"AB\x03CD");

    assert_eq!(console.dispatch(event), Ok(()));
    assert_eq!(console.host().cancellations.get(), 1);
    assert_eq!(read_all(&console), b"AB");
    // the tail was consumed from the transport, not left for later
    assert_eq!(console.transport().pending_inbound(), 0);

    let stats = console.stats();
    assert_eq!(stats.interrupts_raised, 1);
    assert_eq!(stats.dropped_bytes, 2);
}

#[test]
fn test_ingest_reports_interruption() {
    let console = enabled_console::<16>();
    let outcome = console.ingest(b"xyz\x03").unwrap();
    assert_eq!(
        outcome,
        IngestOutcome::Interrupted {
            stored: 3,
            discarded: 1
        }
    );
    assert_eq!(console.host().cancellations.get(), 1);
}

#[test]
fn test_overflow_rejects_batch_wholesale() {
    let console = enabled_console::<8>();

    let event = console.transport().host_sends(b"ABCDE");
    console.dispatch(event).unwrap();
    assert_eq!(console.available_count(), 5);
    assert_eq!(console.read(), b'A');
    assert_eq!(console.read(), b'B');

    let event = console.transport().host_sends(b"FGHIJK");
    assert_eq!(
        console.dispatch(event),
        Err(CdcError::Overflow {
            requested: 6,
            available: 5
        })
    );
    assert_eq!(console.available_count(), 3);
    assert_eq!(console.transport().pending_inbound(), 0);
    assert_eq!(read_all(&console), b"CDE");

    let stats = console.stats();
    assert_eq!(stats.overflowed_batches, 1);
    assert_eq!(stats.dropped_bytes, 6);
}

#[test]
fn test_transfers_larger_than_one_packet() {
    let console = enabled_console::<256>();
    let payload: Vec<u8> = (0..150u8).map(|i| b'a' + (i % 26)).collect();
    let event = console.transport().host_sends(&payload);

    console.dispatch(event).unwrap();
    assert_eq!(read_all(&console), payload);
}

#[test]
fn test_interrupt_in_second_packet_drains_remainder() {
    let console = enabled_console::<256>();
    let mut payload = vec![b'x'; 70];
    payload.push(0x03);
    payload.extend_from_slice(&[b'y'; 40]);
    let event = console.transport().host_sends(&payload);

    console.dispatch(event).unwrap();
    assert_eq!(console.available_count(), 70);
    assert_eq!(console.transport().pending_inbound(), 0);
    assert_eq!(console.host().cancellations.get(), 1);
}

#[test]
fn test_receive_read_failure_is_reported() {
    let console = enabled_console::<16>();
    let event = console.transport().host_sends(b"abc");
    console.transport().fail_reads(Some(-7));

    assert_eq!(
        console.dispatch(event),
        Err(CdcError::TransportFailure { code: -7 })
    );
    console.transport().fail_reads(None);
    assert_eq!(console.available_count(), 0);
}

#[test]
fn test_failure_mid_transfer_commits_nothing() {
    let console = enabled_console::<128>();
    let payload = [b'z'; 100];
    let event = console.transport().host_sends(&payload);
    console.transport().fail_reads_after(1, -1);

    assert_eq!(
        console.dispatch(event),
        Err(CdcError::TransportFailure { code: -1 })
    );
    assert_eq!(console.transport().pending_inbound(), 36);
    assert_eq!(console.available_count(), 0);
    assert_eq!(console.stats().bytes_received, 0);
}

#[test]
fn test_overflow_is_reported_even_if_drain_fails() {
    let console = enabled_console::<8>();
    let event = console.transport().host_sends(b"123456789");
    console.transport().fail_reads(Some(-4));

    assert_eq!(
        console.dispatch(event),
        Err(CdcError::Overflow {
            requested: 9,
            available: 8
        })
    );
    assert_eq!(console.stats().overflowed_batches, 1);
    assert_eq!(console.stats().dropped_bytes, 9);
}

#[test]
fn test_read_into_with_empty_slice_still_enables() {
    let console = console_with::<16>(ConsoleSettings::default());
    console.transport().enumerate();
    assert_eq!(console.read_into(&mut []), 0);
    assert_eq!(console.state(), ConnectionState::Enabled);
}

#[test]
fn test_non_ok_transfer_status_still_delivers() {
    let console = enabled_console::<16>();
    console.transport().preload(b"hi");
    console
        .on_receive_complete(1, TransferStatus::Stalled, 2)
        .unwrap();
    assert_eq!(read_all(&console), b"hi");
}

#[test]
fn test_interrupt_character_can_be_changed_or_disabled() {
    let console = enabled_console::<16>();
    console.set_interrupt_char(None);
    assert_eq!(console.interrupt_char(), None);

    let event = console.transport().host_sends(b"a\x03b");
    console.dispatch(event).unwrap();
    assert_eq!(read_all(&console), b"a\x03b");
    assert_eq!(console.host().cancellations.get(), 0);

    console.set_interrupt_char(Some(b'!'));
    let event = console.transport().host_sends(b"go!now");
    console.dispatch(event).unwrap();
    assert_eq!(read_all(&console), b"go");
    assert_eq!(console.host().cancellations.get(), 1);
}

#[test]
fn test_read_distinguishes_empty_from_nul() {
    let console = enabled_console::<16>();
    assert_eq!(console.try_read(), Err(CdcError::Empty));

    let event = console.transport().host_sends(&[0x00]);
    console.dispatch(event).unwrap();
    assert_eq!(console.try_read(), Ok(0x00));
    assert_eq!(console.try_read(), Err(CdcError::Empty));
}

#[test]
fn test_read_notifies_activity_only_when_data_is_returned() {
    let console = enabled_console::<16>();
    assert_eq!(console.read(), 0);
    assert_eq!(console.host().activity.get(), 0);

    let event = console.transport().host_sends(b"ok");
    console.dispatch(event).unwrap();
    console.read();
    console.read();
    assert_eq!(console.host().activity.get(), 2);
}

#[test]
fn test_read_into_drains_in_bulk() {
    let console = enabled_console::<16>();
    let event = console.transport().host_sends(b"hello world");
    console.dispatch(event).unwrap();

    let mut buf = [0u8; 5];
    assert_eq!(console.read_into(&mut buf), 5);
    assert_eq!(&buf, b"hello");
    let mut rest = [0u8; 16];
    let n = console.read_into(&mut rest);
    assert_eq!(&rest[..n], b" world");
    assert_eq!(console.read_into(&mut rest), 0);
    assert_eq!(console.host().activity.get(), 2);
}

// ── control signals ──────────────────────────────────────────────────────

#[test]
fn test_1200_baud_then_dtr_drop_requests_one_reset() {
    let console = enabled_console::<16>();
    console
        .dispatch(TransportEvent::LineCodingChanged(LineCoding::new(1200)))
        .unwrap();
    assert!(console.reset_on_disconnect());

    console
        .dispatch(TransportEvent::ControlStateChanged(ControlLineState::new(
            true, true,
        )))
        .unwrap();
    assert!(console.reset_on_disconnect());
    assert_eq!(console.host().resets.get(), 0);

    console
        .dispatch(TransportEvent::ControlStateChanged(ControlLineState::new(
            false, false,
        )))
        .unwrap();
    assert_eq!(console.host().resets.get(), 1);
    assert_eq!(console.stats().resets_requested, 1);
}

#[test]
fn test_dtr_drop_at_normal_baud_does_not_reset() {
    let console = enabled_console::<16>();
    assert!(console.on_line_coding_changed(&LineCoding::new(1200)));
    assert!(console.on_line_coding_changed(&LineCoding::new(115_200)));
    assert!(!console.reset_on_disconnect());

    console
        .on_control_state_changed(ControlLineState::new(false, false))
        .unwrap();
    assert_eq!(console.host().resets.get(), 0);
    assert!(!console.dtr());
}

#[test]
fn test_reset_convention_can_be_disabled() {
    let console = console_with::<16>(ConsoleSettings {
        reset_baud_rate: None,
        ..ConsoleSettings::default()
    });
    console.on_line_coding_changed(&LineCoding::new(1200));
    console
        .on_control_state_changed(ControlLineState::default())
        .unwrap();
    assert_eq!(console.host().resets.get(), 0);
}

// ── transmit path ────────────────────────────────────────────────────────

#[test]
fn test_write_reaches_transport() {
    let console = enabled_console::<16>();
    console.write(b">>> ").unwrap();
    assert_eq!(console.transport().sent(), b">>> ");
    assert_eq!(console.stats().bytes_written, 4);
}

#[test]
fn test_write_retries_while_busy_and_yields() {
    let console = enabled_console::<16>();
    console.transport().script_writes(&[
        Err(TransportError::Busy),
        Err(TransportError::Busy),
        Ok(3),
        Ok(0),
    ]);

    console.write(b"abcdef").unwrap();
    assert_eq!(console.transport().sent(), b"abcdef");
    assert_eq!(console.host().yields.get(), 3);
}

#[test]
fn test_write_gives_up_after_budget() {
    let console = console_with::<16>(ConsoleSettings {
        write_policy: WritePolicy::bounded(4),
        ..ConsoleSettings::default()
    });
    console.transport().enumerate();
    console
        .transport()
        .script_writes(&[Err(TransportError::Busy); 10]);

    assert_eq!(
        console.write(b"stuck"),
        Err(CdcError::WriteBusy { attempts: 4 })
    );
    assert_eq!(console.transport().write_calls(), 4);
    assert_eq!(console.stats().bytes_written, 0);
}

#[test]
fn test_hard_failure_surfaces_after_budget() {
    let console = console_with::<16>(ConsoleSettings {
        write_policy: WritePolicy::bounded(2),
        ..ConsoleSettings::default()
    });
    console.transport().enumerate();
    console.transport().script_writes(&[
        Err(TransportError::Failure { code: 9 }),
        Err(TransportError::Failure { code: 9 }),
    ]);

    assert_eq!(
        console.write(b"x"),
        Err(CdcError::TransportFailure { code: 9 })
    );
}

#[test]
fn test_transmit_complete_is_a_no_op() {
    let console = enabled_console::<16>();
    let event = TransportEvent::TransmitComplete {
        endpoint: 2,
        status: TransferStatus::Ok,
        byte_count: 64,
    };
    assert_eq!(console.dispatch(event), Ok(()));
    assert_eq!(console.available_count(), 0);
}
