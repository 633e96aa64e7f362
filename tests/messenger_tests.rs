//! End-to-end behavior of the messenger over mock serial ports.

mod common;

use common::{transcript, Harness};
use lora_messenger::port::PLACEHOLDER;
use lora_messenger::session::SessionSettings;
use lora_messenger::transcript::Direction;
use lora_messenger::ChatError;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn selector_offers_placeholder_plus_every_port() {
    for count in [0usize, 1, 3] {
        let names: Vec<String> = (0..count).map(|i| format!("COM{}", i + 1)).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let harness = Harness::with_ports(&refs);

        let options = harness.messenger.selector().options();
        assert_eq!(options.len(), count + 1);
        assert_eq!(options[0], PLACEHOLDER);
        assert_eq!(&options[1..], refs.as_slice());
        assert!(!harness.messenger.selector().is_selectable(0));
    }
}

#[test]
fn placeholder_does_not_touch_open_connection() {
    let mut harness = Harness::with_ports(&["COM3", "COM4"]);
    let info = harness.messenger.select_port(1).unwrap().unwrap();
    assert_eq!(info.port_name, "COM3");
    let attempts = harness.opener.attempts();

    assert!(harness.messenger.select_port(0).unwrap().is_none());
    assert_eq!(harness.opener.attempts(), attempts);
    assert_eq!(
        harness.messenger.connection().map(|c| c.port_name),
        Some("COM3".to_string())
    );
}

#[test]
fn reselecting_closes_previous_handle_first() {
    let mut harness = Harness::with_ports(&["COM3", "COM4"]);
    let com3 = harness.opener.add_port("COM3");
    let com4 = harness.opener.add_port("COM4");

    harness.messenger.select_port(1).unwrap();
    assert_eq!(com3.open_handles(), 1);

    harness.messenger.select_port(2).unwrap();
    assert_eq!(com3.open_handles(), 0);
    assert_eq!(com4.open_handles(), 1);
}

#[test]
fn failed_open_leaves_no_connection() {
    let mut harness = Harness::with_ports(&["COM3", "COM9"]);
    harness.opener.unplug("COM9");
    harness.messenger.select_port(1).unwrap();

    assert!(harness.messenger.select_port(2).is_err());
    assert!(harness.messenger.connection().is_none());

    let err = harness.send("alice", "hello").unwrap_err();
    assert!(matches!(err, ChatError::NotConnected));
}

#[test]
fn valid_send_echoes_writes_and_clears() {
    let (mut harness, device) = Harness::connected("COM3");
    harness.send("alice", "hello").unwrap();
    harness.flush();

    assert_eq!(
        transcript(&harness.messenger),
        vec![(Direction::Sent, "alice: hello".to_string())]
    );
    assert_eq!(device.written(), b"alice: hello\n".to_vec());
    assert!(harness.messenger.input.is_empty());
    assert_eq!(harness.messenger.username, "alice");
}

#[test]
fn fields_are_trimmed_before_composing() {
    let (mut harness, device) = Harness::connected("COM3");
    harness.send("  alice ", "\thello  ").unwrap();
    harness.flush();
    assert_eq!(device.written(), b"alice: hello\n".to_vec());
}

#[test]
fn writes_arrive_in_submission_order() {
    let (mut harness, device) = Harness::connected("COM3");
    for i in 0..20 {
        harness.send("alice", &format!("message {i}")).unwrap();
    }
    harness.flush();

    let expected: Vec<Vec<u8>> = (0..20)
        .map(|i| format!("alice: message {i}\n").into_bytes())
        .collect();
    assert_eq!(device.write_log(), expected);
}

#[test]
fn write_failure_keeps_local_echo() {
    let (mut harness, device) = Harness::connected("COM3");
    device.fail_next_write();
    harness.send("alice", "lost").unwrap();
    harness.send("alice", "kept").unwrap();
    harness.flush();

    assert_eq!(transcript(&harness.messenger).len(), 2);
    assert_eq!(device.written(), b"alice: kept\n".to_vec());
}

#[test]
fn one_tick_appends_one_received_line() {
    let (mut harness, device) = Harness::connected("COM3");
    device.enqueue_read(b"bob: hi\n");

    assert_eq!(harness.messenger.poll_tick(), 1);
    assert_eq!(
        transcript(&harness.messenger),
        vec![(Direction::Received, "bob: hi".to_string())]
    );

    assert_eq!(harness.messenger.poll_tick(), 0);
    assert_eq!(transcript(&harness.messenger).len(), 1);
}

#[test]
fn partial_lines_wait_for_terminator() {
    let (mut harness, device) = Harness::connected("COM3");
    device.enqueue_read(b"bob: he");
    assert_eq!(harness.messenger.poll_tick(), 0);

    device.enqueue_read(b"llo\r\ncarol: ");
    assert_eq!(harness.messenger.poll_tick(), 1);
    assert_eq!(
        harness.messenger.transcript().entries()[0].text,
        "bob: hello"
    );

    device.enqueue_read(b"yo\n");
    assert_eq!(harness.messenger.poll_tick(), 1);
}

#[test]
fn idle_ticks_never_change_transcript() {
    let (mut harness, _device) = Harness::connected("COM3");
    harness.send("alice", "hello").unwrap();
    let before = transcript(&harness.messenger);

    for _ in 0..10 {
        assert_eq!(harness.messenger.poll_tick(), 0);
    }
    assert_eq!(transcript(&harness.messenger), before);
}

#[test]
fn ticks_without_connection_are_harmless() {
    let mut harness = Harness::with_ports(&["COM3"]);
    for _ in 0..3 {
        assert_eq!(harness.messenger.poll_tick(), 0);
    }
    assert!(harness.messenger.transcript().is_empty());
}

#[test]
fn shutdown_stops_everything_even_with_device_clone_alive() {
    let (mut harness, device) = Harness::connected("COM3");
    harness.messenger.shutdown();
    assert!(!harness.messenger.session().is_active());
    assert_eq!(device.open_handles(), 0);

    device.enqueue_read(b"bob: late\n");
    assert_eq!(harness.messenger.poll_tick(), 0);

    let err = harness.send("alice", "too late").unwrap_err();
    assert!(matches!(err, ChatError::Inactive));
    assert_eq!(harness.messenger.input, "too late");

    assert!(harness.messenger.transcript().is_empty());
    assert!(device.written().is_empty());

    // A second shutdown is a no-op.
    harness.messenger.shutdown();
}

#[test]
fn full_queue_rejects_without_echo() {
    let settings = SessionSettings {
        send_queue_capacity: 1,
        ..SessionSettings::default()
    };
    let mut harness = Harness::with_settings(&[], settings);
    let device = harness.opener.add_port("COM3");
    harness.messenger.connect_to("COM3").unwrap();

    let mut accepted = 0;
    let mut rejected = 0;
    for i in 0..200 {
        match harness.send("alice", &format!("burst {i}")) {
            Ok(()) => accepted += 1,
            Err(ChatError::QueueFull) => {
                rejected += 1;
                assert_eq!(harness.messenger.input, format!("burst {i}"));
            }
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    harness.flush();

    assert_eq!(accepted + rejected, 200);
    assert_eq!(harness.messenger.transcript().len(), accepted);
    assert_eq!(device.write_log().len(), accepted);
}

fn blank() -> impl Strategy<Value = String> {
    "[ \t]{0,4}"
}

fn word() -> impl Strategy<Value = String> {
    "[ ]{0,2}[a-zA-Z0-9]{0,8}[ ]{0,2}"
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn empty_field_means_no_write_and_no_entry(
        username in prop_oneof![blank(), word()],
        message in prop_oneof![blank(), word()],
    ) {
        prop_assume!(username.trim().is_empty() || message.trim().is_empty());

        let (mut harness, device) = Harness::connected("COM3");
        let result = harness.send(&username, &message);
        harness.flush();

        prop_assert!(result.is_err());
        prop_assert!(harness.messenger.transcript().is_empty());
        prop_assert!(device.written().is_empty());
        prop_assert_eq!(&harness.messenger.input, &message);
    }
}
