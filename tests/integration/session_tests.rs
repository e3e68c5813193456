//! Integration tests for the Session → LineAssembler → Dispatcher pipeline.
//!
//! Peers are in-memory, so every byte the server writes is inspected
//! exactly.

use gpiolink::protocol::dispatcher::HELP_TEXT;
use gpiolink::protocol::line::MAX_LINE_LEN;

use crate::mock_hw::{RecordingSink, make_session};

const NOTICE: &str = "ESP32 Server: Connection Accepted$";

// ── Admission ─────────────────────────────────────────────────

#[test]
fn idle_pass_without_peer_does_nothing() {
    let (mut session, _net) = make_session(0);
    let mut sink = RecordingSink::new();
    session.poll(&mut sink);
    assert!(!session.is_connected());
    assert!(sink.events.is_empty());
}

#[test]
fn admitted_peer_receives_framed_notice() {
    let (mut session, net) = make_session(0);
    let mut sink = RecordingSink::new();
    let client = net.connect();

    session.poll(&mut sink);

    assert!(session.is_connected());
    assert_eq!(client.take_output(), NOTICE);
    assert!(sink.saw("PeerAccepted"));
}

#[test]
fn second_connection_is_rejected_without_touching_the_first() {
    let (mut session, net) = make_session(0b0101);
    let mut sink = RecordingSink::new();
    let first = net.connect();
    session.poll(&mut sink);
    first.take_output();

    // Half a command buffered before the intruder shows up.
    first.send("GPIO:");
    let second = net.connect();
    second.send("HELP?\n");
    session.poll(&mut sink);

    assert!(second.is_closed());
    assert_eq!(second.take_output(), "");
    assert_eq!(second.unread(), 6, "rejected peer is never read");
    assert!(sink.saw("PeerRejected"));

    assert!(session.is_connected());
    assert!(!first.is_closed());
    assert_eq!(session.buffered_len(), 5);

    first.send("IN?\n");
    session.poll(&mut sink);
    assert_eq!(first.take_output(), "5$");
}

#[test]
fn accept_failure_leaves_session_untouched() {
    let (mut session, net) = make_session(0);
    let mut sink = RecordingSink::new();
    let client = net.connect();
    session.poll(&mut sink);
    client.take_output();

    client.send("GPIO:OUT(0) 1");
    net.fail_accept();
    session.poll(&mut sink);

    assert!(sink.saw("AcceptFailed"));
    assert!(session.is_connected());
    assert_eq!(session.buffered_len(), "GPIO:OUT(0) 1".len());

    client.send("\nGPIO:OUT(0)?\n");
    session.poll(&mut sink);
    assert_eq!(client.take_output(), "$1.0000$");
}

#[test]
fn new_peer_is_admitted_after_the_old_one_leaves() {
    let (mut session, net) = make_session(0);
    let mut sink = RecordingSink::new();
    let first = net.connect();
    session.poll(&mut sink);

    first.hang_up();
    session.poll(&mut sink);
    assert!(!session.is_connected());
    assert!(sink.saw("PeerDisconnected { reason: Closed }"));

    let second = net.connect();
    session.poll(&mut sink);
    assert!(session.is_connected());
    assert_eq!(second.take_output(), NOTICE);
}

#[test]
fn hung_up_peer_does_not_block_a_newcomer_in_the_same_pass() {
    let (mut session, net) = make_session(0b0101);
    let mut sink = RecordingSink::new();
    let first = net.connect();
    session.poll(&mut sink);

    // Hang-up and reconnect both land between two passes.
    first.hang_up();
    let second = net.connect();
    second.send("GPIO:IN?\n");
    session.poll(&mut sink);

    assert!(sink.saw("PeerDisconnected { reason: Closed }"));
    assert!(!sink.saw("PeerRejected"));
    assert!(session.is_connected());
    assert!(!second.is_closed());
    assert_eq!(second.take_output(), format!("{NOTICE}5$"));
}

#[test]
fn hung_up_peer_with_unread_input_still_holds_the_slot() {
    let (mut session, net) = make_session(0);
    let mut sink = RecordingSink::new();
    let first = net.connect();
    session.poll(&mut sink);

    first.send("ID?\n");
    first.hang_up();
    let second = net.connect();
    session.poll(&mut sink);

    assert!(second.is_closed());
    assert!(sink.saw("PeerRejected"));
    assert!(!session.is_connected());
}

// ── Command pipeline ──────────────────────────────────────────

#[test]
fn input_query_round_trip() {
    let (mut session, net) = make_session(0b0101);
    let mut sink = RecordingSink::new();
    let client = net.connect();
    client.send("GPIO:IN?\n");

    session.poll(&mut sink);

    assert_eq!(client.take_output(), format!("{NOTICE}5$"));
    assert!(sink.saw(r#"CommandReceived("GPIO:IN?")"#));
    assert!(sink.saw(r#"ResponseSent("5$")"#));
}

#[test]
fn all_queued_commands_are_answered_in_order_in_one_pass() {
    let (mut session, net) = make_session(0);
    let mut sink = RecordingSink::new();
    let client = net.connect();
    session.poll(&mut sink);
    client.take_output();

    client.send("HELP?\nGPIO:OUT(1) 0.5\nGPIO:OUT(1)?\nID?\n");
    session.poll(&mut sink);

    assert_eq!(
        client.take_output(),
        format!("{HELP_TEXT}$$0.4980$GpioLink;0.1.0;GL-EFCAFE$")
    );
    assert_eq!(session.pending_len(), 0);
    assert_eq!(sink.count("ResponseSent"), 4);
}

#[test]
fn line_split_across_reads_is_reassembled() {
    let (mut session, net) = make_session(0b1000);
    let mut sink = RecordingSink::new();
    let client = net.connect();
    session.poll(&mut sink);
    client.take_output();

    client.send("GPIO");
    session.poll(&mut sink);
    assert_eq!(client.take_output(), "");

    client.send(":IN?\r");
    session.poll(&mut sink);
    assert_eq!(client.take_output(), "");

    client.send("\n");
    session.poll(&mut sink);
    assert_eq!(client.take_output(), "8$");
}

#[test]
fn errors_are_answered_as_text() {
    let (mut session, net) = make_session(0);
    let mut sink = RecordingSink::new();
    let client = net.connect();
    session.poll(&mut sink);
    client.take_output();

    client.send("GPIO:OUT(5)?\nGPIO:OUT(1)\nFOO\n\n");
    session.poll(&mut sink);

    assert_eq!(
        client.take_output(),
        "Invalid Output Number: 5$No Output Value Detected$Invalid Command$Invalid Command$"
    );
    assert!(session.is_connected());
    assert_eq!(session.dispatcher().registers().hardware().writes.len(), 0);
}

#[test]
fn overlong_line_is_answered_once_and_the_stream_recovers() {
    let (mut session, net) = make_session(0);
    let mut sink = RecordingSink::new();
    let client = net.connect();
    session.poll(&mut sink);
    client.take_output();

    client.send(&"A".repeat(MAX_LINE_LEN + 44));
    client.send("\n*IDN?\n");
    session.poll(&mut sink);

    assert_eq!(
        client.take_output(),
        "Invalid Command$GpioLink;0.1.0;GL-EFCAFE$"
    );
    assert!(sink.saw("LineOverflow { discarded: 44 }"));
}

#[test]
fn invalid_utf8_does_not_kill_the_session() {
    let (mut session, net) = make_session(0);
    let mut sink = RecordingSink::new();
    let client = net.connect();
    session.poll(&mut sink);
    client.take_output();

    client.send_bytes(&[0xFF, 0xFE, b'\n']);
    client.send("ID?\n");
    session.poll(&mut sink);

    assert_eq!(
        client.take_output(),
        "Invalid Command$GpioLink;0.1.0;GL-EFCAFE$"
    );
}

// ── Disconnect handling ───────────────────────────────────────

#[test]
fn hang_up_discards_partial_line_and_queue() {
    let (mut session, net) = make_session(0);
    let mut sink = RecordingSink::new();
    let first = net.connect();
    session.poll(&mut sink);

    first.send("GPIO:OUT(1) 1");
    first.hang_up();
    session.poll(&mut sink);
    assert!(!session.is_connected());
    assert_eq!(session.buffered_len(), 0);
    assert_eq!(session.pending_len(), 0);

    // The next peer's newline must not complete the old fragment.
    let second = net.connect();
    second.send("\nGPIO:OUT(1)?\n");
    session.poll(&mut sink);
    assert_eq!(second.take_output(), format!("{NOTICE}Invalid Command$0.0000$"));
}

#[test]
fn write_failure_drops_the_peer() {
    let (mut session, net) = make_session(0);
    let mut sink = RecordingSink::new();
    let client = net.connect();
    session.poll(&mut sink);

    client.fail_writes();
    client.send("ID?\nHELP?\n");
    session.poll(&mut sink);

    assert!(!session.is_connected());
    assert!(client.is_closed());
    assert_eq!(session.pending_len(), 0);
    assert!(sink.saw("PeerDisconnected { reason: WriteFailed }"));
}

#[test]
fn local_disconnect_closes_the_peer() {
    let (mut session, net) = make_session(0);
    let mut sink = RecordingSink::new();
    let client = net.connect();
    session.poll(&mut sink);
    client.send("GPIO:");
    session.poll(&mut sink);

    session.disconnect(&mut sink);

    assert!(!session.is_connected());
    assert!(client.is_closed());
    assert_eq!(session.buffered_len(), 0);
    assert!(sink.saw("PeerDisconnected { reason: Local }"));

    // Idempotent.
    session.disconnect(&mut sink);
    assert_eq!(sink.count("PeerDisconnected"), 1);
}

#[test]
fn outputs_outlive_the_session() {
    let (mut session, net) = make_session(0);
    let mut sink = RecordingSink::new();
    let first = net.connect();
    first.send("GPIO:OUT(2) 0.2\n");
    session.poll(&mut sink);
    first.hang_up();
    session.poll(&mut sink);

    let second = net.connect();
    second.send("GPIO:OUT(2)?\n");
    session.poll(&mut sink);
    assert_eq!(second.take_output(), format!("{NOTICE}0.2000$"));
}
