//! Integration tests for the Dispatcher → RegisterModel → PwmPort chain.
//!
//! These verify that a command line ends up as the right PWM writes and
//! input samples on the hardware port.

use gpiolink::protocol::dispatcher::Response;

use crate::mock_hw::{RecordingSink, make_dispatcher};

#[test]
fn write_recommits_every_channel() {
    let mut d = make_dispatcher(0);
    let mut sink = RecordingSink::new();

    assert_eq!(d.dispatch("GPIO:OUT(1) 0.5", &mut sink), Response::Ack);

    let hw = d.registers().hardware();
    assert_eq!(hw.writes, vec![(0, 0), (1, 127), (2, 0)]);
    assert_eq!(sink.events, vec!["OutputChanged { channel: 1, count: 127 }"]);
}

#[test]
fn out_of_range_values_are_clamped() {
    let mut d = make_dispatcher(0);
    let mut sink = RecordingSink::new();

    d.dispatch("GPIO:OUT(0) 7.5", &mut sink);
    assert_eq!(d.registers().hardware().last_count(0), Some(255));
    assert_eq!(d.dispatch("GPIO:OUT(0)?", &mut sink).payload(), "1.0000");

    d.dispatch("GPIO:OUT(0) -3", &mut sink);
    assert_eq!(d.registers().hardware().last_count(0), Some(0));
    assert_eq!(d.dispatch("GPIO:OUT(0)?", &mut sink).payload(), "0.0000");
}

#[test]
fn unparseable_value_writes_zero() {
    let mut d = make_dispatcher(0);
    let mut sink = RecordingSink::new();
    d.dispatch("GPIO:OUT(2) 1", &mut sink);

    assert_eq!(d.dispatch("GPIO:OUT(2) abc", &mut sink), Response::Ack);
    assert_eq!(d.registers().hardware().last_count(2), Some(0));
}

#[test]
fn repeated_write_is_idempotent() {
    let mut d = make_dispatcher(0);
    let mut sink = RecordingSink::new();

    d.dispatch("GPIO:OUT(1) 0.33", &mut sink);
    let first = d.dispatch("GPIO:OUT(1)?", &mut sink).payload();
    d.dispatch("GPIO:OUT(1) 0.33", &mut sink);
    assert_eq!(d.dispatch("GPIO:OUT(1)?", &mut sink).payload(), first);
}

#[test]
fn input_query_samples_every_pin_each_time() {
    let mut d = make_dispatcher(0b0011);
    let mut sink = RecordingSink::new();

    assert_eq!(d.dispatch("GPIO:IN?", &mut sink).payload(), "3");
    assert_eq!(d.registers().hardware().reads, 4);

    d.registers_mut().hardware_mut().inputs = 0b1100;
    assert_eq!(d.dispatch("GPIO IN?", &mut sink).payload(), "12");
    assert_eq!(d.registers().hardware().reads, 8);
}

#[test]
fn rejected_commands_leave_outputs_alone() {
    let mut d = make_dispatcher(0);
    let mut sink = RecordingSink::new();

    for line in ["GPIO:OUT(3) 1", "GPIO:OUT(1)", "GPIO:OUT(1", "gpio:OUT(1) 1"] {
        assert_ne!(d.dispatch(line, &mut sink), Response::Ack, "{line}");
    }
    assert!(d.registers().hardware().writes.is_empty());
    assert_eq!(sink.count("InvalidCommand"), 2);
}
