//! Fuzz target: `Dispatcher::dispatch`
//!
//! Feeds arbitrary text through the parser and dispatcher against a
//! null register block and checks that duty cycles stay in range.
//!
//! cargo fuzz run fuzz_command_parser

#![no_main]

use gpiolink::app::events::AppEvent;
use gpiolink::app::ports::{EventSink, InputPort, PwmPort};
use gpiolink::app::registers::{RegisterLayout, RegisterModel};
use gpiolink::protocol::dispatcher::{Dispatcher, Identity};
use libfuzzer_sys::fuzz_target;

struct Null;

impl InputPort for Null {
    fn read_pin(&mut self, _id: usize) -> bool {
        true
    }
}

impl PwmPort for Null {
    fn write_pwm(&mut self, _channel: usize, count: u16) {
        assert!(count <= 255);
    }
}

impl EventSink for Null {
    fn emit(&mut self, _event: &AppEvent<'_>) {}
}

fuzz_target!(|data: &[u8]| {
    let Ok(text) = core::str::from_utf8(data) else {
        return;
    };
    let layout = RegisterLayout {
        inputs: 4,
        outputs: 3,
        resolution_bits: 8,
    };
    let mut dispatcher = Dispatcher::new(
        RegisterModel::new(Null, layout),
        Identity::new("GpioLink", "0.1.0", "GL-000000"),
    );

    for line in text.split('\n') {
        let _ = dispatcher.dispatch(line, &mut Null).payload();
    }
});
