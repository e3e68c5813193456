//! Link status LED driver.
//!
//! A single LED on an `embedded-hal` output pin: lit while the WiFi link
//! is up, dark otherwise. The driver remembers the last requested state so
//! repeated calls don't touch the pin.

use embedded_hal::digital::OutputPin;
use log::warn;

pub struct StatusLed<P> {
    pin: P,
    lit: bool,
}

impl<P: OutputPin> StatusLed<P> {
    /// Take the pin and drive it low.
    pub fn new(pin: P) -> Self {
        let mut led = Self { pin, lit: true };
        led.set(false);
        led
    }

    pub fn set(&mut self, lit: bool) {
        if lit == self.lit {
            return;
        }
        let result = if lit {
            self.pin.set_high()
        } else {
            self.pin.set_low()
        };
        match result {
            Ok(()) => self.lit = lit,
            Err(e) => warn!("LED: pin write failed: {:?}", e),
        }
    }

    pub fn on(&mut self) {
        self.set(true);
    }

    pub fn off(&mut self) {
        self.set(false);
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }
}
