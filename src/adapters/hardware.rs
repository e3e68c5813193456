//! Hardware adapter — bridges real pins to the domain port traits.
//!
//! Generic over the `embedded-hal` 1.0 traits, so the same adapter drives
//! `esp-idf-hal` `PinDriver` / `LedcDriver` on target and plain mocks in
//! tests. This is the only place that touches pin drivers.
//!
//! PWM counts are handed to the driver as the fraction
//! `count / max_count`, so whatever maximum duty the LEDC timer was
//! configured with is respected.

use embedded_hal::digital::InputPin;
use embedded_hal::pwm::SetDutyCycle;
use log::warn;

use crate::app::ports::{InputPort, PwmPort};

/// Concrete adapter owning the input and PWM output pins.
pub struct HalHardware<I, P> {
    inputs: Vec<I>,
    outputs: Vec<P>,
    max_count: u16,
}

impl<I, P> HalHardware<I, P>
where
    I: InputPin,
    P: SetDutyCycle,
{
    /// `max_count` is the register model's full-scale count
    /// (`2^resolution - 1`).
    pub fn new(inputs: Vec<I>, outputs: Vec<P>, max_count: u16) -> Self {
        Self {
            inputs,
            outputs,
            max_count: max_count.max(1),
        }
    }

    pub fn input_count(&self) -> usize {
        self.inputs.len()
    }

    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// Output driver `channel` (for inspection in tests).
    pub fn output(&self, channel: usize) -> Option<&P> {
        self.outputs.get(channel)
    }
}

// ── InputPort implementation ──────────────────────────────────

impl<I, P> InputPort for HalHardware<I, P>
where
    I: InputPin,
    P: SetDutyCycle,
{
    fn read_pin(&mut self, id: usize) -> bool {
        let Some(pin) = self.inputs.get_mut(id) else {
            return false;
        };
        match pin.is_high() {
            Ok(level) => level,
            Err(e) => {
                warn!("HW: input {} read failed: {:?}", id, e);
                false
            }
        }
    }
}

// ── PwmPort implementation ────────────────────────────────────

impl<I, P> PwmPort for HalHardware<I, P>
where
    I: InputPin,
    P: SetDutyCycle,
{
    fn write_pwm(&mut self, channel: usize, count: u16) {
        let Some(pwm) = self.outputs.get_mut(channel) else {
            warn!("HW: no PWM output {}", channel);
            return;
        };
        let count = count.min(self.max_count);
        if let Err(e) = pwm.set_duty_cycle_fraction(count, self.max_count) {
            warn!("HW: PWM {} write failed: {:?}", channel, e);
        }
    }
}
