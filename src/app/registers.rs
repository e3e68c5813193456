//! Hardware register model — the in-memory view of the I/O block.
//!
//! [`RegisterModel`] owns the hardware adapter and the per-channel PWM
//! counts. It is the only writer of output state; inputs are never cached
//! and are sampled from the adapter on every read.
//!
//! ```text
//!  InputPort ──▶ ┌───────────────────────┐
//!                │     RegisterModel      │
//!    PwmPort ◀── │  counts[C] · MAX_COUNT │
//!                └───────────────────────┘
//! ```

use super::ports::{InputPort, PwmPort};

/// A validated output channel index.
///
/// Only [`RegisterModel::channel`] hands these out, so every duty read or
/// write is against a channel that exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Channel(usize);

impl Channel {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Static shape of the I/O block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterLayout {
    /// Number of digital inputs (≤ 32).
    pub inputs: u8,
    /// Number of PWM output channels.
    pub outputs: u8,
    /// PWM duty resolution in bits (1..=16).
    pub resolution_bits: u8,
}

/// Owns the hardware adapter and the output duty counts.
pub struct RegisterModel<H> {
    hw: H,
    input_count: usize,
    counts: Vec<u16>,
    max_count: u16,
}

impl<H: InputPort + PwmPort> RegisterModel<H> {
    /// Build a model with every output at count 0.
    ///
    /// Does **not** touch the outputs; call [`commit_all`](Self::commit_all)
    /// once at boot to bring the hardware in line with the model.
    pub fn new(hw: H, layout: RegisterLayout) -> Self {
        let bits = u32::from(layout.resolution_bits.clamp(1, 16));
        Self {
            hw,
            input_count: usize::from(layout.inputs.min(32)),
            counts: vec![0; usize::from(layout.outputs)],
            max_count: ((1u32 << bits) - 1) as u16,
        }
    }

    // ── Inputs ────────────────────────────────────────────────

    /// Sample every input once and compose them, input 0 as the LSB.
    pub fn read_inputs(&mut self) -> u32 {
        (0..self.input_count).fold(0u32, |bits, id| {
            if self.hw.read_pin(id) {
                bits | (1 << id)
            } else {
                bits
            }
        })
    }

    // ── Outputs ───────────────────────────────────────────────

    /// Validate a protocol channel number.
    pub fn channel(&self, index: u32) -> Option<Channel> {
        let index = usize::try_from(index).ok()?;
        (index < self.counts.len()).then_some(Channel(index))
    }

    /// Duty cycle of `channel` as a fraction in [0.0, 1.0].
    pub fn duty(&self, channel: Channel) -> f32 {
        f32::from(self.counts[channel.0]) / f32::from(self.max_count)
    }

    /// Raw PWM count of `channel`.
    pub fn count(&self, channel: Channel) -> u16 {
        self.counts[channel.0]
    }

    /// Clamp `value` to [0.0, 1.0], store it as a truncated count, and
    /// commit every channel to the hardware. Returns the stored count.
    ///
    /// NaN is treated as 0.0.
    pub fn set_duty(&mut self, channel: Channel, value: f32) -> u16 {
        let value = if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) };
        let count = ((value * f32::from(self.max_count)) as u16).min(self.max_count);
        self.counts[channel.0] = count;
        self.commit_all();
        count
    }

    /// Push every stored count to the PWM port.
    pub fn commit_all(&mut self) {
        for (channel, &count) in self.counts.iter().enumerate() {
            self.hw.write_pwm(channel, count);
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn input_count(&self) -> usize {
        self.input_count
    }

    pub fn output_count(&self) -> usize {
        self.counts.len()
    }

    pub fn max_count(&self) -> u16 {
        self.max_count
    }

    /// Borrow the underlying adapter (test inspection).
    pub fn hardware(&self) -> &H {
        &self.hw
    }

    /// Mutably borrow the underlying adapter (test stimulus).
    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hw
    }
}
