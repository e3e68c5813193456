//! Port traits — the hexagonal boundary between the command server core and
//! the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ RegisterModel / Session (domain)
//! ```
//!
//! Driven adapters (GPIO inputs, PWM outputs, diagnostic sinks) implement
//! these traits. The domain consumes them via generics, so the core never
//! touches hardware directly and every test can substitute a mock.

use super::events::AppEvent;

// ───────────────────────────────────────────────────────────────
// Input port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port for the digital input lines.
pub trait InputPort {
    /// Sample input line `id` (protocol order, 0-based) once.
    ///
    /// No caching and no debouncing: every call reaches the pin.
    fn read_pin(&mut self, id: usize) -> bool;
}

// ───────────────────────────────────────────────────────────────
// PWM port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Write-side port for the PWM output channels.
pub trait PwmPort {
    /// Commit `count` (0..=MAX_COUNT) to output channel `channel`.
    fn write_pwm(&mut self, channel: usize, count: u16);
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → logging)
// ───────────────────────────────────────────────────────────────

/// Fire-and-forget diagnostic sink.
///
/// The core emits structured [`AppEvent`]s through this port; adapters
/// decide where they go. Implementations must not block and the core never
/// depends on an emit succeeding.
pub trait EventSink {
    fn emit(&mut self, event: &AppEvent<'_>);
}
