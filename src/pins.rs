//! GPIO / peripheral pin assignments for the GpioLink board.
//!
//! Single source of truth — the firmware entry point and config
//! validation reference this module rather than hard-coding pin numbers.

// ---------------------------------------------------------------------------
// Digital inputs (ESP32 input-only pins, no internal pull-ups)
// ---------------------------------------------------------------------------

/// Input lines in protocol bit order: index 0 is reported as bit 0 (LSB).
pub const INPUT_GPIOS: [i32; 4] = [36, 39, 34, 35];

// ---------------------------------------------------------------------------
// PWM outputs (LEDC)
// ---------------------------------------------------------------------------

/// Output channels in protocol order: `OUT(0)` drives the first entry.
pub const OUTPUT_GPIOS: [i32; 3] = [25, 26, 27];

/// Highest LEDC duty resolution the embedded-hal duty API can express.
pub const MAX_PWM_RESOLUTION_BITS: u8 = 14;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// On-board LED: HIGH while the WiFi link is up.
pub const LINK_STATUS_LED_GPIO: i32 = 2;
