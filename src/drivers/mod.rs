//! Peripheral drivers.

pub mod status_led;
