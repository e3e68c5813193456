//! Application core — pure domain logic, zero I/O.
//!
//! Holds the hardware register model and the port traits it is driven
//! through. All interaction with hardware happens through **port traits**
//! defined in [`ports`], keeping this layer fully testable without real
//! peripherals.

pub mod events;
pub mod ports;
pub mod registers;
