//! Device identity derived from the ESP32 factory MAC address.
//!
//! Produces a stable serial in the form `GL-XXYYZZ` (last 3 bytes of the
//! 6-byte MAC in uppercase hex). It is deterministic across reboots and is
//! reported as the third field of the `*IDN?` reply.

use core::fmt::Write;

/// Fixed-size serial string: "GL-XXYYZZ".
pub type SerialString = heapless::String<16>;

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    // SAFETY: `mac` is a valid 6-byte buffer, the size the call writes.
    let ret = unsafe { esp_idf_sys::esp_efuse_mac_get_default(mac.as_mut_ptr()) };
    if ret != esp_idf_sys::ESP_OK {
        log::warn!("device_id: eFuse MAC read failed ({})", ret);
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

/// Derive the serial from the last 3 MAC bytes, e.g. `GL-EFCAFE`.
pub fn serial(mac: &MacAddress) -> SerialString {
    let mut id = SerialString::new();
    let _ = write!(id, "GL-{:02X}{:02X}{:02X}", mac[3], mac[4], mac[5]);
    id
}
