//! System configuration parameters
//!
//! All tunable parameters for the GpioLink server. Defaults match the
//! reference deployment; WiFi credentials can be overridden at build time
//! with `GPIOLINK_WIFI_SSID` / `GPIOLINK_WIFI_PASSWORD`, and the whole
//! config can be replaced with a JSON document in `GPIOLINK_CONFIG_JSON`.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pins;

const DEFAULT_WIFI_SSID: &str = match option_env!("GPIOLINK_WIFI_SSID") {
    Some(ssid) => ssid,
    None => "VoltageLoop",
};

const DEFAULT_WIFI_PASSWORD: &str = match option_env!("GPIOLINK_WIFI_PASSWORD") {
    Some(password) => password,
    None => "Kirchhoff",
};

/// Core server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    // --- WiFi ---
    /// Access point SSID (1-32 printable ASCII bytes)
    pub wifi_ssid: heapless::String<32>,
    /// WPA2 passphrase (empty for open networks, else 8-64 bytes)
    pub wifi_password: heapless::String<64>,
    /// Fixed station address
    pub static_ip: [u8; 4],
    /// Default gateway
    pub gateway: [u8; 4],
    /// Subnet prefix length (24 = 255.255.255.0)
    pub subnet_prefix: u8,
    /// Connection attempts per bring-up before giving up
    pub wifi_connect_attempts: u8,
    /// Pause between connection attempts (milliseconds)
    pub wifi_retry_delay_ms: u32,

    // --- Server ---
    /// TCP listen port
    pub tcp_port: u16,
    /// Idle time between session passes (milliseconds)
    pub poll_interval_ms: u32,
    /// Notice sent to a freshly admitted peer
    pub accept_notice: heapless::String<64>,
    /// Device name reported by `*IDN?`
    pub device_name: heapless::String<32>,

    // --- I/O ---
    /// Number of digital inputs reported by `GPIO:IN?`
    pub input_count: u8,
    /// Number of PWM output channels
    pub output_count: u8,
    /// PWM duty resolution (bits); MAX_COUNT = 2^bits - 1
    pub pwm_resolution_bits: u8,
    /// PWM carrier frequency (Hz)
    pub pwm_frequency_hz: u32,
}

fn bounded<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            // WiFi
            wifi_ssid: bounded(DEFAULT_WIFI_SSID),
            wifi_password: bounded(DEFAULT_WIFI_PASSWORD),
            static_ip: [192, 168, 1, 100],
            gateway: [192, 168, 1, 1],
            subnet_prefix: 24,
            wifi_connect_attempts: 3,
            wifi_retry_delay_ms: 500,

            // Server
            tcp_port: 23,
            poll_interval_ms: 10,
            accept_notice: bounded("ESP32 Server: Connection Accepted"),
            device_name: bounded("GpioLink"),

            // I/O
            input_count: pins::INPUT_GPIOS.len() as u8,
            output_count: pins::OUTPUT_GPIOS.len() as u8,
            pwm_resolution_bits: 8,
            pwm_frequency_hz: 5_000,
        }
    }
}

impl ServerConfig {
    /// Decode a full configuration from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|_| Error::Config("malformed config JSON"))?;
        config.validate()?;
        Ok(config)
    }

    /// Range-check every field against the board's pin map.
    pub fn validate(&self) -> Result<()> {
        if self.wifi_ssid.is_empty() {
            return Err(Error::Config("wifi_ssid must not be empty"));
        }
        if self.subnet_prefix > 32 {
            return Err(Error::Config("subnet_prefix must be 0-32"));
        }
        if self.wifi_connect_attempts == 0 {
            return Err(Error::Config("wifi_connect_attempts must be at least 1"));
        }
        if self.tcp_port == 0 {
            return Err(Error::Config("tcp_port must be non-zero"));
        }
        if self.input_count == 0 || self.input_count as usize > pins::INPUT_GPIOS.len() {
            return Err(Error::Config("input_count exceeds wired input pins"));
        }
        if self.output_count == 0 || self.output_count as usize > pins::OUTPUT_GPIOS.len() {
            return Err(Error::Config("output_count exceeds wired output pins"));
        }
        if !(1..=pins::MAX_PWM_RESOLUTION_BITS).contains(&self.pwm_resolution_bits) {
            return Err(Error::Config("pwm_resolution_bits must be 1-14"));
        }
        if self.pwm_frequency_hz == 0 {
            return Err(Error::Config("pwm_frequency_hz must be non-zero"));
        }
        if self.device_name.contains(';') {
            return Err(Error::Config("device_name must not contain ';'"));
        }
        Ok(())
    }

    /// Largest PWM count for the configured resolution.
    pub fn max_count(&self) -> u16 {
        ((1u32 << self.pwm_resolution_bits) - 1) as u16
    }
}
