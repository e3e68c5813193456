//! WiFi station-mode adapter.
//!
//! Implements [`ConnectivityPort`], the boundary the firmware loop uses to
//! bring the link up, watch it, and tear it down.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: `BlockingWifi<EspWifi>` with a fixed
//!   IPv4 address on the station netif.
//! - **all other targets**: simulation with scripted failures and link
//!   loss for host-side tests.
//!
//! ## Retry policy
//!
//! The adapter makes exactly one attempt per [`connect`](ConnectivityPort::connect).
//! [`connect_with_retries`] wraps it in a bounded loop with a fixed delay.

use core::fmt;
use std::time::Duration;

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

// ───────────────────────────────────────────────────────────────
// Port trait
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectivityError {
    NoCredentials,
    InvalidSsid,
    InvalidPassword,
    ConnectionFailed,
    Driver,
}

impl fmt::Display for ConnectivityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoCredentials => write!(f, "no WiFi credentials configured"),
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)"),
            Self::ConnectionFailed => write!(f, "WiFi connection failed"),
            Self::Driver => write!(f, "WiFi driver error"),
        }
    }
}

pub trait ConnectivityPort {
    /// One association attempt. Returns once the link is up or the attempt
    /// has failed.
    fn connect(&mut self) -> Result<(), ConnectivityError>;
    fn disconnect(&mut self);
    fn is_connected(&self) -> bool;
}

/// Station IPv4 settings. DHCP is never used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticIp {
    pub address: [u8; 4],
    pub gateway: [u8; 4],
    pub prefix: u8,
}

// ───────────────────────────────────────────────────────────────
// Bounded retry
// ───────────────────────────────────────────────────────────────

/// Try to bring the link up at most `attempts` times, `delay_ms` apart.
///
/// Returns whether the link is up.
pub fn connect_with_retries(
    port: &mut impl ConnectivityPort,
    attempts: u8,
    delay_ms: u32,
    ssid: &str,
    sink: &mut impl EventSink,
) -> bool {
    for attempt in 1..=attempts {
        sink.emit(&AppEvent::LinkConnecting { ssid, attempt });
        match port.connect() {
            Ok(()) => {
                sink.emit(&AppEvent::LinkUp { attempts: attempt });
                return true;
            }
            Err(e) => warn!("WiFi: attempt {}/{} failed: {}", attempt, attempts, e),
        }
        if attempt < attempts && delay_ms > 0 {
            std::thread::sleep(Duration::from_millis(u64::from(delay_ms)));
        }
    }
    sink.emit(&AppEvent::LinkFailed { attempts });
    false
}

// ───────────────────────────────────────────────────────────────
// Validation
// ───────────────────────────────────────────────────────────────

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), ConnectivityError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(ConnectivityError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), ConnectivityError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(ConnectivityError::InvalidPassword);
    }
    Ok(())
}

// ───────────────────────────────────────────────────────────────
// WiFi adapter
// ───────────────────────────────────────────────────────────────

pub struct WifiAdapter {
    ssid: heapless::String<32>,
    password: heapless::String<64>,
    #[cfg(target_os = "espidf")]
    wifi: esp_impl::Wifi,
    #[cfg(not(target_os = "espidf"))]
    sim: SimLink,
}

impl WifiAdapter {
    /// Validate and store the network credentials used by the next
    /// [`connect`](ConnectivityPort::connect).
    pub fn set_credentials(&mut self, ssid: &str, password: &str) -> Result<(), ConnectivityError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        self.ssid.clear();
        self.ssid.push_str(ssid).map_err(|_| ConnectivityError::InvalidSsid)?;
        self.password.clear();
        self.password.push_str(password).map_err(|_| ConnectivityError::InvalidPassword)?;
        info!("WiFi: credentials set (SSID='{}')", self.ssid);
        Ok(())
    }

    pub fn ssid(&self) -> &str {
        &self.ssid
    }
}

impl ConnectivityPort for WifiAdapter {
    fn connect(&mut self) -> Result<(), ConnectivityError> {
        if self.ssid.is_empty() {
            return Err(ConnectivityError::NoCredentials);
        }
        if self.is_connected() {
            return Ok(());
        }
        info!("WiFi: connecting to '{}'", self.ssid);
        match self.platform_connect() {
            Ok(()) => {
                info!("WiFi: connected");
                Ok(())
            }
            Err(e) => {
                error!("WiFi: connection failed: {}", e);
                Err(e)
            }
        }
    }

    fn disconnect(&mut self) {
        self.platform_disconnect();
        info!("WiFi: disconnected");
    }

    fn is_connected(&self) -> bool {
        self.platform_is_connected()
    }
}

// ── ESP-IDF ───────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
mod esp_impl {
    use std::net::Ipv4Addr;

    use esp_idf_hal::modem::Modem;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::ipv4::{self, Mask, Subnet};
    use esp_idf_svc::netif::{EspNetif, NetifConfiguration, NetifStack};
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use esp_idf_svc::wifi::{BlockingWifi, EspWifi, WifiDriver};

    use super::{ConnectivityError, StaticIp};

    pub type Wifi = BlockingWifi<EspWifi<'static>>;

    pub fn new_driver(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
        ip: StaticIp,
    ) -> Result<Wifi, ConnectivityError> {
        let driver = WifiDriver::new(modem, sysloop.clone(), nvs).map_err(driver_err)?;

        let sta_conf = NetifConfiguration {
            ip_configuration: Some(ipv4::Configuration::Client(
                ipv4::ClientConfiguration::Fixed(ipv4::ClientSettings {
                    ip: Ipv4Addr::from(ip.address),
                    subnet: Subnet {
                        gateway: Ipv4Addr::from(ip.gateway),
                        mask: Mask(ip.prefix),
                    },
                    dns: None,
                    secondary_dns: None,
                }),
            )),
            ..NetifConfiguration::wifi_default_client()
        };
        let sta = EspNetif::new_with_conf(&sta_conf).map_err(driver_err)?;
        let ap = EspNetif::new(NetifStack::Ap).map_err(driver_err)?;

        let wifi = EspWifi::wrap_all(driver, sta, ap).map_err(driver_err)?;
        BlockingWifi::wrap(wifi, sysloop).map_err(driver_err)
    }

    fn driver_err(e: esp_idf_svc::sys::EspError) -> ConnectivityError {
        log::error!("WiFi(espidf): driver error: {}", e);
        ConnectivityError::Driver
    }
}

#[cfg(target_os = "espidf")]
impl WifiAdapter {
    /// Take the modem and configure the station netif with `ip`.
    pub fn new(
        modem: esp_idf_hal::modem::Modem,
        sysloop: esp_idf_svc::eventloop::EspSystemEventLoop,
        nvs: Option<esp_idf_svc::nvs::EspDefaultNvsPartition>,
        ip: StaticIp,
    ) -> Result<Self, ConnectivityError> {
        Ok(Self {
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            wifi: esp_impl::new_driver(modem, sysloop, nvs, ip)?,
        })
    }

    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        use esp_idf_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};

        let auth_method = if self.password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let conf = Configuration::Client(ClientConfiguration {
            ssid: self.ssid.as_str().try_into().map_err(|_| ConnectivityError::InvalidSsid)?,
            password: self
                .password
                .as_str()
                .try_into()
                .map_err(|_| ConnectivityError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        });

        let fail = |e: esp_idf_svc::sys::EspError| {
            warn!("WiFi(espidf): {}", e);
            ConnectivityError::ConnectionFailed
        };
        self.wifi.set_configuration(&conf).map_err(fail)?;
        if !self.wifi.is_started().unwrap_or(false) {
            self.wifi.start().map_err(fail)?;
        }
        self.wifi.connect().map_err(fail)?;
        self.wifi.wait_netif_up().map_err(fail)?;
        Ok(())
    }

    fn platform_disconnect(&mut self) {
        if let Err(e) = self.wifi.disconnect() {
            warn!("WiFi(espidf): disconnect: {}", e);
        }
    }

    fn platform_is_connected(&self) -> bool {
        self.wifi.is_connected().unwrap_or(false)
    }
}

// ── Simulation ────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Default)]
struct SimLink {
    up: bool,
    fail_next: u32,
    connect_calls: u32,
    static_ip: Option<StaticIp>,
}

#[cfg(not(target_os = "espidf"))]
impl WifiAdapter {
    pub fn new(ip: StaticIp) -> Self {
        Self {
            ssid: heapless::String::new(),
            password: heapless::String::new(),
            sim: SimLink {
                static_ip: Some(ip),
                ..SimLink::default()
            },
        }
    }

    /// Make the next `n` connection attempts fail.
    pub fn fail_next(&mut self, n: u32) {
        self.sim.fail_next = n;
    }

    /// Drop the link as if the access point went away.
    pub fn drop_link(&mut self) {
        warn!("WiFi(sim): link dropped");
        self.sim.up = false;
    }

    /// Number of association attempts made so far.
    pub fn connect_calls(&self) -> u32 {
        self.sim.connect_calls
    }

    pub fn static_ip(&self) -> Option<StaticIp> {
        self.sim.static_ip
    }

    fn platform_connect(&mut self) -> Result<(), ConnectivityError> {
        self.sim.connect_calls += 1;
        if self.sim.fail_next > 0 {
            self.sim.fail_next -= 1;
            warn!("WiFi(sim): simulated failure (attempt {})", self.sim.connect_calls);
            return Err(ConnectivityError::ConnectionFailed);
        }
        self.sim.up = true;
        info!("WiFi(sim): associated with '{}' as {:?}", self.ssid, self.sim.static_ip);
        Ok(())
    }

    fn platform_disconnect(&mut self) {
        self.sim.up = false;
    }

    fn platform_is_connected(&self) -> bool {
        self.sim.up
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
