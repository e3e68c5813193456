//! GpioLink Firmware — Main Entry Point
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  WifiAdapter        TcpServer         HalHardware              │
//! │  (Connectivity)     (Listener)        (InputPort + PwmPort)    │
//! │  LogEventSink       StatusLed         device_id                │
//! │  (EventSink)        (link LED)        (serial)                 │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │  Session → LineAssembler → Dispatcher → RegisterModel  │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Control loop: link supervision · session pass · idle delay    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{AnyInputPin, Input, InputPin, PinDriver};
use esp_idf_hal::ledc::config::TimerConfig;
use esp_idf_hal::ledc::{LedcDriver, LedcTimerDriver, Resolution};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::units::Hertz;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use log::{info, warn};

use gpiolink::adapters::device_id;
use gpiolink::adapters::hardware::HalHardware;
use gpiolink::adapters::log_sink::LogEventSink;
use gpiolink::adapters::tcp_transport::TcpServer;
use gpiolink::adapters::wifi::{ConnectivityPort, StaticIp, WifiAdapter, connect_with_retries};
use gpiolink::app::events::AppEvent;
use gpiolink::app::ports::EventSink;
use gpiolink::app::registers::{RegisterLayout, RegisterModel};
use gpiolink::config::ServerConfig;
use gpiolink::error::Error;
use gpiolink::pins;
use gpiolink::drivers::status_led::StatusLed;
use gpiolink::protocol::dispatcher::{Dispatcher, Identity};
use gpiolink::protocol::session::Session;

/// Build-time whole-config override.
const CONFIG_JSON: Option<&str> = option_env!("GPIOLINK_CONFIG_JSON");

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  GpioLink v{}                      ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration ──────────────────────────────────────
    let config = load_config()?;
    let mut sink = LogEventSink::new();

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = match EspDefaultNvsPartition::take() {
        Ok(nvs) => Some(nvs),
        Err(e) => {
            warn!("NVS partition unavailable ({}), WiFi calibration won't persist", e);
            None
        }
    };

    // ── 3. Status LED + WiFi ──────────────────────────────────
    let mut led = StatusLed::new(PinDriver::output(peripherals.pins.gpio2)?);

    let mut wifi = WifiAdapter::new(
        peripherals.modem,
        sysloop,
        nvs,
        StaticIp {
            address: config.static_ip,
            gateway: config.gateway,
            prefix: config.subnet_prefix,
        },
    )
    .map_err(Error::from)?;
    wifi.set_credentials(&config.wifi_ssid, &config.wifi_password)
        .map_err(Error::from)?;
    let mut link_up = bring_up(&mut wifi, &config, &mut sink);
    led.set(link_up);

    // ── 4. Identity ───────────────────────────────────────────
    let serial = device_id::serial(&device_id::read_mac());
    let identity = Identity::new(&config.device_name, env!("CARGO_PKG_VERSION"), &serial);
    info!("Device: {}", identity.as_str());

    // ── 5. I/O pins ───────────────────────────────────────────
    // Order matches `pins::INPUT_GPIOS` / `pins::OUTPUT_GPIOS`.
    let mut inputs: Vec<PinDriver<'static, AnyInputPin, Input>> = vec![
        PinDriver::input(peripherals.pins.gpio36.downgrade_input())?,
        PinDriver::input(peripherals.pins.gpio39.downgrade_input())?,
        PinDriver::input(peripherals.pins.gpio34.downgrade_input())?,
        PinDriver::input(peripherals.pins.gpio35.downgrade_input())?,
    ];
    inputs.truncate(usize::from(config.input_count));

    let timer = LedcTimerDriver::new(
        peripherals.ledc.timer0,
        &TimerConfig::new()
            .frequency(Hertz(config.pwm_frequency_hz))
            .resolution(resolution(config.pwm_resolution_bits)),
    )?;
    let mut outputs = vec![
        LedcDriver::new(peripherals.ledc.channel0, &timer, peripherals.pins.gpio25)?,
        LedcDriver::new(peripherals.ledc.channel1, &timer, peripherals.pins.gpio26)?,
        LedcDriver::new(peripherals.ledc.channel2, &timer, peripherals.pins.gpio27)?,
    ];
    outputs.truncate(usize::from(config.output_count));
    info!(
        "I/O: inputs on GPIO {:?}, PWM on GPIO {:?} ({} bit @ {} Hz), link LED on GPIO{}",
        &pins::INPUT_GPIOS[..inputs.len()],
        &pins::OUTPUT_GPIOS[..outputs.len()],
        config.pwm_resolution_bits,
        config.pwm_frequency_hz,
        pins::LINK_STATUS_LED_GPIO,
    );

    let layout = RegisterLayout {
        inputs: config.input_count,
        outputs: config.output_count,
        resolution_bits: config.pwm_resolution_bits,
    };
    let hardware = HalHardware::new(inputs, outputs, config.max_count());
    let mut registers = RegisterModel::new(hardware, layout);
    // All outputs start at duty 0.
    registers.commit_all();

    // ── 6. Command server ─────────────────────────────────────
    let listener = TcpServer::bind(config.tcp_port).map_err(Error::from)?;
    sink.emit(&AppEvent::Listening { port: config.tcp_port });
    let mut session = Session::new(
        listener,
        Dispatcher::new(registers, identity),
        &config.accept_notice,
    );

    info!("Entering control loop (poll every {} ms)", config.poll_interval_ms);

    // ── 7. Control loop ───────────────────────────────────────
    loop {
        if !wifi.is_connected() {
            if link_up {
                sink.emit(&AppEvent::LinkLost);
                link_up = false;
                led.off();
            }
            session.disconnect(&mut sink);
            link_up = bring_up(&mut wifi, &config, &mut sink);
            led.set(link_up);
            if !link_up {
                FreeRtos::delay_ms(config.wifi_retry_delay_ms);
                continue;
            }
        }

        session.poll(&mut sink);
        FreeRtos::delay_ms(config.poll_interval_ms);
    }
}

fn load_config() -> Result<ServerConfig> {
    let config = match CONFIG_JSON {
        Some(json) => {
            info!("Config: using GPIOLINK_CONFIG_JSON override");
            ServerConfig::from_json(json)?
        }
        None => ServerConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn bring_up(wifi: &mut WifiAdapter, config: &ServerConfig, sink: &mut LogEventSink) -> bool {
    connect_with_retries(
        wifi,
        config.wifi_connect_attempts,
        config.wifi_retry_delay_ms,
        &config.wifi_ssid,
        sink,
    )
}

fn resolution(bits: u8) -> Resolution {
    match bits {
        1 => Resolution::Bits1,
        2 => Resolution::Bits2,
        3 => Resolution::Bits3,
        4 => Resolution::Bits4,
        5 => Resolution::Bits5,
        6 => Resolution::Bits6,
        7 => Resolution::Bits7,
        9 => Resolution::Bits9,
        10 => Resolution::Bits10,
        11 => Resolution::Bits11,
        12 => Resolution::Bits12,
        13 => Resolution::Bits13,
        14 => Resolution::Bits14,
        _ => Resolution::Bits8,
    }
}
