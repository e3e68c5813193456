//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by rendering application events as tagged
//! lines on the `log` facade, which the ESP-IDF logger sends to UART.
//!
//! ```text
//! [TCP][LOG]: << GPIO:IN?
//! [TCP][LOG]: >> 5$
//! [WIFI][ERROR]: could not join 'VoltageLoop' after 3 attempts
//! ```

use log::{debug, error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent<'_>) {
        match event {
            AppEvent::Listening { port } => {
                info!("[TCP][LOG]: server listening on port {}", port);
            }
            AppEvent::PeerAccepted { addr } => match addr {
                Some(addr) => info!("[TCP][LOG]: client connected from {}", addr),
                None => info!("[TCP][LOG]: client connected"),
            },
            AppEvent::PeerRejected { addr } => match addr {
                Some(addr) => warn!("[TCP][WARN]: rejected {} (session busy)", addr),
                None => warn!("[TCP][WARN]: rejected connection (session busy)"),
            },
            AppEvent::PeerDisconnected { reason } => {
                info!("[TCP][LOG]: client disconnected ({})", reason);
            }
            AppEvent::AcceptFailed => {
                error!("[TCP][ERROR]: accept failed");
            }
            AppEvent::CommandReceived(line) => {
                info!("[TCP][LOG]: << {}", line);
            }
            AppEvent::InvalidCommand(line) => {
                warn!("[TCP][WARN]: invalid command: {:?}", line);
            }
            AppEvent::LineOverflow { discarded } => {
                warn!("[TCP][WARN]: line too long, {} bytes dropped", discarded);
            }
            AppEvent::ResponseSent(frame) => {
                info!("[TCP][LOG]: >> {}", frame);
            }
            AppEvent::OutputChanged { channel, count } => {
                debug!("[GPIO][LOG]: output {} = {}", channel, count);
            }
            AppEvent::LinkConnecting { ssid, attempt } => {
                info!("[WIFI][LOG]: connecting to '{}' (attempt {})", ssid, attempt);
            }
            AppEvent::LinkUp { attempts } => {
                info!("[WIFI][LOG]: connected after {} attempt(s)", attempts);
            }
            AppEvent::LinkFailed { attempts } => {
                error!("[WIFI][ERROR]: could not connect after {} attempts", attempts);
            }
            AppEvent::LinkLost => {
                error!("[WIFI][ERROR]: connection lost");
            }
        }
    }
}
