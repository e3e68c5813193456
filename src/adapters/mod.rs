//! Adapters — concrete implementations of the port traits.
//!
//! | Adapter         | Implements             | Connects to              |
//! |-----------------|------------------------|--------------------------|
//! | `device_id`     | —                      | eFuse factory MAC        |
//! | `hardware`      | InputPort, PwmPort     | embedded-hal GPIO / PWM  |
//! | `log_sink`      | EventSink              | Serial log output        |
//! | `tcp_transport` | Listener, Peer         | lwIP / std TCP sockets   |
//! | `wifi`          | ConnectivityPort       | ESP-IDF WiFi STA         |

pub mod device_id;
pub mod hardware;
pub mod log_sink;
pub mod tcp_transport;
pub mod wifi;
