//! Outbound diagnostic events.
//!
//! The session, dispatcher and WiFi bring-up emit these through the
//! [`EventSink`](super::ports::EventSink) port. Events borrow their text
//! from the caller so emitting never allocates.

use core::fmt;
use std::net::SocketAddr;

/// Why a connected peer was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisconnectReason {
    /// The peer closed its end (EOF).
    Closed,
    /// A read from the peer failed.
    ReadFailed,
    /// A write to the peer failed.
    WriteFailed,
    /// The control loop dropped the session (e.g. link loss).
    Local,
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "closed by peer"),
            Self::ReadFailed => write!(f, "read failed"),
            Self::WriteFailed => write!(f, "write failed"),
            Self::Local => write!(f, "dropped locally"),
        }
    }
}

/// Structured events emitted by the command server core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent<'a> {
    /// The TCP listener is bound and accepting.
    Listening { port: u16 },

    /// A peer was admitted as the session owner.
    PeerAccepted { addr: Option<SocketAddr> },

    /// A connection attempt arrived while a peer was active and was closed.
    PeerRejected { addr: Option<SocketAddr> },

    /// The session peer went away; buffered input was discarded.
    PeerDisconnected { reason: DisconnectReason },

    /// Accepting a pending connection failed at the socket layer.
    AcceptFailed,

    /// A complete command line was assembled.
    CommandReceived(&'a str),

    /// A command did not match the grammar.
    InvalidCommand(&'a str),

    /// A line exceeded the receive buffer and was discarded.
    LineOverflow { discarded: usize },

    /// A framed response was written to the peer.
    ResponseSent(&'a str),

    /// An output channel was given a new PWM count.
    OutputChanged { channel: usize, count: u16 },

    /// A WiFi connection attempt is starting.
    LinkConnecting { ssid: &'a str, attempt: u8 },

    /// The WiFi link is up.
    LinkUp { attempts: u8 },

    /// Every bring-up attempt failed.
    LinkFailed { attempts: u8 },

    /// The WiFi link dropped while the server was running.
    LinkLost,
}
