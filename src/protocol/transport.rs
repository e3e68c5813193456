//! Transport abstraction — a non-blocking listener handing out
//! byte-oriented peers.
//!
//! Concrete implementations:
//! - TCP over WiFi ([`TcpServer`](crate::adapters::tcp_transport::TcpServer))
//! - in-memory mocks in the integration tests
//!
//! The [`Session`](super::session::Session) is generic over `Listener`, so
//! swapping the transport requires zero changes to the protocol logic.

use core::fmt;
use std::net::SocketAddr;

/// Errors originating from the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// The peer closed its end of the connection.
    Closed,
    /// Socket-level I/O failure.
    Io,
    /// The listener could not be bound.
    Bind,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Closed => write!(f, "peer closed the connection"),
            Self::Io => write!(f, "socket I/O error"),
            Self::Bind => write!(f, "could not bind listener"),
        }
    }
}

/// One connected remote peer.
pub trait Peer {
    /// Read up to `buf.len()` bytes.
    ///
    /// Returns `Ok(0)` when nothing is available (non-blocking) and
    /// `Err(TransportError::Closed)` once the peer has hung up.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError>;

    /// Write all of `data` to the peer.
    fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError>;

    /// Whether the peer is still there, without consuming any input.
    ///
    /// Returns `false` once the peer has hung up and nothing it sent is
    /// left unread.
    fn is_open(&mut self) -> bool;

    /// Remote address, when the transport has one.
    fn remote_addr(&self) -> Option<SocketAddr>;

    /// Close the connection. Further calls are no-ops.
    fn close(&mut self);
}

/// Source of inbound connections.
pub trait Listener {
    type Peer: Peer;

    /// Poll for a pending connection (non-blocking).
    ///
    /// Returns `Ok(None)` when nobody is waiting.
    fn accept(&mut self) -> Result<Option<Self::Peer>, TransportError>;
}
