//! TCP transport adapter.
//!
//! Implements [`Listener`] and [`Peer`] over `std::net`, which ESP-IDF
//! backs with lwIP, so the same code runs on target and on the host.
//!
//! ## Connection model
//!
//! 1. [`TcpServer::bind`] binds `0.0.0.0:<port>` in non-blocking mode.
//! 2. [`accept`](Listener::accept) polls for one pending connection and
//!    returns `Ok(None)` when nobody is waiting.
//! 3. Peer reads are non-blocking: `Ok(0)` means no data, EOF is
//!    reported as [`TransportError::Closed`].
//! 4. Writes never wait. Whatever the socket buffer can't take is queued
//!    on the peer and pushed out before the next read. A peer that lets
//!    more than [`MAX_PENDING_WRITE`] bytes pile up is reported as
//!    [`TransportError::Io`].
//! 5. [`is_open`](Peer::is_open) peeks one byte to spot a hang-up
//!    without consuming input.

use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};

use log::{debug, info, warn};

use crate::protocol::transport::{Listener, Peer, TransportError};

/// Unsent bytes a peer may accumulate before it counts as stalled.
pub const MAX_PENDING_WRITE: usize = 4096;

// ───────────────────────────────────────────────────────────────
// TcpServer
// ───────────────────────────────────────────────────────────────

/// Non-blocking TCP listener.
pub struct TcpServer {
    listener: TcpListener,
}

impl TcpServer {
    /// Bind `0.0.0.0:<port>`.
    ///
    /// Pass port `0` to let the OS pick a free port (use
    /// [`local_addr()`](Self::local_addr) to discover it).
    pub fn bind(port: u16) -> Result<Self, TransportError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr).map_err(|e| {
            warn!("TCP: bind {} failed: {}", addr, e);
            TransportError::Bind
        })?;
        listener
            .set_nonblocking(true)
            .map_err(|_| TransportError::Bind)?;
        info!("TCP: listening on port {}", port);
        Ok(Self { listener })
    }

    /// The actual bound address.
    pub fn local_addr(&self) -> Result<SocketAddr, TransportError> {
        self.listener.local_addr().map_err(|_| TransportError::Io)
    }
}

impl Listener for TcpServer {
    type Peer = TcpPeer;

    fn accept(&mut self) -> Result<Option<TcpPeer>, TransportError> {
        match self.listener.accept() {
            Ok((stream, addr)) => {
                if stream.set_nonblocking(true).is_err() {
                    warn!("TCP: failed to set non-blocking on client socket");
                    return Err(TransportError::Io);
                }
                // Responses are small; don't let Nagle hold them back.
                if let Err(e) = stream.set_nodelay(true) {
                    debug!("TCP: set_nodelay on {} failed: {}", addr, e);
                }
                debug!("TCP: connection from {}", addr);
                Ok(Some(TcpPeer::new(stream, addr)))
            }
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => Ok(None),
            Err(e) => {
                warn!("TCP: accept error: {}", e);
                Err(TransportError::Io)
            }
        }
    }
}

// ───────────────────────────────────────────────────────────────
// TcpPeer
// ───────────────────────────────────────────────────────────────

/// One accepted TCP connection.
pub struct TcpPeer {
    stream: Option<TcpStream>,
    addr: SocketAddr,
    pending: Vec<u8>,
}

impl TcpPeer {
    fn new(stream: TcpStream, addr: SocketAddr) -> Self {
        Self {
            stream: Some(stream),
            addr,
            pending: Vec::new(),
        }
    }

    /// Bytes accepted by [`write_all`](Peer::write_all) but not yet handed
    /// to the socket.
    pub fn pending_write(&self) -> usize {
        self.pending.len()
    }

    /// Push queued bytes until the socket buffer is full.
    fn flush_pending(&mut self) -> Result<(), TransportError> {
        let stream = self.stream.as_mut().ok_or(TransportError::Closed)?;
        while !self.pending.is_empty() {
            match stream.write(&self.pending) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(n) => {
                    self.pending.drain(..n);
                }
                Err(ref e) if e.kind() == ErrorKind::WouldBlock => break,
                Err(ref e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    warn!("TCP: write to {} failed: {}", self.addr, e);
                    return Err(TransportError::Io);
                }
            }
        }
        Ok(())
    }
}

impl Peer for TcpPeer {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        self.flush_pending()?;
        let stream = self.stream.as_mut().ok_or(TransportError::Closed)?;
        match stream.read(buf) {
            Ok(0) => {
                info!("TCP: {} disconnected (EOF)", self.addr);
                Err(TransportError::Closed)
            }
            Ok(n) => Ok(n),
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => Ok(0),
            Err(ref e) if e.kind() == ErrorKind::Interrupted => Ok(0),
            Err(e) => {
                warn!("TCP: read from {} failed: {}", self.addr, e);
                Err(TransportError::Io)
            }
        }
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError> {
        if self.stream.is_none() {
            return Err(TransportError::Closed);
        }
        self.pending.extend_from_slice(data);
        self.flush_pending()?;
        if self.pending.len() > MAX_PENDING_WRITE {
            warn!(
                "TCP: {} stalled with {} bytes unsent",
                self.addr,
                self.pending.len()
            );
            return Err(TransportError::Io);
        }
        Ok(())
    }

    fn is_open(&mut self) -> bool {
        let Some(stream) = self.stream.as_ref() else {
            return false;
        };
        let mut byte = [0u8; 1];
        match stream.peek(&mut byte) {
            Ok(0) => false,
            Ok(_) => true,
            Err(ref e)
                if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) =>
            {
                true
            }
            Err(_) => false,
        }
    }

    fn remote_addr(&self) -> Option<SocketAddr> {
        Some(self.addr)
    }

    fn close(&mut self) {
        self.pending.clear();
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
            debug!("TCP: closed {}", self.addr);
        }
    }
}

impl Drop for TcpPeer {
    fn drop(&mut self) {
        self.close();
    }
}

// ───────────────────────────────────────────────────────────────
// Tests (loopback)
// ───────────────────────────────────────────────────────────────
