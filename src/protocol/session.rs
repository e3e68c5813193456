//! Session manager — single-peer admission and the per-pass pipeline.
//!
//! ```text
//!  Listener ─accept─▶ ┌──────────────────────────────────────────┐
//!                     │ Session                                  │
//!      Peer ─bytes──▶ │  LineAssembler ─▶ pending (FIFO)         │
//!                     │                      │                   │
//!      Peer ◀─frame── │  framing ◀─ Dispatcher ◀┘                │
//!                     └──────────────────────────────────────────┘
//! ```
//!
//! Two states: **Disconnected** (no peer) and **Connected**. Every
//! [`poll`](Session::poll) pass runs three steps in order and never blocks:
//!
//! 1. accept-or-reject every pending connection (a peer that has already
//!    hung up does not hold the slot),
//! 2. drain all available bytes from the peer into the pending queue,
//! 3. dispatch the whole queue, writing one framed response per command.

use std::collections::VecDeque;

use log::{info, warn};

use crate::app::events::{AppEvent, DisconnectReason};
use crate::app::ports::{EventSink, InputPort, PwmPort};

use super::dispatcher::{Dispatcher, ProtocolError};
use super::framing::frame;
use super::line::{AssembledLine, LineAssembler};
use super::transport::{Listener, Peer, TransportError};

const READ_CHUNK: usize = 128;

/// The single command session and the listener that feeds it.
pub struct Session<L: Listener, H> {
    listener: L,
    peer: Option<L::Peer>,
    assembler: LineAssembler,
    pending: VecDeque<AssembledLine>,
    dispatcher: Dispatcher<H>,
    accept_notice: String,
}

impl<L: Listener, H: InputPort + PwmPort> Session<L, H> {
    /// Create a disconnected session.
    pub fn new(listener: L, dispatcher: Dispatcher<H>, accept_notice: &str) -> Self {
        Self {
            listener,
            peer: None,
            assembler: LineAssembler::new(),
            pending: VecDeque::new(),
            dispatcher,
            accept_notice: accept_notice.to_owned(),
        }
    }

    /// Run one non-blocking processing pass.
    pub fn poll(&mut self, sink: &mut impl EventSink) {
        self.admit(sink);
        if self.peer.is_some() {
            self.receive(sink);
        }
        self.process(sink);
    }

    /// Drop the current peer (if any) and discard buffered input.
    pub fn disconnect(&mut self, sink: &mut impl EventSink) {
        self.drop_peer(DisconnectReason::Local, sink);
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn is_connected(&self) -> bool {
        self.peer.is_some()
    }

    /// Commands assembled but not yet dispatched.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Bytes of an unterminated line held in the receive buffer.
    pub fn buffered_len(&self) -> usize {
        self.assembler.buffered()
    }

    pub fn dispatcher(&self) -> &Dispatcher<H> {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher<H> {
        &mut self.dispatcher
    }

    pub fn listener(&self) -> &L {
        &self.listener
    }

    // ── Step 1: admission ─────────────────────────────────────

    fn admit(&mut self, sink: &mut impl EventSink) {
        loop {
            let mut incoming = match self.listener.accept() {
                Ok(Some(peer)) => peer,
                Ok(None) => return,
                Err(e) => {
                    warn!("session: accept failed: {}", e);
                    sink.emit(&AppEvent::AcceptFailed);
                    return;
                }
            };

            let addr = incoming.remote_addr();
            if self.peer.as_mut().is_some_and(|peer| !peer.is_open()) {
                // The old peer hung up since the last read; free the slot.
                self.drop_peer(DisconnectReason::Closed, sink);
            }
            if self.peer.is_some() {
                incoming.close();
                sink.emit(&AppEvent::PeerRejected { addr });
                continue;
            }

            self.assembler.reset();
            self.pending.clear();
            let notice = frame(&self.accept_notice);
            if incoming.write_all(notice.as_bytes()).is_err() {
                warn!("session: peer dropped before accept notice");
                incoming.close();
                continue;
            }
            info!("session: peer admitted");
            sink.emit(&AppEvent::PeerAccepted { addr });
            self.peer = Some(incoming);
        }
    }

    // ── Step 2: receive ───────────────────────────────────────

    fn receive(&mut self, sink: &mut impl EventSink) {
        let mut buf = [0u8; READ_CHUNK];
        loop {
            let Some(peer) = self.peer.as_mut() else {
                return;
            };
            match peer.read(&mut buf) {
                Ok(0) => return,
                Ok(n) => {
                    for &byte in &buf[..n] {
                        if let Some(line) = self.assembler.feed(byte) {
                            self.pending.push_back(line);
                        }
                    }
                }
                Err(TransportError::Closed) => {
                    self.drop_peer(DisconnectReason::Closed, sink);
                    return;
                }
                Err(_) => {
                    self.drop_peer(DisconnectReason::ReadFailed, sink);
                    return;
                }
            }
        }
    }

    // ── Step 3: dispatch ──────────────────────────────────────

    fn process(&mut self, sink: &mut impl EventSink) {
        while let Some(item) = self.pending.pop_front() {
            let response = match &item {
                AssembledLine::Command(line) => {
                    sink.emit(&AppEvent::CommandReceived(line));
                    self.dispatcher.dispatch(line, sink)
                }
                AssembledLine::Overflow { discarded } => {
                    sink.emit(&AppEvent::LineOverflow {
                        discarded: *discarded,
                    });
                    ProtocolError::InvalidCommand.into()
                }
            };

            let framed = frame(&response.payload());
            let Some(peer) = self.peer.as_mut() else {
                // Peer vanished mid-pass; nobody to answer.
                self.pending.clear();
                return;
            };
            if peer.write_all(framed.as_bytes()).is_err() {
                self.drop_peer(DisconnectReason::WriteFailed, sink);
                return;
            }
            sink.emit(&AppEvent::ResponseSent(&framed));
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn drop_peer(&mut self, reason: DisconnectReason, sink: &mut impl EventSink) {
        if let Some(mut peer) = self.peer.take() {
            peer.close();
            sink.emit(&AppEvent::PeerDisconnected { reason });
        }
        self.assembler.reset();
        self.pending.clear();
    }
}
