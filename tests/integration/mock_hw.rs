//! Mock adapters for integration tests.
//!
//! `MockHardware` records every PWM write so tests can assert on the full
//! output history without touching real GPIO/PWM registers. `MockNetwork`
//! hands out in-memory peers whose far ends (`MockClient`) the test drives.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::rc::Rc;

use gpiolink::app::events::AppEvent;
use gpiolink::app::ports::{EventSink, InputPort, PwmPort};
use gpiolink::app::registers::{RegisterLayout, RegisterModel};
use gpiolink::protocol::dispatcher::{Dispatcher, Identity};
use gpiolink::protocol::session::Session;
use gpiolink::protocol::transport::{Listener, Peer, TransportError};

pub const ACCEPT_NOTICE: &str = "ESP32 Server: Connection Accepted";

// ── MockHardware ──────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MockHardware {
    /// Input levels, input 0 = bit 0.
    pub inputs: u32,
    /// Number of `read_pin` calls.
    pub reads: usize,
    /// Every `(channel, count)` written, in order.
    pub writes: Vec<(usize, u16)>,
}

#[allow(dead_code)]
impl MockHardware {
    pub fn with_inputs(inputs: u32) -> Self {
        Self {
            inputs,
            ..Self::default()
        }
    }

    /// Last count written to `channel`.
    pub fn last_count(&self, channel: usize) -> Option<u16> {
        self.writes
            .iter()
            .rev()
            .find(|(ch, _)| *ch == channel)
            .map(|&(_, count)| count)
    }
}

impl InputPort for MockHardware {
    fn read_pin(&mut self, id: usize) -> bool {
        self.reads += 1;
        self.inputs & (1 << id) != 0
    }
}

impl PwmPort for MockHardware {
    fn write_pwm(&mut self, channel: usize, count: u16) {
        self.writes.push((channel, count));
    }
}

pub fn layout() -> RegisterLayout {
    RegisterLayout {
        inputs: 4,
        outputs: 3,
        resolution_bits: 8,
    }
}

pub fn identity() -> Identity {
    Identity::new("GpioLink", "0.1.0", "GL-EFCAFE")
}

pub fn make_dispatcher(inputs: u32) -> Dispatcher<MockHardware> {
    Dispatcher::new(
        RegisterModel::new(MockHardware::with_inputs(inputs), layout()),
        identity(),
    )
}

// ── RecordingSink ─────────────────────────────────────────────

/// Event sink that keeps the `Debug` rendering of every event.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<String>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any recorded event starts with `prefix`.
    pub fn saw(&self, prefix: &str) -> bool {
        self.events.iter().any(|e| e.starts_with(prefix))
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.events.iter().filter(|e| e.starts_with(prefix)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent<'_>) {
        self.events.push(format!("{event:?}"));
    }
}

// ── In-memory transport ───────────────────────────────────────

#[derive(Debug, Default)]
struct Link {
    /// Bytes the client sent that the server hasn't read yet.
    to_server: VecDeque<u8>,
    /// Bytes the server wrote.
    to_client: Vec<u8>,
    client_hung_up: bool,
    server_closed: bool,
    fail_writes: bool,
}

/// Server-side end handed out by [`MockListener`].
pub struct MockPeer {
    link: Rc<RefCell<Link>>,
    addr: SocketAddr,
}

impl Peer for MockPeer {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, TransportError> {
        let mut link = self.link.borrow_mut();
        if link.server_closed {
            return Err(TransportError::Closed);
        }
        if link.to_server.is_empty() {
            return if link.client_hung_up {
                Err(TransportError::Closed)
            } else {
                Ok(0)
            };
        }
        let n = buf.len().min(link.to_server.len());
        for (slot, byte) in buf.iter_mut().zip(link.to_server.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn write_all(&mut self, data: &[u8]) -> Result<(), TransportError> {
        let mut link = self.link.borrow_mut();
        if link.server_closed || link.client_hung_up {
            return Err(TransportError::Closed);
        }
        if link.fail_writes {
            return Err(TransportError::Io);
        }
        link.to_client.extend_from_slice(data);
        Ok(())
    }

    fn is_open(&mut self) -> bool {
        let link = self.link.borrow();
        !link.server_closed && !(link.client_hung_up && link.to_server.is_empty())
    }

    fn remote_addr(&self) -> Option<SocketAddr> {
        Some(self.addr)
    }

    fn close(&mut self) {
        self.link.borrow_mut().server_closed = true;
    }
}

/// Test-side end of one connection.
pub struct MockClient {
    link: Rc<RefCell<Link>>,
}

#[allow(dead_code)]
impl MockClient {
    pub fn send(&self, data: &str) {
        self.link.borrow_mut().to_server.extend(data.bytes());
    }

    pub fn send_bytes(&self, data: &[u8]) {
        self.link.borrow_mut().to_server.extend(data.iter().copied());
    }

    /// Everything the server wrote since the last call.
    pub fn take_output(&self) -> String {
        let bytes = std::mem::take(&mut self.link.borrow_mut().to_client);
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub fn hang_up(&self) {
        self.link.borrow_mut().client_hung_up = true;
    }

    pub fn fail_writes(&self) {
        self.link.borrow_mut().fail_writes = true;
    }

    /// Whether the server closed its end.
    pub fn is_closed(&self) -> bool {
        self.link.borrow().server_closed
    }

    /// Bytes sent but not yet read by the server.
    pub fn unread(&self) -> usize {
        self.link.borrow().to_server.len()
    }
}

type Backlog = Rc<RefCell<VecDeque<Result<MockPeer, TransportError>>>>;

/// Listener fed by [`MockNetwork::connect`].
pub struct MockListener {
    backlog: Backlog,
}

impl Listener for MockListener {
    type Peer = MockPeer;

    fn accept(&mut self) -> Result<Option<MockPeer>, TransportError> {
        self.backlog.borrow_mut().pop_front().transpose()
    }
}

/// Handle for queueing inbound connections.
#[derive(Clone)]
pub struct MockNetwork {
    backlog: Backlog,
    next_port: Rc<RefCell<u16>>,
}

#[allow(dead_code)]
impl MockNetwork {
    pub fn new() -> (Self, MockListener) {
        let backlog = Backlog::default();
        let net = Self {
            backlog: Rc::clone(&backlog),
            next_port: Rc::new(RefCell::new(50_000)),
        };
        (net, MockListener { backlog })
    }

    /// Queue a new inbound connection and return its client end.
    pub fn connect(&self) -> MockClient {
        let link = Rc::new(RefCell::new(Link::default()));
        let mut port = self.next_port.borrow_mut();
        *port += 1;
        let peer = MockPeer {
            link: Rc::clone(&link),
            addr: SocketAddr::from(([192, 168, 1, 50], *port)),
        };
        self.backlog.borrow_mut().push_back(Ok(peer));
        MockClient { link }
    }

    /// Make the next accept fail at the socket layer.
    pub fn fail_accept(&self) {
        self.backlog
            .borrow_mut()
            .push_back(Err(TransportError::Io));
    }
}

pub type TestSession = Session<MockListener, MockHardware>;

pub fn make_session(inputs: u32) -> (TestSession, MockNetwork) {
    let (net, listener) = MockNetwork::new();
    let session = Session::new(listener, make_dispatcher(inputs), ACCEPT_NOTICE);
    (session, net)
}
