//! Command dispatcher — executes parsed commands against the register model.
//!
//! The dispatcher has no protocol state of its own: every command is
//! evaluated independently, and the only mutable state it touches lives in
//! the [`RegisterModel`] it owns.
//!
//! ```text
//!   line ──▶ Command::parse ──▶ execute ──▶ Response
//!                                  │
//!                                  ▼
//!                            RegisterModel
//! ```

use core::fmt;

use log::debug;

use crate::app::events::AppEvent;
use crate::app::ports::{EventSink, InputPort, PwmPort};
use crate::app::registers::RegisterModel;

use super::command::{ChannelArg, Command};

/// Static command-tree help text returned by `HELP?`.
pub const HELP_TEXT: &str = "\
HELP?                 -> this help text
*IDN? | ID?           -> name;firmware-version;serial
GPIO:IN?              -> input states as an integer, input 0 = bit 0
GPIO:OUT(<n>)?        -> duty cycle of output n (0.0000-1.0000)
GPIO:OUT(<n>) <value> -> set duty cycle of output n (0.0-1.0, clamped)";

// ───────────────────────────────────────────────────────────────
// Identity
// ───────────────────────────────────────────────────────────────

/// Identification string returned by `*IDN?`: `name;version;serial`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity(String);

impl Identity {
    pub fn new(name: &str, version: &str, serial: &str) -> Self {
        Self(format!("{name};{version};{serial}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ───────────────────────────────────────────────────────────────
// Responses
// ───────────────────────────────────────────────────────────────

/// Recoverable protocol errors, answered to the peer as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// Unknown keyword or wrong command depth.
    InvalidCommand,
    /// Channel index outside `0..C`; carries the client's raw text.
    InvalidOutputNumber(String),
    /// A write named a valid channel but supplied no value.
    NoOutputValue,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCommand => write!(f, "Invalid Command"),
            Self::InvalidOutputNumber(raw) => write!(f, "Invalid Output Number: {raw}"),
            Self::NoOutputValue => write!(f, "No Output Value Detected"),
        }
    }
}

/// Outcome of one dispatched command, before framing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Query result or static text.
    Text(String),
    /// A write was applied. Carries no payload; only the frame terminator
    /// is sent.
    Ack,
    /// The command was rejected.
    Error(ProtocolError),
}

impl Response {
    /// Payload text as sent on the wire (without the frame terminator).
    pub fn payload(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Ack => String::new(),
            Self::Error(e) => e.to_string(),
        }
    }
}

impl From<ProtocolError> for Response {
    fn from(e: ProtocolError) -> Self {
        Self::Error(e)
    }
}

// ───────────────────────────────────────────────────────────────
// Dispatcher
// ───────────────────────────────────────────────────────────────

/// Evaluates commands against the hardware register model.
pub struct Dispatcher<H> {
    registers: RegisterModel<H>,
    identity: Identity,
}

impl<H: InputPort + PwmPort> Dispatcher<H> {
    pub fn new(registers: RegisterModel<H>, identity: Identity) -> Self {
        Self {
            registers,
            identity,
        }
    }

    /// Parse and execute one command line.
    pub fn dispatch(&mut self, line: &str, sink: &mut impl EventSink) -> Response {
        let command = Command::parse(line);
        debug!("dispatch: {:?}", command);
        self.execute(command, sink)
    }

    /// Execute an already-parsed command.
    pub fn execute(&mut self, command: Command<'_>, sink: &mut impl EventSink) -> Response {
        match command {
            Command::Help => Response::Text(HELP_TEXT.to_owned()),
            Command::Identify => Response::Text(self.identity.as_str().to_owned()),
            Command::InputQuery => Response::Text(self.registers.read_inputs().to_string()),
            Command::OutputQuery { channel } => match self.registers.channel(channel.index) {
                Some(ch) => Response::Text(format!("{:.4}", self.registers.duty(ch))),
                None => invalid_output(channel),
            },
            Command::OutputWrite { channel, value } => {
                let Some(ch) = self.registers.channel(channel.index) else {
                    return invalid_output(channel);
                };
                let Some(value) = value else {
                    return ProtocolError::NoOutputValue.into();
                };
                let count = self.registers.set_duty(ch, value);
                sink.emit(&AppEvent::OutputChanged {
                    channel: ch.index(),
                    count,
                });
                Response::Ack
            }
            Command::Invalid { raw } => {
                sink.emit(&AppEvent::InvalidCommand(raw));
                ProtocolError::InvalidCommand.into()
            }
        }
    }

    /// The register model (read-only).
    pub fn registers(&self) -> &RegisterModel<H> {
        &self.registers
    }

    /// The register model (for boot-time commit and test stimulus).
    pub fn registers_mut(&mut self) -> &mut RegisterModel<H> {
        &mut self.registers
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }
}

fn invalid_output(channel: ChannelArg<'_>) -> Response {
    ProtocolError::InvalidOutputNumber(channel.raw.to_owned()).into()
}
