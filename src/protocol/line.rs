//! Newline line assembler.
//!
//! Wire format:
//! ```text
//! ┌──────────────────────────────┬────┐
//! │ command text (≤ 256 B, \r ok) │ \n │
//! └──────────────────────────────┴────┘
//! ```
//!
//! The assembler accumulates incoming bytes and yields complete lines. This
//! handles partial reads gracefully — a single `Peer::read` may return part
//! of a line, a whole line, or several lines concatenated.
//!
//! The receive buffer is bounded. Once a line outgrows it, further bytes
//! are dropped until the next `\n`, which then yields
//! [`AssembledLine::Overflow`] so that exactly one item is produced per
//! newline.

/// Maximum buffered line length (protects against memory exhaustion).
pub const MAX_LINE_LEN: usize = 256;

const CR: u8 = b'\r';
const LF: u8 = b'\n';

/// Item produced by a newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssembledLine {
    /// A complete command line (may be empty).
    Command(String),
    /// A line that exceeded [`MAX_LINE_LEN`]; `discarded` counts the
    /// dropped bytes.
    Overflow { discarded: usize },
}

/// Streaming line assembler.
pub struct LineAssembler {
    buf: heapless::Vec<u8, MAX_LINE_LEN>,
    discarded: usize,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self {
            buf: heapless::Vec::new(),
            discarded: 0,
        }
    }

    /// Feed one received byte.
    ///
    /// Returns `Some` when `byte` terminated a line.
    pub fn feed(&mut self, byte: u8) -> Option<AssembledLine> {
        match byte {
            CR => None,
            LF => Some(self.take_line()),
            _ => {
                if self.discarded > 0 || self.buf.push(byte).is_err() {
                    self.discarded += 1;
                }
                None
            }
        }
    }

    /// Drop any partial line (e.g. after the peer disconnects).
    pub fn reset(&mut self) {
        self.buf.clear();
        self.discarded = 0;
    }

    /// Number of bytes currently buffered.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    fn take_line(&mut self) -> AssembledLine {
        let line = if self.discarded > 0 {
            AssembledLine::Overflow {
                discarded: self.discarded,
            }
        } else {
            AssembledLine::Command(String::from_utf8_lossy(&self.buf).into_owned())
        };
        self.reset();
        line
    }
}

impl Default for LineAssembler {
    fn default() -> Self {
        Self::new()
    }
}
