//! Command grammar — parses a line once into a tagged [`Command`].
//!
//! ```text
//! HELP?                       → Help
//! *IDN? | ID?                 → Identify
//! GPIO:IN?                    → InputQuery
//! GPIO:OUT(<n>)?              → OutputQuery
//! GPIO:OUT(<n>) [<value>]     → OutputWrite
//! anything else               → Invalid
//! ```
//!
//! Matching is case-sensitive and looks at the first three tokens only.
//! Numbers are parsed leniently: anything unparseable becomes zero.

use core::str::FromStr;

use super::tokenizer::{COMMAND_DELIMITERS, tokenize};

const OUTPUT_PREFIX: &str = "OUT(";
const QUERY_SUFFIX: &str = ")?";
const WRITE_SUFFIX: &str = ")";

/// Parse `text`, falling back to `T::default()` when it does not parse.
///
/// This leniency is part of the wire contract: `OUT(x)?` addresses
/// channel 0 and a write of `abc` sets duty 0.0.
pub fn parse_or_default<T: FromStr + Default>(text: &str) -> T {
    text.parse().unwrap_or_default()
}

/// Channel number as written by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelArg<'a> {
    /// Leniently parsed index.
    pub index: u32,
    /// Text between `OUT(` and the closing `)`, echoed in error replies.
    pub raw: &'a str,
}

impl<'a> ChannelArg<'a> {
    fn new(raw: &'a str) -> Self {
        Self {
            index: parse_or_default(raw),
            raw,
        }
    }
}

/// A parsed protocol command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command<'a> {
    /// `HELP?`
    Help,
    /// `*IDN?` or `ID?`
    Identify,
    /// `GPIO:IN?`
    InputQuery,
    /// `GPIO:OUT(<n>)?`
    OutputQuery { channel: ChannelArg<'a> },
    /// `GPIO:OUT(<n>) <value>`; `value` is `None` when the third token is
    /// absent.
    OutputWrite {
        channel: ChannelArg<'a>,
        value: Option<f32>,
    },
    /// Anything the grammar does not recognise.
    Invalid { raw: &'a str },
}

impl<'a> Command<'a> {
    /// Tokenize and classify one command line.
    pub fn parse(line: &'a str) -> Self {
        let tokens = tokenize(line, COMMAND_DELIMITERS);
        match tokens.as_slice() {
            ["HELP?", ..] => Self::Help,
            ["*IDN?" | "ID?", ..] => Self::Identify,
            ["GPIO", sub, rest @ ..] => Self::parse_gpio(line, *sub, rest),
            _ => Self::Invalid { raw: line },
        }
    }

    fn parse_gpio(line: &'a str, sub: &'a str, rest: &[&'a str]) -> Self {
        if sub == "IN?" {
            return Self::InputQuery;
        }
        let Some(arg) = sub.strip_prefix(OUTPUT_PREFIX) else {
            return Self::Invalid { raw: line };
        };
        if let Some(raw) = arg.strip_suffix(QUERY_SUFFIX) {
            return Self::OutputQuery {
                channel: ChannelArg::new(raw),
            };
        }
        if let Some(raw) = arg.strip_suffix(WRITE_SUFFIX) {
            return Self::OutputWrite {
                channel: ChannelArg::new(raw),
                value: rest.first().map(|v| parse_or_default(v)),
            };
        }
        Self::Invalid { raw: line }
    }
}
