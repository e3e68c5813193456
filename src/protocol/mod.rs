//! Transport-agnostic line protocol.
//!
//! Text commands in, `$`-framed text responses out.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      Protocol Stack                          │
//! │                                                              │
//! │  ┌──────────┐   ┌──────────┐   ┌──────────┐   ┌───────────┐  │
//! │  │ Transport │──▶│   Line   │──▶│ Command  │──▶│ Dispatcher│  │
//! │  │ (trait)   │   │ assembler│   │ (parse)  │   │ → registers│ │
//! │  └──────────┘   └──────────┘   └──────────┘   └───────────┘  │
//! │       ▲                                             │        │
//! │       │              ┌──────────┐                   │        │
//! │       └──────────────│ Framing  │◀──────────────────┘        │
//! │                      └──────────┘                            │
//! │                  Session (admission + per-pass pipeline)     │
//! └──────────────────────────────────────────────────────────────┘
//! ```

pub mod command;
pub mod dispatcher;
pub mod framing;
pub mod line;
pub mod session;
pub mod tokenizer;
pub mod transport;
