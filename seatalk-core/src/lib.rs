//! # SeaTalk Core
//!
//! Platform-independent decoder for the SeaTalk marine instrument bus.
//!
//! This crate contains pure framing and decoding logic with **zero I/O
//! dependencies**. A host reads bytes from whatever transport it has
//! (serial port, TCP bridge, capture file) and pushes them in one at a time.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  seatalk-core (no tokio, no serial port)                    │
//! │                                                             │
//! │  bytes ──► FrameAssembler ──► Message ──► Dispatcher        │
//! │               │                              │              │
//! │               ▼                              ▼              │
//! │          CommandTable               MessageListener ×N      │
//! │        (payload lengths)        (SensorDecoder → sink)      │
//! └─────────────────────────────────────────────────────────────┘
//!                              ▲
//!                 ┌────────────┴────────────┐
//!                 │  seatalk-server         │
//!                 │  (serial / TCP / file)  │
//!                 └─────────────────────────┘
//! ```
//!
//! ## Supported Instruments
//!
//! | Command | Quantity            | Unit |
//! |---------|---------------------|------|
//! | `0x01`  | Depth               | m    |
//! | `0x20`  | Apparent wind angle | °    |
//! | `0x21`  | Apparent wind speed | kn   |
//! | `0x22`  | Speed through water | kn   |
//! | `0x23`  | Water temperature   | °C   |
//! | `0x26`  | Total log           | nm   |
//! | `0x30`  | Compass heading     | °    |
//!
//! ## Key Modules
//!
//! - [`command`] - Command bytes and the payload length table
//! - [`frame`] - Byte-by-byte frame assembler
//! - [`dispatch`] - Listener registry
//! - [`decoders`] - Payload formulas and the [`SensorDecoder`] listener
//! - [`bus`] - Assembler and dispatcher wired together
//!
//! ## Example
//!
//! ```rust
//! use seatalk_core::{FrameAssembler, Message};
//!
//! let mut assembler = FrameAssembler::new();
//! let mut messages = Vec::new();
//! for byte in [0x00, 0x01, 0x00, 0x0A, 0x00] {
//!     if let Some(message) = assembler.feed(byte) {
//!         messages.push(message);
//!     }
//! }
//! assert_eq!(messages, vec![Message::new(0x01, [0x00, 0x0A, 0x00])]);
//!
//! let depth = seatalk_core::decoders::decode_depth(messages[0].payload()).unwrap();
//! assert!((depth - 0.3048).abs() < 1e-9);
//! ```

pub mod bus;
pub mod command;
pub mod decoders;
pub mod dispatch;
pub mod error;
pub mod frame;
pub mod reading;

// Re-export commonly used types
pub use bus::SeaTalkBus;
pub use command::{Command, CommandTable, Lookup, DEFAULT_PAYLOAD_LEN};
pub use decoders::{RawDataListener, ReadingSink, SensorDecoder};
pub use dispatch::{Dispatcher, MessageListener};
pub use error::{ConfigError, DecodeError};
pub use frame::{AssemblerStats, FrameAssembler, Message, ParseMode, ParserState};
pub use reading::{Quantity, Reading};
