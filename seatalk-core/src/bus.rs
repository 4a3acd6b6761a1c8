//! The receive side of a SeaTalk bus: assembler plus dispatcher.
//!
//! This is what a host drives from its read loop:
//!
//! ```rust
//! use seatalk_core::{decoders::SensorDecoder, Quantity, Reading, SeaTalkBus};
//!
//! let mut bus = SeaTalkBus::new();
//! bus.add_listener(SensorDecoder::new(Quantity::Depth, |r: Reading| {
//!     println!("{}", r);
//! }));
//!
//! for byte in [0x01, 0x00, 0x0A, 0x00] {
//!     bus.process_byte(byte);
//! }
//! ```

use crate::command::CommandTable;
use crate::dispatch::{Dispatcher, MessageListener};
use crate::frame::{AssemblerStats, FrameAssembler, Message};

#[derive(Debug, Default)]
pub struct SeaTalkBus {
    assembler: FrameAssembler,
    dispatcher: Dispatcher,
}

impl SeaTalkBus {
    /// Bus using the standard command table
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(table: CommandTable) -> Self {
        Self {
            assembler: FrameAssembler::with_table(table),
            dispatcher: Dispatcher::new(),
        }
    }

    pub fn add_listener<L>(&mut self, listener: L)
    where
        L: MessageListener + Send + 'static,
    {
        self.dispatcher.register(listener);
    }

    pub fn listener_count(&self) -> usize {
        self.dispatcher.len()
    }

    /// Feed one byte; dispatches and returns the message if it completed one
    pub fn process_byte(&mut self, byte: u8) -> Option<Message> {
        let message = self.assembler.feed(byte)?;
        self.dispatcher.dispatch(&message);
        Some(message)
    }

    /// Feed a chunk read from the transport, returning how many messages
    /// were dispatched
    pub fn process_bytes(&mut self, bytes: &[u8]) -> usize {
        bytes
            .iter()
            .filter(|&&b| self.process_byte(b).is_some())
            .count()
    }

    pub fn assembler(&self) -> &FrameAssembler {
        &self.assembler
    }

    pub fn stats(&self) -> AssemblerStats {
        self.assembler.stats()
    }
}
