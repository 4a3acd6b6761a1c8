//! Frame assembly for the SeaTalk byte stream.
//!
//! SeaTalk has no start delimiter, length field or checksum. A frame is a
//! command byte followed by exactly as many payload bytes as the
//! [`CommandTable`] says. The assembler is a two-state machine fed one byte
//! at a time:
//!
//! ```text
//!            0x00 (idle)
//!            ┌──────┐
//!            ▼      │
//!   ┌────────────────┐  command byte   ┌────────────┐
//!   │ WaitForStart   │ ──────────────► │ InMessage  │ ◄─┐ payload byte
//!   └────────────────┘                 └────────────┘ ──┘ (len < expected)
//!            ▲                               │
//!            └───────────────────────────────┘
//!                 len == expected: emit Message
//! ```
//!
//! There is no resynchronisation. If bytes are lost mid-frame the assembler
//! keeps counting the following bytes (including `0x00`) as payload until the
//! expected length is reached.

use serde::Serialize;

use crate::command::{Command, CommandTable, IDLE_BYTE};

// =============================================================================
// Message
// =============================================================================

/// One complete SeaTalk frame: command byte plus its payload.
///
/// Immutable once assembled. The payload excludes the command byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    command: u8,
    payload: Vec<u8>,
}

impl Message {
    pub fn new(command: u8, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            command,
            payload: payload.into(),
        }
    }

    pub fn command(&self) -> u8 {
        self.command
    }

    /// The command as a known [`Command`], if it is one
    pub fn known_command(&self) -> Option<Command> {
        Command::from_byte(self.command)
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Hex dump of the whole frame, command byte first: `"01 00 0A 00"`
    pub fn to_hex(&self) -> String {
        format_frame_hex(self.command, &self.payload)
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "cmd={:#04X} data={}",
            self.command,
            format_hex(&self.payload)
        )
    }
}

/// Space separated upper case hex, `[0x00, 0x0A]` → `"00 0A"`
pub fn format_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Hex dump of a command byte followed by its payload
pub fn format_frame_hex(command: u8, payload: &[u8]) -> String {
    let mut frame = Vec::with_capacity(payload.len() + 1);
    frame.push(command);
    frame.extend_from_slice(payload);
    format_hex(&frame)
}

// =============================================================================
// Parser State
// =============================================================================

/// Which half of the state machine the assembler is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ParseMode {
    /// Between frames; `0x00` is skipped, anything else starts a frame
    #[default]
    WaitForStart,
    /// Collecting payload bytes for `command`
    InMessage,
}

impl std::fmt::Display for ParseMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseMode::WaitForStart => write!(f, "waiting for start"),
            ParseMode::InMessage => write!(f, "in message"),
        }
    }
}

/// Everything the assembler remembers between bytes.
///
/// `ParserState::default()` is the state right after construction and
/// right after every completed frame.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParserState {
    pub mode: ParseMode,
    pub command: u8,
    pub expected_length: u8,
    pub payload: Vec<u8>,
}

/// Counters kept beside the parser state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssemblerStats {
    /// Frames completed
    pub frames: u64,
    /// Frames started with a command missing from the table
    pub unknown_commands: u64,
    /// `0x00` bytes skipped while waiting for a command
    pub idle_bytes: u64,
}

// =============================================================================
// Frame Assembler
// =============================================================================

/// Byte-by-byte SeaTalk frame reassembler.
///
/// Not `Sync` in spirit: `feed` takes `&mut self` and must only ever be
/// driven from one task.
#[derive(Debug, Clone, Default)]
pub struct FrameAssembler {
    table: CommandTable,
    state: ParserState,
    stats: AssemblerStats,
}

impl FrameAssembler {
    /// Assembler using the standard command table
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(table: CommandTable) -> Self {
        Self {
            table,
            state: ParserState::default(),
            stats: AssemblerStats::default(),
        }
    }

    pub fn table(&self) -> &CommandTable {
        &self.table
    }

    /// Snapshot of the in-progress frame
    pub fn parser_state(&self) -> ParserState {
        self.state.clone()
    }

    pub fn stats(&self) -> AssemblerStats {
        self.stats
    }

    /// True while no frame is in progress
    pub fn is_idle(&self) -> bool {
        self.state.mode == ParseMode::WaitForStart
    }

    /// Feed one byte.
    ///
    /// Returns `Some(message)` on the byte that completes a frame and
    /// `None` otherwise.
    pub fn feed(&mut self, byte: u8) -> Option<Message> {
        match self.state.mode {
            ParseMode::WaitForStart => {
                if byte == IDLE_BYTE {
                    self.stats.idle_bytes += 1;
                    return None;
                }

                let lookup = self.table.lookup(byte);
                if !lookup.known {
                    self.stats.unknown_commands += 1;
                    log::warn!(
                        "Unknown command {:#04X}, assuming {} payload bytes",
                        byte,
                        lookup.len
                    );
                }
                log::trace!("Started message: cmd={:#04X}, len={}", byte, lookup.len);

                self.state.command = byte;
                self.state.expected_length = lookup.len;
                self.state.payload.clear();
                self.state.mode = ParseMode::InMessage;
                None
            }
            ParseMode::InMessage => {
                self.state.payload.push(byte);
                if self.state.payload.len() < self.state.expected_length as usize {
                    return None;
                }

                let finished = std::mem::take(&mut self.state);
                self.stats.frames += 1;
                let message = Message {
                    command: finished.command,
                    payload: finished.payload,
                };
                log::debug!("SeaTalk message: {}", message);
                Some(message)
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(assembler: &mut FrameAssembler, bytes: &[u8]) -> Vec<Message> {
        bytes.iter().filter_map(|&b| assembler.feed(b)).collect()
    }

    #[test]
    fn test_every_known_command_completes_on_last_byte() {
        for command in Command::ALL {
            let mut assembler = FrameAssembler::new();
            let len = command.payload_len();

            assert_eq!(assembler.feed(command.byte()), None);
            for i in 0..len - 1 {
                assert_eq!(assembler.feed(0x10 + i), None, "{} early", command);
            }
            let message = assembler.feed(0x7F).expect("frame should complete");

            assert_eq!(message.command(), command.byte());
            assert_eq!(message.payload().len(), len as usize);
            assert_eq!(*message.payload().last().unwrap(), 0x7F);
        }
    }

    #[test]
    fn test_idle_bytes_are_skipped() {
        let mut assembler = FrameAssembler::new();
        for _ in 0..5 {
            assert_eq!(assembler.feed(0x00), None);
        }
        assert!(assembler.is_idle());
        assert_eq!(assembler.parser_state(), ParserState::default());
        assert_eq!(assembler.stats().idle_bytes, 5);
        assert_eq!(assembler.stats().frames, 0);
    }

    #[test]
    fn test_depth_frame() {
        let mut assembler = FrameAssembler::new();
        let messages = feed_all(&mut assembler, &[0x01, 0x00, 0x0A, 0x00]);
        assert_eq!(messages, vec![Message::new(0x01, [0x00, 0x0A, 0x00])]);
    }

    #[test]
    fn test_unknown_command_uses_default_length() {
        let mut assembler = FrameAssembler::new();
        let messages = feed_all(&mut assembler, &[0x99, 0x01, 0x02, 0x01, 0x03, 0x04]);

        assert_eq!(messages, vec![Message::new(0x99, [0x01, 0x02])]);
        // 0x01 started a fresh depth frame with two of three bytes so far
        let state = assembler.parser_state();
        assert_eq!(state.mode, ParseMode::InMessage);
        assert_eq!(state.command, 0x01);
        assert_eq!(state.expected_length, 3);
        assert_eq!(state.payload, vec![0x03, 0x04]);
        assert_eq!(assembler.stats().unknown_commands, 1);
    }

    #[test]
    fn test_state_resets_after_each_frame() {
        let mut assembler = FrameAssembler::new();
        feed_all(&mut assembler, &[0x21, 0x01, 0x02]);
        assert_eq!(assembler.parser_state(), ParserState::default());

        feed_all(&mut assembler, &[0x00, 0x30, 0x05]);
        assert_eq!(assembler.parser_state(), ParserState::default());
        assert_eq!(assembler.stats().frames, 2);
    }

    #[test]
    fn test_parser_state_is_a_snapshot() {
        let mut assembler = FrameAssembler::new();
        assembler.feed(0x01);
        let before = assembler.parser_state();

        assembler.feed(0x00);
        assert!(before.payload.is_empty());
        assert_eq!(assembler.parser_state().payload, vec![0x00]);
        assert_eq!(before.mode, ParseMode::InMessage);
        assert_eq!(before.expected_length, 3);
    }

    #[test]
    fn test_no_resync_on_idle_byte_mid_frame() {
        let mut assembler = FrameAssembler::new();

        // Truncated depth frame: only one payload byte arrives
        assert_eq!(assembler.feed(0x01), None);
        assert_eq!(assembler.feed(0x00), None);

        // The idle byte and the next "command" are swallowed as payload
        assert_eq!(assembler.feed(0x00), None);
        let message = assembler.feed(0x21).expect("depth frame completes");
        assert_eq!(message, Message::new(0x01, [0x00, 0x00, 0x21]));
        assert_eq!(assembler.stats().idle_bytes, 0);
    }

    #[test]
    fn test_stuck_frame_never_completes() {
        let mut assembler = FrameAssembler::with_table(
            CommandTable::with_overrides([(0x42, 200)]).unwrap(),
        );
        assert_eq!(assembler.feed(0x42), None);
        for _ in 0..199 {
            assert_eq!(assembler.feed(0x00), None);
        }
        assert_eq!(assembler.parser_state().mode, ParseMode::InMessage);
        assert_eq!(assembler.parser_state().payload.len(), 199);
        assert!(assembler.feed(0x00).is_some());
    }

    #[test]
    fn test_table_override_changes_framing() {
        let mut assembler =
            FrameAssembler::with_table(CommandTable::with_overrides([(0x30, 2)]).unwrap());
        let messages = feed_all(&mut assembler, &[0x30, 0x0E, 0x10]);
        assert_eq!(messages, vec![Message::new(0x30, [0x0E, 0x10])]);
    }

    #[test]
    fn test_message_formatting() {
        let message = Message::new(0x01, [0x00, 0x0A, 0x00]);
        assert_eq!(message.to_hex(), "01 00 0A 00");
        assert_eq!(message.to_string(), "cmd=0x01 data=00 0A 00");
        assert_eq!(message.known_command(), Some(Command::Depth));
        assert_eq!(format_hex(&[]), "");
        assert_eq!(format_frame_hex(0x99, &[]), "99");
        assert_eq!(format_frame_hex(0x21, &[0x00, 0x64]), "21 00 64");
    }
}
