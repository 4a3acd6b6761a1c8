//! Error types for SeaTalk decoding and table configuration

use thiserror::Error;

/// Errors returned by the pure payload decode functions.
///
/// Listeners never propagate these: a decoder that gets one simply
/// skips its emission for that message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Payload is too short for the formula
    #[error("Payload too short: expected at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },

    /// Message carries a different command than the decoder handles
    #[error("Unexpected command: expected {expected:#04X}, got {actual:#04X}")]
    UnexpectedCommand { expected: u8, actual: u8 },
}

/// Errors raised while building a command table or parsing settings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// 0x00 is idle padding and can never start a frame
    #[error("Command 0x00 cannot be given a payload length")]
    IdleCommand,

    /// A frame must carry at least one payload byte
    #[error("Payload length for command {0:#04X} must be at least 1")]
    ZeroLength(u8),

    /// Command key in a settings file is not a byte value
    #[error("Invalid command byte: {0}")]
    InvalidCommand(String),

    /// Two settings keys name the same command byte
    #[error("Command {0:#04X} is given a payload length more than once")]
    DuplicateCommand(u8),

    /// Sensor key in a settings file names no known quantity
    #[error("Unknown sensor: {0}")]
    UnknownSensor(String),
}
