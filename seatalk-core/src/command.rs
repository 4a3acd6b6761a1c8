//! SeaTalk command bytes and the payload length table.
//!
//! SeaTalk frames carry no length field. The only way to know where a frame
//! ends is to look the command byte up in a fixed table. Lengths here count
//! the payload bytes *after* the command byte.
//!
//! | Command | Meaning              | Payload length |
//! |---------|----------------------|----------------|
//! | `0x01`  | Depth                | 3              |
//! | `0x20`  | Apparent wind angle  | 2              |
//! | `0x21`  | Apparent wind speed  | 2              |
//! | `0x22`  | Speed through water  | 2              |
//! | `0x23`  | Water temperature    | 2              |
//! | `0x26`  | Total log            | 2              |
//! | `0x30`  | Compass heading      | 1              |
//! | other   |                      | 2 (default)    |

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// =============================================================================
// Constants
// =============================================================================

/// Payload length assumed for any command missing from the table
pub const DEFAULT_PAYLOAD_LEN: u8 = 2;

/// Idle padding byte, never a command
pub const IDLE_BYTE: u8 = 0x00;

// =============================================================================
// Known Commands
// =============================================================================

/// Commands this decoder knows the length of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Depth,
    ApparentWindAngle,
    ApparentWindSpeed,
    SpeedThroughWater,
    WaterTemperature,
    TotalLog,
    CompassHeading,
}

impl Command {
    pub const ALL: [Command; 7] = [
        Command::Depth,
        Command::ApparentWindAngle,
        Command::ApparentWindSpeed,
        Command::SpeedThroughWater,
        Command::WaterTemperature,
        Command::TotalLog,
        Command::CompassHeading,
    ];

    /// Wire value of the command byte
    pub fn byte(self) -> u8 {
        match self {
            Command::Depth => 0x01,
            Command::ApparentWindAngle => 0x20,
            Command::ApparentWindSpeed => 0x21,
            Command::SpeedThroughWater => 0x22,
            Command::WaterTemperature => 0x23,
            Command::TotalLog => 0x26,
            Command::CompassHeading => 0x30,
        }
    }

    pub fn from_byte(byte: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.byte() == byte)
    }

    /// Payload length in the standard table
    pub fn payload_len(self) -> u8 {
        match self {
            Command::Depth => 3,
            Command::ApparentWindAngle => 2,
            Command::ApparentWindSpeed => 2,
            Command::SpeedThroughWater => 2,
            Command::WaterTemperature => 2,
            Command::TotalLog => 2,
            Command::CompassHeading => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Command::Depth => "Depth",
            Command::ApparentWindAngle => "Apparent wind angle",
            Command::ApparentWindSpeed => "Apparent wind speed",
            Command::SpeedThroughWater => "Speed through water",
            Command::WaterTemperature => "Water temperature",
            Command::TotalLog => "Total log",
            Command::CompassHeading => "Compass heading",
        }
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({:#04X})", self.name(), self.byte())
    }
}

/// Parse a command byte written as `0x30`, `0X30` or plain decimal `48`.
pub fn parse_command_byte(s: &str) -> Result<u8, ConfigError> {
    let trimmed = s.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => trimmed.parse::<u8>(),
    };
    parsed.map_err(|_| ConfigError::InvalidCommand(s.to_string()))
}

// =============================================================================
// Command Table
// =============================================================================

/// Result of looking a command byte up in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lookup {
    /// Payload bytes expected after the command byte
    pub len: u8,
    /// False when `len` is the default for an unlisted command
    pub known: bool,
}

/// Immutable command → payload length map.
///
/// Built once at startup, then moved into the [`FrameAssembler`] that uses
/// it. There is no way to change an entry after construction.
///
/// [`FrameAssembler`]: crate::frame::FrameAssembler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTable {
    // 0 = not listed; zero lengths are rejected on construction
    lengths: [u8; 256],
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl CommandTable {
    /// The standard table for the supported instruments.
    pub fn standard() -> Self {
        let mut lengths = [0u8; 256];
        for command in Command::ALL {
            lengths[command.byte() as usize] = command.payload_len();
        }
        Self { lengths }
    }

    /// Standard table with some entries replaced or added.
    ///
    /// Used by hosts that need to correct a length for their installation.
    /// Fails on command `0x00` and on zero lengths.
    pub fn with_overrides<I>(overrides: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (u8, u8)>,
    {
        let mut table = Self::standard();
        for (command, len) in overrides {
            if command == IDLE_BYTE {
                return Err(ConfigError::IdleCommand);
            }
            if len == 0 {
                return Err(ConfigError::ZeroLength(command));
            }
            table.lengths[command as usize] = len;
        }
        Ok(table)
    }

    pub fn lookup(&self, command: u8) -> Lookup {
        match self.lengths[command as usize] {
            0 => Lookup {
                len: DEFAULT_PAYLOAD_LEN,
                known: false,
            },
            len => Lookup { len, known: true },
        }
    }

    /// Expected payload length, falling back to [`DEFAULT_PAYLOAD_LEN`]
    pub fn payload_len(&self, command: u8) -> u8 {
        self.lookup(command).len
    }

    pub fn is_known(&self, command: u8) -> bool {
        self.lookup(command).known
    }

    /// All listed (command, length) pairs in ascending command order
    pub fn entries(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.lengths
            .iter()
            .enumerate()
            .filter(|&(_, &len)| len != 0)
            .map(|(command, &len)| (command as u8, len))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_lengths() {
        let table = CommandTable::standard();
        assert_eq!(table.payload_len(0x01), 3);
        assert_eq!(table.payload_len(0x20), 2);
        assert_eq!(table.payload_len(0x21), 2);
        assert_eq!(table.payload_len(0x22), 2);
        assert_eq!(table.payload_len(0x23), 2);
        assert_eq!(table.payload_len(0x26), 2);
        assert_eq!(table.payload_len(0x30), 1);
        assert_eq!(table.entries().count(), 7);
    }

    #[test]
    fn test_unknown_command_defaults() {
        let table = CommandTable::standard();
        let lookup = table.lookup(0x99);
        assert_eq!(lookup.len, DEFAULT_PAYLOAD_LEN);
        assert!(!lookup.known);
        assert!(table.is_known(0x01));
    }

    #[test]
    fn test_command_round_trip() {
        for command in Command::ALL {
            assert_eq!(Command::from_byte(command.byte()), Some(command));
        }
        assert_eq!(Command::from_byte(0x99), None);
        assert_eq!(Command::Depth.to_string(), "Depth (0x01)");
    }

    #[test]
    fn test_overrides() {
        let table = CommandTable::with_overrides([(0x30, 2), (0x99, 4)]).unwrap();
        assert_eq!(table.payload_len(0x30), 2);
        assert_eq!(table.lookup(0x99), Lookup { len: 4, known: true });
        // Untouched entries keep their standard value
        assert_eq!(table.payload_len(0x01), 3);
    }

    #[test]
    fn test_overrides_rejected() {
        assert_eq!(
            CommandTable::with_overrides([(0x00, 2)]),
            Err(ConfigError::IdleCommand)
        );
        assert_eq!(
            CommandTable::with_overrides([(0x30, 0)]),
            Err(ConfigError::ZeroLength(0x30))
        );
    }

    #[test]
    fn test_parse_command_byte() {
        assert_eq!(parse_command_byte("0x30"), Ok(0x30));
        assert_eq!(parse_command_byte("0X1f"), Ok(0x1F));
        assert_eq!(parse_command_byte(" 48 "), Ok(48));
        assert!(parse_command_byte("0x100").is_err());
        assert!(parse_command_byte("depth").is_err());
    }
}
