//! Decoded readings and the quantities they measure.

use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::decoders;
use crate::error::{ConfigError, DecodeError};

// =============================================================================
// Quantity
// =============================================================================

/// One kind of instrument reading, tied to the command that carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantity {
    Depth,
    Speed,
    WindAngle,
    WindSpeed,
    Heading,
    Temperature,
    LogTotal,
}

impl Quantity {
    pub const ALL: [Quantity; 7] = [
        Quantity::Depth,
        Quantity::Speed,
        Quantity::WindAngle,
        Quantity::WindSpeed,
        Quantity::Heading,
        Quantity::Temperature,
        Quantity::LogTotal,
    ];

    pub fn command(self) -> Command {
        match self {
            Quantity::Depth => Command::Depth,
            Quantity::Speed => Command::SpeedThroughWater,
            Quantity::WindAngle => Command::ApparentWindAngle,
            Quantity::WindSpeed => Command::ApparentWindSpeed,
            Quantity::Heading => Command::CompassHeading,
            Quantity::Temperature => Command::WaterTemperature,
            Quantity::LogTotal => Command::TotalLog,
        }
    }

    /// Payload bytes the formula reads.
    ///
    /// Checked independently of the command table, so a table that frames
    /// a command shorter than this makes the decoder skip rather than read
    /// out of bounds.
    pub fn min_payload(self) -> usize {
        match self {
            Quantity::Depth => 3,
            Quantity::LogTotal => 3,
            _ => 2,
        }
    }

    /// Settings file key
    pub fn key(self) -> &'static str {
        match self {
            Quantity::Depth => "depth",
            Quantity::Speed => "speed",
            Quantity::WindAngle => "wind_angle",
            Quantity::WindSpeed => "wind_speed",
            Quantity::Heading => "heading",
            Quantity::Temperature => "temperature",
            Quantity::LogTotal => "log_total",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            Quantity::Depth => "m",
            Quantity::Speed | Quantity::WindSpeed => "kn",
            Quantity::WindAngle | Quantity::Heading => "°",
            Quantity::Temperature => "°C",
            Quantity::LogTotal => "nm",
        }
    }

    /// Decimals worth showing
    pub fn accuracy_decimals(self) -> usize {
        match self {
            Quantity::WindAngle => 0,
            _ => 1,
        }
    }

    /// Decode a payload already known to belong to this quantity's command
    pub fn decode(self, payload: &[u8]) -> Result<Reading, DecodeError> {
        Ok(match self {
            Quantity::Depth => Reading::Depth(decoders::decode_depth(payload)?),
            Quantity::Speed => Reading::Speed(decoders::decode_speed_through_water(payload)?),
            Quantity::WindAngle => Reading::WindAngle(decoders::decode_wind_angle(payload)?),
            Quantity::WindSpeed => Reading::WindSpeed(decoders::decode_wind_speed(payload)?),
            Quantity::Heading => Reading::Heading(decoders::decode_heading(payload)?),
            Quantity::Temperature => {
                Reading::Temperature(decoders::decode_water_temperature(payload)?)
            }
            Quantity::LogTotal => Reading::LogTotal(decoders::decode_total_log(payload)?),
        })
    }

    /// Like [`decode`](Self::decode) but checks the command byte first
    pub fn decode_message(self, command: u8, payload: &[u8]) -> Result<Reading, DecodeError> {
        let expected = self.command().byte();
        if command != expected {
            return Err(DecodeError::UnexpectedCommand {
                expected,
                actual: command,
            });
        }
        self.decode(payload)
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl std::str::FromStr for Quantity {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Quantity::ALL
            .into_iter()
            .find(|q| q.key() == s)
            .ok_or_else(|| ConfigError::UnknownSensor(s.to_string()))
    }
}

// =============================================================================
// Reading
// =============================================================================

/// A decoded value in the quantity's unit (see [`Quantity::unit`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "quantity", content = "value", rename_all = "snake_case")]
pub enum Reading {
    /// Metres below transducer
    Depth(f64),
    /// Speed through water, knots
    Speed(f64),
    /// Apparent wind angle, signed degrees
    WindAngle(i16),
    /// Apparent wind speed, knots
    WindSpeed(f64),
    /// Compass heading, degrees
    Heading(f64),
    /// Water temperature, °C
    Temperature(f64),
    /// Total log, nautical miles
    LogTotal(f64),
}

impl Reading {
    pub fn quantity(&self) -> Quantity {
        match self {
            Reading::Depth(_) => Quantity::Depth,
            Reading::Speed(_) => Quantity::Speed,
            Reading::WindAngle(_) => Quantity::WindAngle,
            Reading::WindSpeed(_) => Quantity::WindSpeed,
            Reading::Heading(_) => Quantity::Heading,
            Reading::Temperature(_) => Quantity::Temperature,
            Reading::LogTotal(_) => Quantity::LogTotal,
        }
    }

    pub fn value(&self) -> f64 {
        match *self {
            Reading::WindAngle(v) => v as f64,
            Reading::Depth(v)
            | Reading::Speed(v)
            | Reading::WindSpeed(v)
            | Reading::Heading(v)
            | Reading::Temperature(v)
            | Reading::LogTotal(v) => v,
        }
    }

    pub fn unit(&self) -> &'static str {
        self.quantity().unit()
    }
}

impl std::fmt::Display for Reading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let quantity = self.quantity();
        write!(
            f,
            "{}: {:.*} {}",
            quantity.command().name(),
            quantity.accuracy_decimals(),
            self.value(),
            quantity.unit()
        )
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_keys() {
        for quantity in Quantity::ALL {
            assert_eq!(quantity.key().parse::<Quantity>(), Ok(quantity));
        }
        assert_eq!(
            "rudder".parse::<Quantity>(),
            Err(ConfigError::UnknownSensor("rudder".to_string()))
        );
    }

    #[test]
    fn test_decode_message_checks_command() {
        assert_eq!(
            Quantity::WindSpeed.decode_message(0x22, &[0x00, 0x64]),
            Err(DecodeError::UnexpectedCommand {
                expected: 0x21,
                actual: 0x22
            })
        );
        assert_eq!(
            Quantity::WindSpeed.decode_message(0x21, &[0x00, 0x64]),
            Ok(Reading::WindSpeed(10.0))
        );
    }

    #[test]
    fn test_reading_display() {
        assert_eq!(Reading::WindAngle(-90).to_string(), "Apparent wind angle: -90 °");
        assert_eq!(Reading::Speed(10.0).to_string(), "Speed through water: 10.0 kn");
        assert_eq!(Reading::LogTotal(1.25).quantity(), Quantity::LogTotal);
    }

    #[test]
    fn test_reading_json() {
        let json = serde_json::to_value(Reading::Temperature(10.0)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"quantity": "temperature", "value": 10.0})
        );
        let json = serde_json::to_value(Reading::WindAngle(-4)).unwrap();
        assert_eq!(json, serde_json::json!({"quantity": "wind_angle", "value": -4}));
    }
}
