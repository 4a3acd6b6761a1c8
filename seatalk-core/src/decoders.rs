//! Payload decoders for the supported instruments.
//!
//! The `decode_*` functions are pure `&[u8]` → `Result<T>` conversions of a
//! payload (bytes after the command byte, `p0, p1, p2`). Each checks its own
//! minimum length and never looks at the command table.
//!
//! | Command | Quantity                  | Formula                                |
//! |---------|---------------------------|----------------------------------------|
//! | `0x01`  | Depth (m)                 | `((p0<<8)\|p1) * 0.1 * 0.3048`         |
//! | `0x20`  | Apparent wind angle (°)   | `p0*2 - 180`                           |
//! | `0x21`  | Apparent wind speed (kn)  | `((p0<<8)\|p1) * 0.1`                  |
//! | `0x22`  | Speed through water (kn)  | `(((p0 & 0x7F)<<8)\|p1) * 0.1`         |
//! | `0x23`  | Water temperature (°C)    | `((p0<<8)\|p1) * 0.1 - 10`             |
//! | `0x26`  | Total log (nm)            | `((p0<<16)\|(p1<<8)\|p2) * 0.1`        |
//! | `0x30`  | Compass heading (°)       | `((p0<<8)\|p1) * 0.1`                  |
//!
//! [`SensorDecoder`] wraps one quantity as a [`MessageListener`] that emits
//! into a [`ReadingSink`].

use crate::command::Command;
use crate::dispatch::MessageListener;
use crate::error::DecodeError;
use crate::frame::format_frame_hex;
use crate::reading::{Quantity, Reading};

/// Depth is transmitted in feet
pub const FEET_TO_METERS: f64 = 0.3048;

// =============================================================================
// Pure decode functions
// =============================================================================

fn require(payload: &[u8], expected: usize) -> Result<(), DecodeError> {
    if payload.len() < expected {
        return Err(DecodeError::TooShort {
            expected,
            actual: payload.len(),
        });
    }
    Ok(())
}

fn tenths(raw: u32) -> f64 {
    raw as f64 / 10.0
}

fn be16(hi: u8, lo: u8) -> u32 {
    ((hi as u32) << 8) | lo as u32
}

pub fn decode_depth(payload: &[u8]) -> Result<f64, DecodeError> {
    require(payload, 3)?;
    Ok(tenths(be16(payload[0], payload[1])) * FEET_TO_METERS)
}

pub fn decode_wind_angle(payload: &[u8]) -> Result<i16, DecodeError> {
    require(payload, 2)?;
    Ok(payload[0] as i16 * 2 - 180)
}

pub fn decode_wind_speed(payload: &[u8]) -> Result<f64, DecodeError> {
    require(payload, 2)?;
    Ok(tenths(be16(payload[0], payload[1])))
}

pub fn decode_speed_through_water(payload: &[u8]) -> Result<f64, DecodeError> {
    require(payload, 2)?;
    // top bit of p0 is a flag, not part of the value
    Ok(tenths(be16(payload[0] & 0x7F, payload[1])))
}

pub fn decode_water_temperature(payload: &[u8]) -> Result<f64, DecodeError> {
    require(payload, 2)?;
    Ok(tenths(be16(payload[0], payload[1])) - 10.0)
}

pub fn decode_total_log(payload: &[u8]) -> Result<f64, DecodeError> {
    require(payload, 3)?;
    let raw = ((payload[0] as u32) << 16) | be16(payload[1], payload[2]);
    Ok(tenths(raw))
}

pub fn decode_heading(payload: &[u8]) -> Result<f64, DecodeError> {
    require(payload, 2)?;
    Ok(tenths(be16(payload[0], payload[1])))
}

/// Decode any supported message, `None` for other commands or short payloads
pub fn decode(command: u8, payload: &[u8]) -> Option<Reading> {
    let command = Command::from_byte(command)?;
    let quantity = Quantity::ALL.into_iter().find(|q| q.command() == command)?;
    quantity.decode(payload).ok()
}

// =============================================================================
// Sinks and listeners
// =============================================================================

/// Where decoded readings go. One way: there is no failure path back.
pub trait ReadingSink {
    fn emit(&mut self, reading: Reading);
}

impl<F> ReadingSink for F
where
    F: FnMut(Reading),
{
    fn emit(&mut self, reading: Reading) {
        self(reading)
    }
}

/// Listener decoding one quantity and emitting it into a sink.
///
/// Stateless apart from the sink: every matching message produces a
/// reading, with no smoothing or filtering.
#[derive(Debug)]
pub struct SensorDecoder<S> {
    quantity: Quantity,
    sink: S,
}

impl<S: ReadingSink> SensorDecoder<S> {
    pub fn new(quantity: Quantity, sink: S) -> Self {
        Self { quantity, sink }
    }

    pub fn quantity(&self) -> Quantity {
        self.quantity
    }
}

impl<S: ReadingSink> MessageListener for SensorDecoder<S> {
    fn on_message(&mut self, command: u8, payload: &[u8]) {
        match self.quantity.decode_message(command, payload) {
            Ok(reading) => {
                log::debug!("{}", reading);
                self.sink.emit(reading);
            }
            Err(DecodeError::UnexpectedCommand { .. }) => {}
            Err(e) => {
                log::trace!("{}: skipped {:#04X}: {}", self.quantity, command, e);
            }
        }
    }
}

/// Listener emitting a hex dump of every message, command byte first.
pub struct RawDataListener<F> {
    emit: F,
}

impl<F: FnMut(String)> RawDataListener<F> {
    pub fn new(emit: F) -> Self {
        Self { emit }
    }
}

impl<F: FnMut(String)> MessageListener for RawDataListener<F> {
    fn on_message(&mut self, command: u8, payload: &[u8]) {
        (self.emit)(format_frame_hex(command, payload));
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_depth() {
        assert!(approx(decode_depth(&[0x00, 0x0A, 0x00]).unwrap(), 0.3048));
        assert!(approx(decode_depth(&[0x01, 0x00, 0xFF]).unwrap(), 7.80288));
    }

    #[test]
    fn test_wind_angle() {
        assert_eq!(decode_wind_angle(&[0x5A, 0x00]), Ok(0));
        assert_eq!(decode_wind_angle(&[0x00, 0x00]), Ok(-180));
        assert_eq!(decode_wind_angle(&[0xFF, 0x00]), Ok(330));
    }

    #[test]
    fn test_speeds() {
        assert!(approx(decode_wind_speed(&[0x00, 0x64]).unwrap(), 10.0));
        assert!(approx(decode_speed_through_water(&[0x00, 0x64]).unwrap(), 10.0));
        // flag bit is masked off for speed through water only
        assert!(approx(decode_speed_through_water(&[0x80, 0x64]).unwrap(), 10.0));
        assert!(approx(decode_wind_speed(&[0x80, 0x64]).unwrap(), 3286.8));
    }

    #[test]
    fn test_water_temperature() {
        assert!(approx(decode_water_temperature(&[0x00, 0xC8]).unwrap(), 10.0));
        assert!(approx(decode_water_temperature(&[0x00, 0x00]).unwrap(), -10.0));
    }

    #[test]
    fn test_total_log() {
        assert!(approx(decode_total_log(&[0x00, 0x00, 0x0A]).unwrap(), 1.0));
        assert!(approx(decode_total_log(&[0x01, 0x00, 0x00]).unwrap(), 6553.6));
    }

    #[test]
    fn test_heading() {
        assert!(approx(decode_heading(&[0x0E, 0x10]).unwrap(), 360.0));
    }

    #[test]
    fn test_short_payloads() {
        assert_eq!(
            decode_depth(&[0x00, 0x0A]),
            Err(DecodeError::TooShort {
                expected: 3,
                actual: 2
            })
        );
        assert!(decode_total_log(&[0x00, 0x0A]).is_err());
        assert!(decode_heading(&[0x05]).is_err());
        assert!(decode_wind_angle(&[]).is_err());
    }

    #[test]
    fn test_decode_dispatches_by_command() {
        assert_eq!(decode(0x21, &[0x00, 0x64]), Some(Reading::WindSpeed(10.0)));
        assert_eq!(decode(0x20, &[0x5A, 0x00]), Some(Reading::WindAngle(0)));
        assert_eq!(decode(0x99, &[0x00, 0x64]), None);
        assert_eq!(decode(0x01, &[0x00]), None);
    }

    #[test]
    fn test_sensor_decoder_filters() {
        let readings = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let readings = readings.clone();
            move |r: Reading| readings.lock().unwrap().push(r)
        };
        let mut decoder = SensorDecoder::new(Quantity::Temperature, sink);
        assert_eq!(decoder.quantity(), Quantity::Temperature);

        decoder.on_message(0x22, &[0x00, 0xC8]);
        decoder.on_message(0x23, &[0x00]);
        decoder.on_message(0x23, &[0x00, 0xC8]);

        assert_eq!(*readings.lock().unwrap(), vec![Reading::Temperature(10.0)]);
    }

    #[test]
    fn test_raw_data_listener() {
        let dumps = Arc::new(Mutex::new(Vec::new()));
        let mut listener = {
            let dumps = dumps.clone();
            RawDataListener::new(move |s: String| dumps.lock().unwrap().push(s))
        };
        listener.on_message(0x01, &[0x00, 0x0A, 0x00]);
        listener.on_message(0x99, &[]);
        assert_eq!(*dumps.lock().unwrap(), vec!["01 00 0A 00", "99"]);
    }
}
