//! Reading sink for the server: log every reading, optionally print JSON.

use std::io::Write;

use serde::Serialize;

use seatalk_core::{Quantity, Reading, ReadingSink};

/// One line of `--output`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputLine {
    pub quantity: Quantity,
    pub value: f64,
    pub unit: &'static str,
}

impl From<Reading> for OutputLine {
    fn from(reading: Reading) -> Self {
        Self {
            quantity: reading.quantity(),
            value: reading.value(),
            unit: reading.unit(),
        }
    }
}

/// Publishes readings. Cheap to clone, one clone per decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct PublishSink {
    /// Also write JSON lines to stdout
    pub output: bool,
}

impl PublishSink {
    pub fn new(output: bool) -> Self {
        Self { output }
    }
}

impl ReadingSink for PublishSink {
    fn emit(&mut self, reading: Reading) {
        log::info!("{}", reading);
        if !self.output {
            return;
        }
        match serde_json::to_string(&OutputLine::from(reading)) {
            Ok(line) => {
                let mut stdout = std::io::stdout().lock();
                if let Err(e) = writeln!(stdout, "{}", line) {
                    log::warn!("Cannot write reading to stdout: {}", e);
                }
            }
            Err(e) => log::warn!("Cannot serialize {}: {}", reading, e),
        }
    }
}
