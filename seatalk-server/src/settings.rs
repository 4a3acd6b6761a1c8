//! Settings file for a SeaTalk installation.
//!
//! ```json
//! {
//!   "sensors": ["depth", "wind_angle", "wind_speed"],
//!   "lengths": { "0x30": 2, "0x26": 3 }
//! }
//! ```
//!
//! `sensors` selects which decoders are registered (all of them when the
//! key is missing). `lengths` corrects payload lengths in the command table
//! for instruments that frame differently from the standard table. Both are
//! read once at startup.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use seatalk_core::command::parse_command_byte;
use seatalk_core::{CommandTable, ConfigError, Quantity};

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Cannot read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot parse settings: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Quantities to decode; `None` decodes everything
    pub sensors: Option<Vec<Quantity>>,
    /// Command byte (`"0x30"` or `"48"`) → payload length
    pub lengths: BTreeMap<String, u8>,
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&text)?;
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn from_json(text: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(text)?;
        // Fail on bad command keys now rather than when the bus starts
        settings.command_table()?;
        Ok(settings)
    }

    /// The standard table with this installation's overrides applied
    pub fn command_table(&self) -> Result<CommandTable, ConfigError> {
        let mut overrides: Vec<(u8, u8)> = Vec::with_capacity(self.lengths.len());
        for (key, &len) in &self.lengths {
            let command = parse_command_byte(key)?;
            if overrides.iter().any(|&(c, _)| c == command) {
                return Err(ConfigError::DuplicateCommand(command));
            }
            overrides.push((command, len));
        }
        CommandTable::with_overrides(overrides)
    }

    /// Enabled quantities in configured order, without duplicates
    pub fn enabled_sensors(&self) -> Vec<Quantity> {
        match &self.sensors {
            None => Quantity::ALL.to_vec(),
            Some(sensors) => {
                let mut enabled = Vec::with_capacity(sensors.len());
                for &q in sensors {
                    if !enabled.contains(&q) {
                        enabled.push(q);
                    }
                }
                enabled
            }
        }
    }
}
