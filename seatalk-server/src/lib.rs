//! # SeaTalk Server
//!
//! Reads a SeaTalk instrument bus and publishes the decoded readings.
//!
//! ## Architecture
//!
//! The decoding itself lives in [`seatalk_core`]; this crate only supplies
//! the byte transport, the settings file and a sink for readings, with
//! [`tokio`] providing the runtime.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    seatalk-server                       │
//! │  ┌──────────────────┐      ┌──────────────────────────┐ │
//! │  │ Transport        │      │ Settings (JSON)          │ │
//! │  │ serial/tcp/file/ │      │ sensors, length overrides│ │
//! │  │ stdin            │      └────────────┬─────────────┘ │
//! │  └────────┬─────────┘                   │               │
//! │           ▼                             ▼               │
//! │  ┌─────────────────────────────────────────────────────┐│
//! │  │  Receiver subsystem                                 ││
//! │  │  - SeaTalkBus (assembler + decoders)                ││
//! │  │  - 1 s housekeeping tick                            ││
//! │  └────────────────────────┬────────────────────────────┘│
//! │                           ▼                             │
//! │                 PublishSink (log / JSON lines)          │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Command-Line Interface
//!
//! See [`Cli`] for all available options. Key options:
//!
//! - `-s, --serial` - Serial device on the bus (4800 baud by default)
//! - `-t, --tcp` - TCP bridge that forwards raw bus bytes
//! - `-f, --file` - Replay a raw capture file
//! - `-c, --config` - Settings file
//! - `--output` - Write readings as JSON lines to stdout
//! - `-v` - Increase verbosity (use multiple times)

use std::path::PathBuf;

use clap::Parser;

pub mod session;
pub mod settings;
pub mod sink;
pub mod transport;

pub use session::{build_bus, Receiver, SessionError};
pub use settings::{Settings, SettingsError};
pub use transport::Transport;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Clone, Debug)]
#[command(version, about = "Decode a SeaTalk instrument bus into readings")]
pub struct Cli {
    #[clap(flatten)]
    pub verbose: clap_verbosity_flag::Verbosity<clap_verbosity_flag::InfoLevel>,

    /// Serial device connected to the SeaTalk bus
    #[arg(short, long, conflicts_with_all = ["tcp", "file"])]
    pub serial: Option<String>,

    /// Serial baud rate
    #[arg(short, long, default_value_t = transport::SEATALK_BAUD_RATE)]
    pub baud: u32,

    /// Read raw bus bytes from a TCP bridge (host:port)
    #[arg(short, long, conflicts_with = "file")]
    pub tcp: Option<String>,

    /// Replay a raw capture file
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// JSON settings file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write readings as JSON lines to stdout
    #[arg(long, default_value_t = false)]
    pub output: bool,

    /// Log every completed message as hex
    #[arg(long, default_value_t = false)]
    pub raw: bool,
}

impl Cli {
    /// Transport selected on the command line; stdin when none is given
    pub fn transport(&self) -> Transport {
        if let Some(device) = &self.serial {
            Transport::Serial {
                device: device.clone(),
                baud_rate: self.baud,
            }
        } else if let Some(addr) = &self.tcp {
            Transport::Tcp(addr.clone())
        } else if let Some(path) = &self.file {
            Transport::File(path.clone())
        } else {
            Transport::Stdin
        }
    }

    pub fn settings(&self) -> Result<Settings, SettingsError> {
        match &self.config {
            Some(path) => Settings::load(path),
            None => Ok(Settings::default()),
        }
    }
}
