//! Byte sources for the SeaTalk receiver.
//!
//! Every source is opened as a boxed [`AsyncRead`]; the receiver does not
//! care where the bytes come from. Serial and TCP sources are live links and
//! are reopened after errors, files and stdin are read once to the end.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

use tokio::io::AsyncRead;
use tokio::net::TcpStream;
use tokio_serial::{DataBits, FlowControl, Parity, SerialPortBuilderExt, StopBits};

/// SeaTalk runs at 4800 baud
pub const SEATALK_BAUD_RATE: u32 = 4800;

pub const RECONNECT_BACKOFF: Duration = Duration::from_millis(500);
pub const MAX_RECONNECT_BACKOFF: Duration = Duration::from_millis(5_000);

pub type ByteReader = Box<dyn AsyncRead + Unpin + Send>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    Serial { device: String, baud_rate: u32 },
    Tcp(String),
    File(PathBuf),
    Stdin,
}

impl Transport {
    /// Live links are retried when they fail or close
    pub fn reconnects(&self) -> bool {
        matches!(self, Transport::Serial { .. } | Transport::Tcp(_))
    }

    pub async fn open(&self) -> io::Result<ByteReader> {
        match self {
            Transport::Serial { device, baud_rate } => {
                let port = tokio_serial::new(device.clone(), *baud_rate)
                    .data_bits(DataBits::Eight)
                    .parity(Parity::None)
                    .stop_bits(StopBits::One)
                    .flow_control(FlowControl::None)
                    .open_native_async()
                    .map_err(io::Error::from)?;
                Ok(Box::new(port))
            }
            Transport::Tcp(addr) => {
                let stream = TcpStream::connect(addr.as_str()).await?;
                stream.set_nodelay(true)?;
                Ok(Box::new(stream))
            }
            Transport::File(path) => Ok(Box::new(tokio::fs::File::open(path).await?)),
            Transport::Stdin => Ok(Box::new(tokio::io::stdin())),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Serial { device, baud_rate } => {
                write!(f, "serial {} @ {} baud", device, baud_rate)
            }
            Transport::Tcp(addr) => write!(f, "tcp {}", addr),
            Transport::File(path) => write!(f, "file {}", path.display()),
            Transport::Stdin => write!(f, "stdin"),
        }
    }
}

/// Double the backoff, capped at `max`
pub fn bounded_backoff_next(current: Duration, max: Duration) -> Duration {
    let current_ms = current.as_millis() as u64;
    let max_ms = max.as_millis() as u64;
    Duration::from_millis(current_ms.saturating_mul(2).min(max_ms))
}
