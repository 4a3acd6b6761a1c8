//! The receive loop: transport bytes in, readings out.
//!
//! Runs as a `tokio-graceful-shutdown` subsystem. The [`SeaTalkBus`] (and so
//! the parser state) lives for the whole subsystem, across reconnects of
//! the transport.

use std::io;
use std::time::Duration;

use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tokio_graceful_shutdown::SubsystemHandle;

use seatalk_core::{AssemblerStats, RawDataListener, SeaTalkBus, SensorDecoder};

use crate::settings::{Settings, SettingsError};
use crate::sink::PublishSink;
use crate::transport::{
    bounded_backoff_next, ByteReader, Transport, MAX_RECONNECT_BACKOFF, RECONNECT_BACKOFF,
};
use crate::Cli;

/// Housekeeping period
pub const TICK: Duration = Duration::from_millis(1000);

/// Ticks with bytes but no completed frame before warning about framing
pub const STALL_TICKS: u32 = 5;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("I/O operation failed: {0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Settings(#[from] SettingsError),
}

/// Wire up a bus from settings and command line flags
pub fn build_bus(settings: &Settings, args: &Cli) -> Result<SeaTalkBus, SessionError> {
    let table = settings.command_table().map_err(SettingsError::from)?;
    let mut bus = SeaTalkBus::with_table(table);

    let sink = PublishSink::new(args.output);
    for quantity in settings.enabled_sensors() {
        log::debug!("Registering {} decoder", quantity);
        bus.add_listener(SensorDecoder::new(quantity, sink));
    }
    if args.raw {
        bus.add_listener(RawDataListener::new(|dump: String| {
            log::info!("raw: {}", dump);
        }));
    }
    Ok(bus)
}

enum Pump {
    Eof,
    Shutdown,
}

/// Watches stats between ticks for a stream that never completes a frame
#[derive(Debug, Default)]
struct StallWatch {
    last: AssemblerStats,
    last_bytes: u64,
    stalled_ticks: u32,
}

impl StallWatch {
    /// Returns true on the tick the stall threshold is crossed
    fn tick(&mut self, stats: AssemblerStats, bytes: u64) -> bool {
        let got_bytes = bytes != self.last_bytes;
        let got_frames = stats.frames != self.last.frames;
        self.last = stats;
        self.last_bytes = bytes;

        if got_bytes && !got_frames {
            self.stalled_ticks += 1;
            self.stalled_ticks == STALL_TICKS
        } else {
            self.stalled_ticks = 0;
            false
        }
    }
}

pub struct Receiver {
    transport: Transport,
    bus: SeaTalkBus,
    bytes_received: u64,
    stall: StallWatch,
}

impl Receiver {
    pub fn new(transport: Transport, bus: SeaTalkBus) -> Self {
        Self {
            transport,
            bus,
            bytes_received: 0,
            stall: StallWatch::default(),
        }
    }

    pub async fn run(mut self, subsys: SubsystemHandle) -> Result<(), SessionError> {
        log::info!(
            "SeaTalk receiver on {} with {} listeners",
            self.transport,
            self.bus.listener_count()
        );
        let mut backoff = RECONNECT_BACKOFF;

        loop {
            let outcome = match self.transport.open().await {
                Ok(mut reader) => {
                    log::info!("Opened {}", self.transport);
                    backoff = RECONNECT_BACKOFF;
                    self.pump(&subsys, &mut reader).await
                }
                Err(e) => Err(e),
            };

            match outcome {
                Ok(Pump::Shutdown) => {
                    log::info!("{}: shutdown", self.transport);
                    return Ok(());
                }
                Ok(Pump::Eof) if !self.transport.reconnects() => {
                    self.log_stats();
                    log::info!("{}: end of input", self.transport);
                    subsys.request_shutdown();
                    return Ok(());
                }
                Ok(Pump::Eof) => log::warn!("{}: closed by peer", self.transport),
                Err(e) if !self.transport.reconnects() => return Err(e.into()),
                Err(e) => log::warn!("{}: {}", self.transport, e),
            }

            tokio::select! {
                _ = subsys.on_shutdown_requested() => return Ok(()),
                _ = sleep(backoff) => {},
            }
            backoff = bounded_backoff_next(backoff, MAX_RECONNECT_BACKOFF);
        }
    }

    async fn pump(&mut self, subsys: &SubsystemHandle, reader: &mut ByteReader) -> io::Result<Pump> {
        let mut buf = [0u8; 512];
        let mut ticker = interval(TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! { biased;
                _ = subsys.on_shutdown_requested() => {
                    return Ok(Pump::Shutdown);
                },
                _ = ticker.tick() => {
                    self.housekeeping();
                },
                r = reader.read(&mut buf) => {
                    match r {
                        Ok(0) => return Ok(Pump::Eof),
                        Ok(n) => {
                            self.bytes_received += n as u64;
                            self.bus.process_bytes(&buf[..n]);
                        }
                        Err(e) => return Err(e),
                    }
                },
            }
        }
    }

    fn housekeeping(&mut self) {
        let stats = self.bus.stats();
        if self.stall.tick(stats, self.bytes_received) {
            let state = self.bus.assembler().parser_state();
            log::warn!(
                "{}: bytes arriving but no frame completed for {} s (parser {} cmd={:#04X} {}/{})",
                self.transport,
                STALL_TICKS,
                state.mode,
                state.command,
                state.payload.len(),
                state.expected_length
            );
        }
        log::trace!("{}: {:?}", self.transport, stats);
    }

    fn log_stats(&self) {
        let stats = self.bus.stats();
        log::info!(
            "{}: {} bytes, {} frames, {} unknown commands, {} idle bytes",
            self.transport,
            self.bytes_received,
            stats.frames,
            stats.unknown_commands,
            stats.idle_bytes
        );
    }
}
