use std::time::Duration;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use tokio_graceful_shutdown::{SubsystemBuilder, Toplevel};

use seatalk_server::{build_bus, Cli, Receiver, VERSION};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();

    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    log::info!("seatalk-server {}", VERSION);

    let settings = args.settings().into_diagnostic()?;
    let bus = build_bus(&settings, &args).into_diagnostic()?;
    let receiver = Receiver::new(args.transport(), bus);

    Toplevel::new(|s| async move {
        s.start(SubsystemBuilder::new("Receiver", |s| receiver.run(s)));
    })
    .catch_signals()
    .handle_shutdown_requests(Duration::from_millis(1000))
    .await
    .into_diagnostic()
}
