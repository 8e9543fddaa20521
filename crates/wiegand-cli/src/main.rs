//! Loopback demo: a transmitter wired straight into a reader.
//!
//! Usage: `wiegand-loopback [config.json]`
//!
//! The transmitter writes a sample card every 11 polls through mock output
//! pins whose falling edges fire the reader's mock interrupts. Reader events
//! are printed as JSON lines on stdout; logs go to stderr and honour
//! `RUST_LOG` (default `info`). Stop with Ctrl-C.

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::EnvFilter;
use wiegand_core::{Bit, TaskIndex, WiegandConfig};
use wiegand_emulator::{ReaderRuntime, TransmitSchedule, WiegandReader};
use wiegand_hardware::mock::{LoopbackPin, MockInterrupts};
use wiegand_hardware::{SpinDelay, WiegandTransmitter, input_line_for};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => WiegandConfig::load(&path)
            .with_context(|| format!("failed to load configuration from {path}"))?,
        None => WiegandConfig::default(),
    };
    info!(
        frame_width = config.frame_width,
        poll_interval_ms = config.poll_interval_ms,
        "Starting Wiegand loopback"
    );

    let interrupts = MockInterrupts::new();
    let transmitter = WiegandTransmitter::new(
        LoopbackPin::new(interrupts.clone(), input_line_for(&config, Bit::Zero)),
        LoopbackPin::new(interrupts.clone(), input_line_for(&config, Bit::One)),
        SpinDelay,
    );
    let reader = WiegandReader::new(TaskIndex::new(0), config, interrupts)
        .context("invalid reader configuration")?;

    let mut handle = ReaderRuntime::new(reader)
        .with_transmitter(transmitter, TransmitSchedule::default())
        .spawn()
        .context("failed to start reader")?;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                break;
            }
            event = handle.recv() => match event {
                Some(event) => println!("{}", serde_json::to_string(&event)?),
                None => break,
            },
        }
    }

    handle.shutdown().await.context("reader shutdown failed")?;
    Ok(())
}
