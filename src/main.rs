//! kotel2influx main entry point
//!
//! Wires the configured device client, measurement emitter and InfluxDB
//! sink together and runs the fixed-interval poll loop.

use kotel2influx::{
    emitter::BatchEmitter, influx::InfluxSink, logging, AppConfig, KotelClient, PageId, Result,
};

use clap::Parser;
use std::path::PathBuf;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{error, info};

/// Command line arguments
#[derive(Parser)]
#[command(name = "kotel2influx")]
#[command(about = "Heat-pump controller to InfluxDB bridge")]
#[command(version)]
struct Cli {
    /// Path to the TOML configuration file
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_config = logging::LogConfig::from_env();
    if let Err(e) = logging::init_logging(log_config) {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    let config = match AppConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    let mut client = KotelClient::from_config(&config.device);
    let sink = InfluxSink::new(&config.influx);
    let emitter = BatchEmitter::new(Box::new(sink), config.influx.prefix.clone());

    info!(
        "Polling {} every {:?}",
        config.device.url, config.job.interval
    );

    // One poll at a time; a slow cycle delays the next tick instead of
    // overlapping with it.
    let mut ticker = interval(config.job.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        match poll_cycle(&mut client, &emitter).await {
            Ok(stored) => info!("The job finished successfully; stored {stored} measurements"),
            Err(e) => error!("The job crashed: {e}"),
        }
    }
}

/// Run one poll cycle: load all pages, emit all measurements
async fn poll_cycle(client: &mut KotelClient, emitter: &BatchEmitter) -> Result<usize> {
    let snapshot = client.load_pages(&PageId::ALL).await?;
    emitter.run(&snapshot, None).await
}
