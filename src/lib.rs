//! kotel2influx: heat-pump controller to InfluxDB bridge
//!
//! Polls a heating controller's web management interface on a fixed
//! interval, types the raw register values found on its XML pages, derives
//! a small fixed schema of measurements, and writes them to InfluxDB.
//!
//! The controller drops sessions silently after inactivity, so the client
//! re-authenticates lazily: any failed load discards the session handle
//! and retries the page set exactly once through a fresh login.
//!
//! # Example
//!
//! ```rust,no_run
//! use kotel2influx::{AppConfig, KotelClient, PageId};
//! use kotel2influx::emitter::BatchEmitter;
//! use kotel2influx::influx::InfluxSink;
//!
//! #[tokio::main]
//! async fn main() -> kotel2influx::Result<()> {
//!     let config = AppConfig::load(std::path::Path::new("kotel.toml"))?;
//!     let mut client = KotelClient::from_config(&config.device);
//!     let sink = InfluxSink::new(&config.influx);
//!     let emitter = BatchEmitter::new(Box::new(sink), config.influx.prefix.clone());
//!
//!     let snapshot = client.load_pages(&PageId::ALL).await?;
//!     emitter.run(&snapshot, None).await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod emitter;
pub mod error;
pub mod influx;
pub mod logging;
pub mod measurements;
pub mod mock;

// Re-export main types
pub use crate::{
    client::{DeviceSnapshot, KotelClient, PageId},
    config::AppConfig,
    error::{KotelError, Result},
};
