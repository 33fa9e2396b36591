//! Batch emission of measurements into a time-series sink

use crate::client::DeviceSnapshot;
use crate::error::{KotelError, Result};
use crate::measurements::{self, MeasurementRecord};
use async_trait::async_trait;
use tracing::{debug, error, info};

/// A time-series sink accepting one record per write
#[async_trait]
pub trait MeasurementSink: Send + Sync {
    /// Write one record; `true` means the sink acknowledged it
    async fn write(&self, record: &MeasurementRecord) -> Result<bool>;
}

/// Applies the measurement registry to a snapshot and hands records to a sink
pub struct BatchEmitter {
    sink: Box<dyn MeasurementSink>,
    prefix: String,
}

impl BatchEmitter {
    /// Create an emitter writing into the given sink
    pub fn new(sink: Box<dyn MeasurementSink>, prefix: impl Into<String>) -> Self {
        Self {
            sink,
            prefix: prefix.into(),
        }
    }

    /// Emit the requested measurements, defaulting to all registered ones
    ///
    /// Returns the number of records the sink acknowledged. A missing
    /// register means the device's page layout no longer matches the
    /// schema; it is logged with the whole snapshot and re-raised rather
    /// than skipped.
    pub async fn run(
        &self,
        snapshot: &DeviceSnapshot,
        measurements: Option<&[&str]>,
    ) -> Result<usize> {
        let names: Vec<&str> = match measurements {
            Some(names) => names.to_vec(),
            None => measurements::MEASUREMENTS
                .iter()
                .map(|spec| spec.name)
                .collect(),
        };

        let mut stored = 0;
        for name in &names {
            let spec = measurements::find(name)
                .ok_or_else(|| KotelError::config(format!("Unknown measurement {name}")))?;

            let record = match measurements::apply(spec, snapshot, &self.prefix) {
                Ok(record) => record,
                Err(e) => {
                    error!("Incorrect input data for measurement {name}: {e}; snapshot={snapshot:?}");
                    return Err(e);
                }
            };

            debug!("Storing data point of measurement {}", record.measurement);
            if self.sink.write(&record).await? {
                stored += 1;
            }
        }

        info!(
            "{stored} out of {} measurements have been stored",
            names.len()
        );
        Ok(stored)
    }
}
