//! InfluxDB sink for measurement records

use crate::client::typing::RegisterValue;
use crate::config::InfluxConfig;
use crate::emitter::MeasurementSink;
use crate::error::{KotelError, Result};
use crate::measurements::MeasurementRecord;
use async_trait::async_trait;
use chrono::Utc;
use futures::stream;
use influxdb2::api::write::TimestampPrecision;
use influxdb2::models::DataPoint;
use influxdb2::Client;
use tracing::debug;

/// InfluxDB-backed measurement sink
pub struct InfluxSink {
    client: Client,
    bucket: String,
}

impl InfluxSink {
    /// Create a sink for the configured InfluxDB instance
    pub fn new(config: &InfluxConfig) -> Self {
        let client = Client::new(&config.url, &config.org, &config.token);
        debug!(
            "Connected to influx at {} (org {}), using bucket {}",
            config.url, config.org, config.bucket
        );
        Self {
            client,
            bucket: config.bucket.clone(),
        }
    }
}

#[async_trait]
impl MeasurementSink for InfluxSink {
    async fn write(&self, record: &MeasurementRecord) -> Result<bool> {
        let mut builder = DataPoint::builder(record.measurement.as_str());
        for (field, value) in &record.fields {
            builder = match value {
                RegisterValue::Integer(v) => builder.field(*field, *v),
                RegisterValue::Float(v) => builder.field(*field, *v),
                RegisterValue::Text(v) => builder.field(*field, v.clone()),
            };
        }

        let point = builder
            .timestamp(Utc::now().timestamp())
            .build()
            .map_err(|e| KotelError::sink(format!("Failed to build data point: {e}")))?;

        self.client
            .write_with_precision(
                &self.bucket,
                stream::once(async { point }),
                TimestampPrecision::Seconds,
            )
            .await
            .map_err(|e| KotelError::sink(format!("Failed to write to InfluxDB: {e}")))?;

        Ok(true)
    }
}
