//! Configuration for the kotel2influx bridge
//!
//! Settings come from a TOML file given on the command line, with
//! `KOTEL__`-prefixed environment variables layered on top
//! (e.g. `KOTEL__INFLUX__TOKEN`).

use crate::error::{KotelError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Top-level bridge configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Heating controller configuration
    #[serde(default)]
    pub device: DeviceConfig,

    /// InfluxDB sink configuration
    #[serde(default)]
    pub influx: InfluxConfig,

    /// Poll job configuration
    #[serde(default)]
    pub job: JobConfig,
}

/// Heating controller configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Controller base URL (e.g. "http://192.168.1.50/")
    pub url: Url,

    /// Login form username
    pub username: String,

    /// Shared secret mixed into the login digest
    pub password: String,

    /// Per-request timeout for every device HTTP call
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:80".parse().unwrap(),
            username: "user".to_string(),
            password: "00000000".to_string(),
            timeout: Duration::from_secs(3),
        }
    }
}

/// InfluxDB sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InfluxConfig {
    /// InfluxDB URL (e.g. http://localhost:8086)
    pub url: String,

    /// Organization name
    pub org: String,

    /// API token for authentication
    pub token: String,

    /// Bucket the measurements are written into
    pub bucket: String,

    /// Prefix prepended to every measurement name
    #[serde(default)]
    pub prefix: String,
}

impl Default for InfluxConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8086".to_string(),
            org: "kotel".to_string(),
            token: String::new(),
            bucket: "kotel".to_string(),
            prefix: String::new(),
        }
    }
}

/// Poll job configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JobConfig {
    /// Interval between poll cycles
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file plus environment overrides
    pub fn load(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("KOTEL").separator("__"))
            .build()
            .map_err(|e| KotelError::config(format!("Failed to read configuration: {e}")))?;

        let app: AppConfig = settings
            .try_deserialize()
            .map_err(|e| KotelError::config(format!("Invalid configuration: {e}")))?;

        app.validate()?;
        Ok(app)
    }

    /// Validate configuration consistency
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.device.url.scheme(), "http" | "https") {
            return Err(KotelError::config(format!(
                "Device URL must be http or https, got {}",
                self.device.url.scheme()
            )));
        }

        if self.device.username.is_empty() {
            return Err(KotelError::config("Device username cannot be empty"));
        }

        if self.device.timeout.is_zero() {
            return Err(KotelError::config("Device timeout must be greater than 0"));
        }

        if self.job.interval.is_zero() {
            return Err(KotelError::config("Poll interval must be greater than 0"));
        }

        if self.influx.bucket.is_empty() {
            return Err(KotelError::config("Influx bucket cannot be empty"));
        }

        Ok(())
    }
}
