//! Logging setup for the bridge
//!
//! Formatted tracing output to stderr, with an optional daily-rotated
//! log file for unattended deployments.

use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log level
    pub level: Level,

    /// Log to file
    pub file_path: Option<PathBuf>,

    /// Log to stderr
    pub stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            file_path: None,
            stderr: true,
        }
    }
}

impl LogConfig {
    /// Create config from environment
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(rust_log) = std::env::var("RUST_LOG") {
            if rust_log.contains("trace") {
                config.level = Level::TRACE;
            } else if rust_log.contains("debug") {
                config.level = Level::DEBUG;
            } else if rust_log.contains("info") {
                config.level = Level::INFO;
            } else if rust_log.contains("warn") {
                config.level = Level::WARN;
            } else if rust_log.contains("error") {
                config.level = Level::ERROR;
            }
        }

        if let Ok(log_file) = std::env::var("KOTEL_LOG_FILE") {
            config.file_path = Some(PathBuf::from(log_file));
        }

        if let Ok(log_stderr) = std::env::var("KOTEL_LOG_STDERR") {
            config.stderr = log_stderr.to_lowercase() != "false";
        }

        config
    }
}

/// Initialize logging with the given configuration
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::builder()
        .with_default_directive(config.level.into())
        .from_env_lossy();

    match (config.stderr, config.file_path) {
        (true, Some(file_path)) => {
            if let Some(parent) = file_path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let file_appender = tracing_appender::rolling::daily(
                file_path
                    .parent()
                    .unwrap_or_else(|| std::path::Path::new(".")),
                file_path
                    .file_name()
                    .unwrap_or_else(|| std::ffi::OsStr::new("kotel2influx.log")),
            );

            let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_ansi(true);
            let file_layer = fmt::layer().with_writer(file_appender).with_ansi(false);

            let subscriber = tracing_subscriber::registry()
                .with(env_filter)
                .with(stderr_layer)
                .with(file_layer);

            tracing::subscriber::set_global_default(subscriber)?;
        }
        (true, None) => {
            let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_ansi(true);

            let subscriber = tracing_subscriber::registry()
                .with(env_filter)
                .with(stderr_layer);

            tracing::subscriber::set_global_default(subscriber)?;
        }
        (false, Some(file_path)) => {
            if let Some(parent) = file_path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let file_appender = tracing_appender::rolling::daily(
                file_path
                    .parent()
                    .unwrap_or_else(|| std::path::Path::new(".")),
                file_path
                    .file_name()
                    .unwrap_or_else(|| std::ffi::OsStr::new("kotel2influx.log")),
            );

            let file_layer = fmt::layer().with_writer(file_appender).with_ansi(false);

            let subscriber = tracing_subscriber::registry()
                .with(env_filter)
                .with(file_layer);

            tracing::subscriber::set_global_default(subscriber)?;
        }
        (false, None) => {
            let subscriber = tracing_subscriber::registry().with(env_filter);
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    Ok(())
}
