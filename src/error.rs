//! Error types for the kotel2influx bridge

use thiserror::Error;

/// Result type alias for bridge operations
pub type Result<T> = std::result::Result<T, KotelError>;

/// Error types for device polling and measurement export
#[derive(Error, Debug)]
pub enum KotelError {
    /// Connection errors
    #[error("Connection error: {0}")]
    Connection(String),

    /// Operation timed out
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Login handshake failures
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Device page or register parsing errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// A measurement field referenced a register absent from the snapshot
    #[error("Register {register} missing from page {page}")]
    MissingRegister {
        /// Page the field spec pointed at
        page: &'static str,
        /// Register the field spec pointed at
        register: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Time-series sink errors
    #[error("Sink error: {0}")]
    Sink(String),

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl KotelError {
    /// Create a connection error
    pub fn connection<S: Into<String>>(msg: S) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a timeout error
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create an authentication error
    pub fn authentication<S: Into<String>>(msg: S) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a parse error
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a missing-register error
    pub fn missing_register<S: Into<String>>(page: &'static str, register: S) -> Self {
        Self::MissingRegister {
            page,
            register: register.into(),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a sink error
    pub fn sink<S: Into<String>>(msg: S) -> Self {
        Self::Sink(msg.into())
    }

    /// Check if error indicates a register the snapshot did not carry
    pub fn is_missing_register(&self) -> bool {
        matches!(self, KotelError::MissingRegister { .. })
    }
}
