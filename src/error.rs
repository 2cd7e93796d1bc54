//! Error types for the air quality monitor

use thiserror::Error;

use crate::standard::AqiStandard;

/// Result type alias for monitor operations
pub type Result<T> = std::result::Result<T, AqiError>;

/// Errors that can occur while measuring, classifying or publishing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AqiError {
    /// Settings that can never produce a working monitor (sample count, delays, standard)
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Country or standard code outside of CN, EU and US
    #[error("Unsupported AQI standard: {0}")]
    UnsupportedStandard(String),

    /// Serial I/O with the sensor failed
    #[error("Sensor I/O error: {0}")]
    SensorIo(String),

    /// The sensor answered with a frame that could not be decoded
    #[error("Invalid sensor frame: {0}")]
    InvalidFrame(String),

    /// Severity level has no entry in the colour table of its standard
    #[error("Unknown severity level '{level}' for standard {standard}")]
    UnknownSeverityLevel {
        level: String,
        standard: AqiStandard,
    },

    /// A log, MQTT or LED sink could not deliver the cycle result
    #[error("Sink failure ({sink}): {message}")]
    SinkFailure { sink: &'static str, message: String },
}

impl AqiError {
    /// Create a new `InvalidConfiguration` error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    /// Create a new `SinkFailure` error for the named sink
    #[must_use]
    pub fn sink(sink: &'static str, message: impl ToString) -> Self {
        Self::SinkFailure {
            sink,
            message: message.to_string(),
        }
    }

    /// Create a new `InvalidFrame` error for an unexpected frame length
    #[must_use]
    pub fn invalid_length(expected: usize, actual: usize) -> Self {
        Self::InvalidFrame(format!("Expected {expected} bytes, got {actual}"))
    }

    /// Whether the error comes from talking to the sensor
    #[must_use]
    pub fn is_sensor_error(&self) -> bool {
        matches!(self, Self::SensorIo(_) | Self::InvalidFrame(_))
    }
}

impl From<std::io::Error> for AqiError {
    fn from(err: std::io::Error) -> Self {
        Self::SensorIo(err.to_string())
    }
}
