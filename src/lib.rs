//! Particulate Matter Air Quality Monitor
//!
//! This crate turns SDS011 particulate matter readings into air quality
//! indices of the supported standards:
//! - Mainland China AQI (`CN`)
//! - European CAQI (`EU`), averaged hourly
//! - US EPA AQI (`US`), averaged daily
//!
//! Readings are averaged over the time span the standard requires, classified
//! into an index and a severity level, and published to a CSV log, an MQTT
//! broker and the indicator LEDs of a Turris Omnia router.
//!
//! # Example
//!
//! ```rust
//! use aqi_monitor::classify_concentrations;
//!
//! let result = classify_concentrations("EU", 20.0, 30.0).unwrap();
//! assert_eq!(result.index, 34);
//! assert_eq!(result.level.name(), "low");
//! ```

pub mod aqi;
pub mod cn;
pub mod color;
pub mod config;
pub mod csv_log;
pub mod error;
pub mod eu;
pub mod led;
pub mod monitor;
pub mod mqtt;
pub mod reading;
pub mod sds011;
pub mod sensor;
pub mod sink;
pub mod standard;
pub mod us;
pub mod window;

pub use aqi::{AqiResult, Level, classify};
pub use color::{Palette, Rgb};
pub use config::{Cli, Settings};
pub use error::{AqiError, Result};
pub use monitor::Monitor;
pub use reading::Reading;
pub use sink::{Report, Sink};
pub use standard::AqiStandard;
pub use window::{Window, WindowedAverage};

/// Classify averaged concentrations under the standard named by `country`
///
/// # Arguments
///
/// * `country` - Country code of the standard, case-insensitive (`CN`, `EU` or `US`)
/// * `pm2_5` - Averaged PM2.5 concentration in ug/m3
/// * `pm10` - Averaged PM10 concentration in ug/m3
///
/// # Example
///
/// ```rust
/// use aqi_monitor::classify_concentrations;
///
/// let result = classify_concentrations("us", 35.5, 0.0).unwrap();
/// assert_eq!(result.level.name(), "Unhealthy for Sensitive Groups");
/// ```
///
/// # Errors
///
/// * `AqiError::UnsupportedStandard` - `country` is not a supported standard
pub fn classify_concentrations(country: &str, pm2_5: f64, pm10: f64) -> Result<AqiResult> {
    let standard = country.parse::<AqiStandard>()?;
    Ok(classify(standard, &WindowedAverage { pm2_5, pm10 }))
}
