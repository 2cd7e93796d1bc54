//! Supported national air quality index standards

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AqiError, Result};

/// Averaging period of the hourly European CAQI
pub const HOURLY_INTERVAL: Duration = Duration::from_secs(3600);
/// Averaging period of the 24-hour Chinese and US indices
pub const DAILY_INTERVAL: Duration = Duration::from_secs(86_400);

/// National AQI standard, selected by ISO 3166-1 alpha-2 code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AqiStandard {
    /// Mainland China AQI (HJ 633-2012)
    #[serde(rename = "CN")]
    Cn,
    /// European Common Air Quality Index (CAQI)
    #[serde(rename = "EU")]
    Eu,
    /// US EPA AQI
    #[serde(rename = "US")]
    Us,
}

impl AqiStandard {
    pub const ALL: [Self; 3] = [Self::Cn, Self::Eu, Self::Us];

    /// Country code of the standard
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Cn => "CN",
            Self::Eu => "EU",
            Self::Us => "US",
        }
    }

    /// Time span the concentrations must be averaged over
    #[must_use]
    pub fn interval(&self) -> Duration {
        match self {
            Self::Eu => HOURLY_INTERVAL,
            Self::Cn | Self::Us => DAILY_INTERVAL,
        }
    }
}

impl fmt::Display for AqiStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for AqiStandard {
    type Err = AqiError;

    fn from_str(code: &str) -> Result<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "CN" => Ok(Self::Cn),
            "EU" => Ok(Self::Eu),
            "US" => Ok(Self::Us),
            _ => Err(AqiError::UnsupportedStandard(code.to_string())),
        }
    }
}
