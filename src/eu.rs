//! European Common Air Quality Index (CAQI)
//!
//! Hourly background index from the CiteAir grid:
//! <https://www.airqualitynow.eu/about_indices_definition.php>
//!
//! The grid stops at index 100; above that the slope of the last segment is
//! continued so that "very high" still distinguishes bad from worse.

use serde::{Deserialize, Serialize};

use crate::aqi::{AqiResult, Band, Level as AqiLevel, Overflow, Rounding, Scale, SubIndices};

/// PM2.5 hourly grid, ug/m3
const PM2_5_BANDS: [Band; 4] = [
    Band::new(0.0, 15.0, 0.0, 25.0),
    Band::new(15.0, 30.0, 25.0, 50.0),
    Band::new(30.0, 55.0, 50.0, 75.0),
    Band::new(55.0, 110.0, 75.0, 100.0),
];

/// PM10 hourly grid, ug/m3
const PM10_BANDS: [Band; 4] = [
    Band::new(0.0, 25.0, 0.0, 25.0),
    Band::new(25.0, 50.0, 25.0, 50.0),
    Band::new(50.0, 90.0, 50.0, 75.0),
    Band::new(90.0, 180.0, 75.0, 100.0),
];

pub const PM2_5: Scale = Scale {
    bands: &PM2_5_BANDS,
    rounding: Rounding::Up,
    overflow: Overflow::Extrapolate,
};

pub const PM10: Scale = Scale {
    bands: &PM10_BANDS,
    rounding: Rounding::Up,
    overflow: Overflow::Extrapolate,
};

/// CAQI levels, each covering a half-open index range `(low, high]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Level {
    /// 0 to 25
    #[serde(rename = "very low")]
    VeryLow,
    /// 26 to 50
    #[serde(rename = "low")]
    Low,
    /// 51 to 75
    #[serde(rename = "medium")]
    Medium,
    /// 76 to 100
    #[serde(rename = "high")]
    High,
    /// Above 100
    #[serde(rename = "very high")]
    VeryHigh,
}

impl Level {
    pub const ALL: [Self; 5] = [
        Self::VeryLow,
        Self::Low,
        Self::Medium,
        Self::High,
        Self::VeryHigh,
    ];

    #[must_use]
    pub fn from_index(index: u16) -> Self {
        match index {
            0..=25 => Self::VeryLow,
            26..=50 => Self::Low,
            51..=75 => Self::Medium,
            76..=100 => Self::High,
            _ => Self::VeryHigh,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::VeryLow => "very low",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::VeryHigh => "very high",
        }
    }
}

/// Classify hourly mean concentrations
#[must_use]
pub fn classify(pm2_5: f64, pm10: f64) -> AqiResult {
    let breakpoints = SubIndices::new(PM2_5.sub_index(pm2_5), PM10.sub_index(pm10));
    let index = breakpoints.worst();
    AqiResult {
        index,
        level: AqiLevel::Eu(Level::from_index(index)),
        breakpoints,
    }
}
