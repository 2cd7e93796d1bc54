//! US EPA Air Quality Index
//!
//! Breakpoints from the 2024 revision of the EPA technical assistance document:
//! <https://document.airnow.gov/technical-assistance-document-for-the-reporting-of-daily-air-quailty.pdf>
//!
//! Concentrations are truncated before the lookup (PM2.5 to 0.1 ug/m3, PM10
//! to 1 ug/m3), which closes the gaps between consecutive breakpoint rows.

use serde::{Deserialize, Serialize};

use crate::aqi::{
    AqiResult, Band, Level as AqiLevel, Overflow, Rounding, Scale, SubIndices, truncate,
};

/// Highest index the EPA table defines
pub const MAX_INDEX: u16 = 500;

const PM2_5_BANDS: [Band; 6] = [
    Band::new(0.0, 9.0, 0.0, 50.0),
    Band::new(9.1, 35.4, 51.0, 100.0),
    Band::new(35.5, 55.4, 101.0, 150.0),
    Band::new(55.5, 125.4, 151.0, 200.0),
    Band::new(125.5, 225.4, 201.0, 300.0),
    Band::new(225.5, 325.4, 301.0, 500.0),
];

const PM10_BANDS: [Band; 6] = [
    Band::new(0.0, 54.0, 0.0, 50.0),
    Band::new(55.0, 154.0, 51.0, 100.0),
    Band::new(155.0, 254.0, 101.0, 150.0),
    Band::new(255.0, 354.0, 151.0, 200.0),
    Band::new(355.0, 424.0, 201.0, 300.0),
    Band::new(425.0, 604.0, 301.0, 500.0),
];

pub const PM2_5: Scale = Scale {
    bands: &PM2_5_BANDS,
    rounding: Rounding::Nearest,
    overflow: Overflow::Cap(MAX_INDEX),
};

pub const PM10: Scale = Scale {
    bands: &PM10_BANDS,
    rounding: Rounding::Nearest,
    overflow: Overflow::Cap(MAX_INDEX),
};

/// EPA AQI categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Level {
    /// 0 to 50
    #[serde(rename = "Good")]
    Good,
    /// 51 to 100
    #[serde(rename = "Moderate")]
    Moderate,
    /// 101 to 150
    #[serde(rename = "Unhealthy for Sensitive Groups")]
    UnhealthyForSensitiveGroups,
    /// 151 to 200
    #[serde(rename = "Unhealthy")]
    Unhealthy,
    /// 201 to 300
    #[serde(rename = "Very Unhealthy")]
    VeryUnhealthy,
    /// 301 and above
    #[serde(rename = "Hazardous")]
    Hazardous,
}

impl Level {
    pub const ALL: [Self; 6] = [
        Self::Good,
        Self::Moderate,
        Self::UnhealthyForSensitiveGroups,
        Self::Unhealthy,
        Self::VeryUnhealthy,
        Self::Hazardous,
    ];

    #[must_use]
    pub fn from_index(index: u16) -> Self {
        match index {
            0..=50 => Self::Good,
            51..=100 => Self::Moderate,
            101..=150 => Self::UnhealthyForSensitiveGroups,
            151..=200 => Self::Unhealthy,
            201..=300 => Self::VeryUnhealthy,
            _ => Self::Hazardous,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Good => "Good",
            Self::Moderate => "Moderate",
            Self::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            Self::Unhealthy => "Unhealthy",
            Self::VeryUnhealthy => "Very Unhealthy",
            Self::Hazardous => "Hazardous",
        }
    }
}

/// Classify 24-hour mean concentrations
#[must_use]
pub fn classify(pm2_5: f64, pm10: f64) -> AqiResult {
    let breakpoints = SubIndices::new(
        PM2_5.sub_index(truncate(pm2_5, 1)),
        PM10.sub_index(truncate(pm10, 0)),
    );
    let index = breakpoints.worst();
    AqiResult {
        index,
        level: AqiLevel::Us(Level::from_index(index)),
        breakpoints,
    }
}
