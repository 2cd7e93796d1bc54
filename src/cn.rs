//! Mainland China Air Quality Index (HJ 633-2012)
//!
//! Individual AQI (IAQI) per pollutant from 24-hour mean concentrations.
//! Interpolated values are always rounded up, and concentrations beyond the
//! last breakpoint report the table maximum.

use serde::{Deserialize, Serialize};

use crate::aqi::{AqiResult, Band, Level as AqiLevel, Overflow, Rounding, Scale, SubIndices};

/// Highest IAQI the table defines
pub const MAX_INDEX: u16 = 500;

const PM2_5_BANDS: [Band; 7] = [
    Band::new(0.0, 35.0, 0.0, 50.0),
    Band::new(35.0, 75.0, 50.0, 100.0),
    Band::new(75.0, 115.0, 100.0, 150.0),
    Band::new(115.0, 150.0, 150.0, 200.0),
    Band::new(150.0, 250.0, 200.0, 300.0),
    Band::new(250.0, 350.0, 300.0, 400.0),
    Band::new(350.0, 500.0, 400.0, 500.0),
];

const PM10_BANDS: [Band; 7] = [
    Band::new(0.0, 50.0, 0.0, 50.0),
    Band::new(50.0, 150.0, 50.0, 100.0),
    Band::new(150.0, 250.0, 100.0, 150.0),
    Band::new(250.0, 350.0, 150.0, 200.0),
    Band::new(350.0, 420.0, 200.0, 300.0),
    Band::new(420.0, 500.0, 300.0, 400.0),
    Band::new(500.0, 600.0, 400.0, 500.0),
];

pub const PM2_5: Scale = Scale {
    bands: &PM2_5_BANDS,
    rounding: Rounding::Up,
    overflow: Overflow::Cap(MAX_INDEX),
};

pub const PM10: Scale = Scale {
    bands: &PM10_BANDS,
    rounding: Rounding::Up,
    overflow: Overflow::Cap(MAX_INDEX),
};

/// AQI grades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Level {
    /// Grade I, 0 to 50
    #[serde(rename = "excellent")]
    Excellent,
    /// Grade II, 51 to 100
    #[serde(rename = "good")]
    Good,
    /// Grade III, 101 to 150
    #[serde(rename = "lightly polluted")]
    LightlyPolluted,
    /// Grade IV, 151 to 200
    #[serde(rename = "moderately polluted")]
    ModeratelyPolluted,
    /// Grade V, 201 to 300
    #[serde(rename = "heavily polluted")]
    HeavilyPolluted,
    /// Grade VI, above 300
    #[serde(rename = "severely polluted")]
    SeverelyPolluted,
}

impl Level {
    pub const ALL: [Self; 6] = [
        Self::Excellent,
        Self::Good,
        Self::LightlyPolluted,
        Self::ModeratelyPolluted,
        Self::HeavilyPolluted,
        Self::SeverelyPolluted,
    ];

    #[must_use]
    pub fn from_index(index: u16) -> Self {
        match index {
            0..=50 => Self::Excellent,
            51..=100 => Self::Good,
            101..=150 => Self::LightlyPolluted,
            151..=200 => Self::ModeratelyPolluted,
            201..=300 => Self::HeavilyPolluted,
            _ => Self::SeverelyPolluted,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Good => "good",
            Self::LightlyPolluted => "lightly polluted",
            Self::ModeratelyPolluted => "moderately polluted",
            Self::HeavilyPolluted => "heavily polluted",
            Self::SeverelyPolluted => "severely polluted",
        }
    }
}

/// Classify 24-hour mean concentrations
#[must_use]
pub fn classify(pm2_5: f64, pm10: f64) -> AqiResult {
    let breakpoints = SubIndices::new(PM2_5.sub_index(pm2_5), PM10.sub_index(pm10));
    let index = breakpoints.worst();
    AqiResult {
        index,
        level: AqiLevel::Cn(Level::from_index(index)),
        breakpoints,
    }
}
