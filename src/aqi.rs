//! AQI classification shared by all standards
//!
//! Every supported standard maps a pollutant concentration to a sub-index by
//! linear interpolation inside a table of breakpoints, and reports the worst
//! of the PM2.5 and PM10 sub-indices. The standards differ in their tables,
//! in how the interpolated value is turned into an integer and in what
//! happens above the last breakpoint.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::standard::AqiStandard;
use crate::window::WindowedAverage;
use crate::{cn, eu, us};

/// One row of a breakpoint table: concentrations `c_low..=c_high` map to
/// indices `i_low..=i_high`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub c_low: f64,
    pub c_high: f64,
    pub i_low: f64,
    pub i_high: f64,
}

impl Band {
    #[must_use]
    pub const fn new(c_low: f64, c_high: f64, i_low: f64, i_high: f64) -> Self {
        Self {
            c_low,
            c_high,
            i_low,
            i_high,
        }
    }

    fn interpolate(&self, concentration: f64) -> f64 {
        let ratio = (concentration - self.c_low) / (self.c_high - self.c_low);
        self.i_low + (self.i_high - self.i_low) * ratio
    }
}

/// How an interpolated sub-index becomes an integer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rounding {
    /// Nearest integer, half away from zero
    Nearest,
    /// Next integer up, so any excess over a breakpoint moves to the next band
    Up,
}

/// What a concentration above the last breakpoint maps to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Overflow {
    /// Fixed maximum index
    Cap(u16),
    /// Continue the slope of the last band
    Extrapolate,
}

/// Breakpoint table of one pollutant in one standard
#[derive(Debug, Clone, Copy)]
pub struct Scale {
    pub bands: &'static [Band],
    pub rounding: Rounding,
    pub overflow: Overflow,
}

impl Scale {
    /// Sub-index for `concentration`; negative or NaN concentrations count as zero
    #[must_use]
    pub fn sub_index(&self, concentration: f64) -> u16 {
        let concentration = concentration.max(0.0);

        let raw = match self.bands.iter().find(|band| concentration <= band.c_high) {
            Some(band) if concentration < band.c_low => band.i_low,
            Some(band) => band.interpolate(concentration),
            None => match (self.overflow, self.bands.last()) {
                (Overflow::Extrapolate, Some(last)) => last.interpolate(concentration),
                (Overflow::Cap(max), _) => return max,
                (Overflow::Extrapolate, None) => return 0,
            },
        };

        let rounded = match self.rounding {
            // Guard against interpolation noise pushing an exact breakpoint up a band
            Rounding::Up => (raw - 1e-9).ceil(),
            Rounding::Nearest => raw.round(),
        };
        // `as` saturates, and indices never get close to `u16::MAX` in practice
        rounded.max(0.0) as u16
    }
}

/// Truncate to `decimals` digits, as regulators require before a table lookup
#[must_use]
pub fn truncate(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    // Compensate for values like 9.1 being stored as 9.0999...
    ((value * factor) + 1e-9).floor() / factor
}

/// Pollutant a sub-index was derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pollutant {
    #[serde(rename = "pm2_5")]
    Pm2_5,
    #[serde(rename = "pm10")]
    Pm10,
}

/// Per-pollutant sub-indices behind an [`AqiResult`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubIndices {
    pub pm2_5: u16,
    pub pm10: u16,
    /// Pollutant with the highest sub-index (PM2.5 on ties)
    pub dominant: Pollutant,
}

impl SubIndices {
    #[must_use]
    pub fn new(pm2_5: u16, pm10: u16) -> Self {
        let dominant = if pm2_5 >= pm10 {
            Pollutant::Pm2_5
        } else {
            Pollutant::Pm10
        };
        Self {
            pm2_5,
            pm10,
            dominant,
        }
    }

    /// The worst sub-index, which is the overall index in every supported standard
    #[must_use]
    pub fn worst(&self) -> u16 {
        self.pm2_5.max(self.pm10)
    }
}

/// Severity level, tagged by the standard that defines it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Level {
    Cn(cn::Level),
    Eu(eu::Level),
    Us(us::Level),
}

impl Level {
    /// Display name of the level as used by the defining standard
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Cn(level) => level.name(),
            Self::Eu(level) => level.name(),
            Self::Us(level) => level.name(),
        }
    }

    #[must_use]
    pub fn standard(&self) -> AqiStandard {
        match self {
            Self::Cn(_) => AqiStandard::Cn,
            Self::Eu(_) => AqiStandard::Eu,
            Self::Us(_) => AqiStandard::Us,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of applying a standard to averaged concentrations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AqiResult {
    pub index: u16,
    pub level: Level,
    pub breakpoints: SubIndices,
}

/// Compute the index, level and sub-indices of `average` under `standard`
#[must_use]
pub fn classify(standard: AqiStandard, average: &WindowedAverage) -> AqiResult {
    match standard {
        AqiStandard::Cn => cn::classify(average.pm2_5, average.pm10),
        AqiStandard::Eu => eu::classify(average.pm2_5, average.pm10),
        AqiStandard::Us => us::classify(average.pm2_5, average.pm10),
    }
}
