//! Indicator colours for severity levels
//!
//! The palettes favour colours that are easy to tell apart on a small RGB
//! LED over the official colour of each jurisdiction.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::aqi::Level;
use crate::error::{AqiError, Result};
use crate::standard::AqiStandard;

/// 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Space separated form used by LED class devices, e.g. `255 153 0`
    #[must_use]
    pub fn to_device_string(&self) -> String {
        format!("{} {} {}", self.r, self.g, self.b)
    }
}

/// Comma separated form, e.g. `255,153,0`
impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.r, self.g, self.b)
    }
}

const GREEN: Rgb = Rgb::new(0, 255, 0);
const YELLOW: Rgb = Rgb::new(255, 255, 0);
const ORANGE: Rgb = Rgb::new(255, 153, 0);
const RED: Rgb = Rgb::new(255, 0, 0);
const MAROON: Rgb = Rgb::new(128, 0, 0);

/// Mainland China, from excellent to severely polluted
pub const CN_COLORS: [(&str, Rgb); 6] = [
    ("excellent", GREEN),
    ("good", YELLOW),
    ("lightly polluted", ORANGE),
    ("moderately polluted", RED),
    ("heavily polluted", Rgb::new(84, 0, 153)),
    ("severely polluted", MAROON),
];

/// CAQI, from very low to very high
pub const EU_COLORS: [(&str, Rgb); 5] = [
    ("very low", GREEN),
    ("low", Rgb::new(163, 255, 15)),
    ("medium", YELLOW),
    ("high", ORANGE),
    ("very high", RED),
];

/// US EPA, from good to hazardous
pub const US_COLORS: [(&str, Rgb); 6] = [
    ("Good", GREEN),
    ("Moderate", YELLOW),
    ("Unhealthy for Sensitive Groups", Rgb::new(255, 165, 0)),
    ("Unhealthy", RED),
    ("Very Unhealthy", Rgb::new(128, 0, 128)),
    ("Hazardous", MAROON),
];

/// Colour table of a standard, ordered from least to most severe
#[must_use]
pub fn table(standard: AqiStandard) -> &'static [(&'static str, Rgb)] {
    match standard {
        AqiStandard::Cn => &CN_COLORS,
        AqiStandard::Eu => &EU_COLORS,
        AqiStandard::Us => &US_COLORS,
    }
}

/// Maps severity levels to colours for the standard shown on the indicators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    display: AqiStandard,
}

impl Palette {
    #[must_use]
    pub fn new(display: AqiStandard) -> Self {
        Self { display }
    }

    #[must_use]
    pub fn display_standard(&self) -> AqiStandard {
        self.display
    }

    /// Colour for the level named `level` of `standard`
    ///
    /// Levels of a standard other than the displayed one have no colour.
    ///
    /// # Errors
    ///
    /// * `AqiError::UnknownSeverityLevel` - `level` is not a level of the displayed standard
    pub fn color_for(&self, level: &str, standard: AqiStandard) -> Result<Option<Rgb>> {
        if standard != self.display {
            return Ok(None);
        }
        table(standard)
            .iter()
            .find(|(name, _)| *name == level)
            .map(|(_, rgb)| Some(*rgb))
            .ok_or_else(|| AqiError::UnknownSeverityLevel {
                level: level.to_string(),
                standard,
            })
    }

    /// Colour for a classified level
    ///
    /// # Errors
    ///
    /// * `AqiError::UnknownSeverityLevel` - the colour table lacks the level
    pub fn color_for_level(&self, level: Level) -> Result<Option<Rgb>> {
        self.color_for(level.name(), level.standard())
    }
}
