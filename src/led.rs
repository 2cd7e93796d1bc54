//! Turris Omnia user indicator LEDs
//!
//! Both user LEDs show the colour of the current severity level, the first
//! standing for PM2.5 and the second for PM10. Two backends drive them: the
//! `rainbow` helper shipped with TurrisOS, or the LED class device files.

use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::color::Rgb;
use crate::error::{AqiError, Result};
use crate::sink::{Report, Sink};

pub const RAINBOW_PROGRAM: &str = "rainbow";
pub const SYSFS_ROOT: &str = "/sys/class/leds";

/// User-controllable indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indicator {
    /// User #1, shows PM2.5
    One,
    /// User #2, shows PM10
    Two,
}

impl Indicator {
    pub const ALL: [Self; 2] = [Self::One, Self::Two];

    /// Name understood by `rainbow`
    #[must_use]
    pub fn rainbow_name(&self) -> &'static str {
        match self {
            Self::One => "indicator-1",
            Self::Two => "indicator-2",
        }
    }

    /// LED class device directory name
    #[must_use]
    pub fn device_name(&self) -> &'static str {
        match self {
            Self::One => "omnia-led:user1",
            Self::Two => "omnia-led:user2",
        }
    }
}

/// Something able to light an indicator in a given colour
pub trait LedBackend {
    /// Take the indicator out of autonomous mode and set its colour
    ///
    /// # Errors
    ///
    /// * `AqiError::SinkFailure` - the LED could not be set
    fn set(&mut self, indicator: Indicator, color: Rgb) -> Result<()>;
}

/// Drives the LEDs through the `rainbow` command line helper
#[derive(Debug, Clone)]
pub struct RainbowCommand {
    program: String,
}

impl RainbowCommand {
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Arguments of one invocation, e.g. `indicator-1 0,255,0 enable`
    #[must_use]
    pub fn args(indicator: Indicator, color: Rgb) -> [String; 3] {
        [
            indicator.rainbow_name().to_string(),
            color.to_string(),
            "enable".to_string(),
        ]
    }
}

impl Default for RainbowCommand {
    fn default() -> Self {
        Self::new(RAINBOW_PROGRAM)
    }
}

impl LedBackend for RainbowCommand {
    fn set(&mut self, indicator: Indicator, color: Rgb) -> Result<()> {
        let args = Self::args(indicator, color);
        debug!("Running {} {}", self.program, args.join(" "));
        let status = Command::new(&self.program)
            .args(&args)
            .status()
            .map_err(|err| AqiError::sink("led", format!("{}: {err}", self.program)))?;
        if status.success() {
            Ok(())
        } else {
            Err(AqiError::sink(
                "led",
                format!("{} exited with {status}", self.program),
            ))
        }
    }
}

/// Writes the LED class device files directly
#[derive(Debug, Clone)]
pub struct SysfsLeds {
    root: PathBuf,
}

impl SysfsLeds {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn write(path: &Path, contents: &str) -> Result<()> {
        fs::write(path, contents)
            .map_err(|err| AqiError::sink("led", format!("{}: {err}", path.display())))
    }
}

impl Default for SysfsLeds {
    fn default() -> Self {
        Self::new(SYSFS_ROOT)
    }
}

impl LedBackend for SysfsLeds {
    fn set(&mut self, indicator: Indicator, color: Rgb) -> Result<()> {
        let device = self.root.join(indicator.device_name());
        Self::write(&device.join("autonomous"), "0\n")?;
        Self::write(&device.join("color"), &format!("{}\n", color.to_device_string()))
    }
}

/// Sink lighting both indicators with the report colour
pub struct LedSink<B> {
    backend: B,
}

impl<B: LedBackend> LedSink<B> {
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self { backend }
    }
}

impl<B: LedBackend> Sink for LedSink<B> {
    fn name(&self) -> &'static str {
        "led"
    }

    fn publish(&mut self, report: &Report) -> Result<()> {
        // No colour: leave the indicators as they are
        let Some(color) = report.color else {
            return Ok(());
        };
        for indicator in Indicator::ALL {
            self.backend.set(indicator, color)?;
        }
        Ok(())
    }
}
