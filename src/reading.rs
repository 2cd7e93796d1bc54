//! Per-cycle particulate matter readings
//!
//! A cycle wakes the sensor, lets it stabilize, averages a fixed number of
//! samples and puts the sensor back to sleep. The averaged values are rounded
//! to one decimal, half away from zero, which is the resolution the sensor
//! reports at.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{AqiError, Result};
use crate::sensor::{Clock, Sensor};

/// PM2.5 and PM10 concentrations in ug/m3
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Reading {
    pub pm2_5: f64,
    pub pm10: f64,
}

impl Reading {
    #[must_use]
    pub fn new(pm2_5: f64, pm10: f64) -> Self {
        Self { pm2_5, pm10 }
    }
}

/// Number of samples per cycle and the waits around them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingTiming {
    /// Samples averaged into one reading
    pub samples: u32,
    /// Time for the sensor to start after waking (10 s gives stable values)
    pub start_delay: Duration,
    /// Time for the sensor to complete an operation
    pub operation_delay: Duration,
}

impl Default for SamplingTiming {
    fn default() -> Self {
        Self {
            samples: 3,
            start_delay: Duration::from_secs(10),
            operation_delay: Duration::from_secs(1),
        }
    }
}

/// Round to one decimal digit, half away from zero
#[must_use]
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Take `timing.samples` consecutive samples and average them into one reading
///
/// The sensor is asleep again when this returns, unless putting it to sleep
/// is what failed.
///
/// # Errors
///
/// * `AqiError::InvalidConfiguration` - sample count is zero, no sensor I/O is done
/// * `AqiError::SensorIo` / `AqiError::InvalidFrame` - a sensor operation failed
pub fn aggregate<S, C>(sensor: &mut S, clock: &mut C, timing: &SamplingTiming) -> Result<Reading>
where
    S: Sensor + ?Sized,
    C: Clock + ?Sized,
{
    if timing.samples == 0 {
        return Err(AqiError::config("number of measures must be at least 1"));
    }

    sensor.wake()?;
    clock.sleep(timing.start_delay);

    let sums = match sample(sensor, clock, timing) {
        Ok(sums) => sums,
        Err(err) => {
            if let Err(sleep_err) = sensor.sleep() {
                warn!("Could not put sensor to sleep after failed query: {sleep_err}");
            }
            return Err(err);
        }
    };

    let count = f64::from(timing.samples);
    let reading = Reading::new(
        round_one_decimal(sums.0 / count),
        round_one_decimal(sums.1 / count),
    );
    debug!(
        "Averaged {} samples: pm2.5={:.1} pm10={:.1}",
        timing.samples, reading.pm2_5, reading.pm10
    );

    sensor.sleep()?;
    clock.sleep(timing.operation_delay);

    Ok(reading)
}

fn sample<S, C>(sensor: &mut S, clock: &mut C, timing: &SamplingTiming) -> Result<(f64, f64)>
where
    S: Sensor + ?Sized,
    C: Clock + ?Sized,
{
    let mut sums = (0.0, 0.0);
    for _ in 0..timing.samples {
        let (pm2_5, pm10) = sensor.take_reading()?;
        sums.0 += pm2_5;
        sums.1 += pm10;
        clock.sleep(timing.operation_delay);
    }
    Ok(sums)
}
