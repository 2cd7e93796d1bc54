//! Sliding window of per-cycle readings
//!
//! Each standard averages concentrations over its own period (one hour for
//! CAQI, 24 hours for the CN and US indices). The window keeps as many cycles
//! as fit in that period and averages whatever it holds, so a freshly started
//! monitor reports from its first cycle.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

use crate::error::{AqiError, Result};
use crate::reading::Reading;
use crate::standard::AqiStandard;

/// Mean concentrations over the readings currently held by a [`Window`]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct WindowedAverage {
    pub pm2_5: f64,
    pub pm10: f64,
}

/// Fixed-capacity FIFO of readings
#[derive(Debug, Clone)]
pub struct Window {
    readings: VecDeque<Reading>,
    capacity: usize,
}

impl Window {
    /// Create a window holding at most `capacity` readings (at least one)
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            readings: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Create a window spanning the averaging period of `standard` when one
    /// reading is taken every `cycle_delay`
    ///
    /// # Errors
    ///
    /// * `AqiError::InvalidConfiguration` - `cycle_delay` is zero
    pub fn for_standard(standard: AqiStandard, cycle_delay: Duration) -> Result<Self> {
        Ok(Self::with_capacity(capacity_for(standard, cycle_delay)?))
    }

    /// Append a reading, evicting the oldest one when full, and return the new average
    pub fn push(&mut self, reading: Reading) -> WindowedAverage {
        if self.readings.len() == self.capacity {
            self.readings.pop_front();
        }
        self.readings.push_back(reading);
        self.average()
    }

    /// Average of the current contents, `None` before the first push
    #[must_use]
    pub fn current_average(&self) -> Option<WindowedAverage> {
        (!self.readings.is_empty()).then(|| self.average())
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Readings from oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.readings.iter()
    }

    fn average(&self) -> WindowedAverage {
        let count = self.readings.len() as f64;
        let (pm2_5, pm10) = self
            .readings
            .iter()
            .fold((0.0, 0.0), |(a, b), r| (a + r.pm2_5, b + r.pm10));
        WindowedAverage {
            pm2_5: pm2_5 / count,
            pm10: pm10 / count,
        }
    }
}

/// Number of cycles that fit in the averaging period of `standard`
///
/// A delay longer than the period still keeps one reading.
///
/// # Errors
///
/// * `AqiError::InvalidConfiguration` - `cycle_delay` is zero
pub fn capacity_for(standard: AqiStandard, cycle_delay: Duration) -> Result<usize> {
    let delay = cycle_delay.as_secs();
    if delay == 0 {
        return Err(AqiError::config("delay between measures must be at least 1 second"));
    }
    let cycles = standard.interval().as_secs() / delay;
    Ok(usize::try_from(cycles).unwrap_or(usize::MAX).max(1))
}
