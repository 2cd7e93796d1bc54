//! Sensor and clock capabilities used by the measurement cycle

use std::time::Duration;

use crate::error::Result;

/// A particulate matter sensor with a power-saving sleep mode
pub trait Sensor {
    /// Bring the sensor out of sleep, starting its fan and laser
    fn wake(&mut self) -> Result<()>;

    /// Query one `(pm2_5, pm10)` sample in ug/m3
    fn take_reading(&mut self) -> Result<(f64, f64)>;

    /// Put the sensor back to sleep
    fn sleep(&mut self) -> Result<()>;
}

impl<S: Sensor + ?Sized> Sensor for Box<S> {
    fn wake(&mut self) -> Result<()> {
        (**self).wake()
    }

    fn take_reading(&mut self) -> Result<(f64, f64)> {
        (**self).take_reading()
    }

    fn sleep(&mut self) -> Result<()> {
        (**self).sleep()
    }
}

/// Blocking wait between sensor operations and cycles
pub trait Clock {
    fn sleep(&mut self, duration: Duration);
}

/// Clock backed by `std::thread::sleep`
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadClock;

impl Clock for ThreadClock {
    fn sleep(&mut self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}
