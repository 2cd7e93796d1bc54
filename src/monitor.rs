//! The measurement cycle driving sensor, window, classifier and sinks
//!
//! One cycle wakes the sensor, averages its samples, puts it back to sleep,
//! pushes the reading into the window, classifies the windowed average and
//! hands the resulting [`Report`] to every sink. The monitor then idles for
//! the configured delay before the next cycle.

use chrono::Local;
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::aqi::{AqiResult, classify};
use crate::color::{Palette, Rgb};
use crate::config::Settings;
use crate::error::Result;
use crate::reading::{SamplingTiming, aggregate};
use crate::sensor::{Clock, Sensor};
use crate::sink::{Report, Sink};
use crate::standard::AqiStandard;
use crate::window::Window;

/// Measurement loop over one sensor
pub struct Monitor<S, C> {
    sensor: S,
    clock: C,
    standard: AqiStandard,
    timing: SamplingTiming,
    cycle_delay: Duration,
    window: Window,
    palette: Palette,
    sinks: Vec<Box<dyn Sink>>,
    max_sensor_failures: u32,
    sensor_failures: u32,
}

impl<S: Sensor, C: Clock> Monitor<S, C> {
    /// Build a monitor without touching the sensor
    ///
    /// # Errors
    ///
    /// * `AqiError::InvalidConfiguration` - the settings cannot drive a monitor
    pub fn new(settings: &Settings, sensor: S, clock: C) -> Result<Self> {
        settings.validate()?;
        let window = Window::for_standard(settings.standard, settings.cycle_delay)?;
        info!(
            "Monitoring {} AQI, averaging {} readings taken every {}s",
            settings.standard,
            window.capacity(),
            settings.cycle_delay.as_secs()
        );
        Ok(Self {
            sensor,
            clock,
            standard: settings.standard,
            timing: settings.timing,
            cycle_delay: settings.cycle_delay,
            window,
            palette: Palette::new(settings.standard),
            sinks: Vec::new(),
            max_sensor_failures: settings.max_sensor_failures,
            sensor_failures: 0,
        })
    }

    /// Add a sink receiving every report
    #[must_use]
    pub fn with_sink(mut self, sink: impl Sink + 'static) -> Self {
        self.add_sink(Box::new(sink));
        self
    }

    pub fn add_sink(&mut self, sink: Box<dyn Sink>) {
        debug!("Publishing to {} sink", sink.name());
        self.sinks.push(sink);
    }

    #[must_use]
    pub fn standard(&self) -> AqiStandard {
        self.standard
    }

    #[must_use]
    pub fn window(&self) -> &Window {
        &self.window
    }

    #[must_use]
    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Run a single measurement cycle, without the idle delay
    ///
    /// Sink failures are logged and do not fail the cycle.
    ///
    /// # Errors
    ///
    /// * `AqiError::SensorIo` / `AqiError::InvalidFrame` - the sensor failed, nothing was published
    pub fn run_cycle(&mut self) -> Result<Report> {
        let reading = aggregate(&mut self.sensor, &mut self.clock, &self.timing)?;
        let timestamp = Local::now();
        let average = self.window.push(reading);
        let aqi = classify(self.standard, &average);
        let color = self.color(&aqi);

        info!(
            "PM2.5 {:.1} PM10 {:.1}, average of {} readings gives {} AQI {} ({})",
            reading.pm2_5,
            reading.pm10,
            self.window.len(),
            self.standard,
            aqi.index,
            aqi.level
        );

        let report = Report {
            timestamp,
            reading,
            average,
            aqi,
            color,
        };
        self.publish(&report);
        Ok(report)
    }

    /// Run `cycles` cycles, idling between them
    ///
    /// Returns the reports of the cycles that produced one.
    ///
    /// # Errors
    ///
    /// * `AqiError::SensorIo` / `AqiError::InvalidFrame` - more consecutive sensor
    ///   failures than tolerated
    pub fn run_cycles(&mut self, cycles: usize) -> Result<Vec<Report>> {
        let mut reports = Vec::with_capacity(cycles);
        for cycle in 0..cycles {
            if cycle > 0 {
                self.idle();
            }
            if let Some(report) = self.tolerant_cycle()? {
                reports.push(report);
            }
        }
        Ok(reports)
    }

    /// Run cycles until `stop` is set
    ///
    /// `stop` is checked between cycles, a cycle in progress always completes.
    ///
    /// # Errors
    ///
    /// * `AqiError::SensorIo` / `AqiError::InvalidFrame` - more consecutive sensor
    ///   failures than tolerated
    pub fn run(&mut self, stop: &AtomicBool) -> Result<()> {
        while !stop.load(Ordering::Relaxed) {
            self.tolerant_cycle()?;
            if stop.load(Ordering::Relaxed) {
                break;
            }
            self.idle();
        }
        info!("Monitor stopped");
        Ok(())
    }

    fn tolerant_cycle(&mut self) -> Result<Option<Report>> {
        match self.run_cycle() {
            Ok(report) => {
                self.sensor_failures = 0;
                Ok(Some(report))
            }
            Err(err) if err.is_sensor_error() && self.sensor_failures < self.max_sensor_failures => {
                self.sensor_failures += 1;
                warn!(
                    "Measurement failed ({} of {} tolerated): {err}",
                    self.sensor_failures, self.max_sensor_failures
                );
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn color(&self, aqi: &AqiResult) -> Option<Rgb> {
        match self.palette.color_for_level(aqi.level) {
            Ok(color) => color,
            Err(err) => {
                error!("{err}");
                None
            }
        }
    }

    fn publish(&mut self, report: &Report) {
        for sink in &mut self.sinks {
            if let Err(err) = sink.publish(report) {
                warn!("{err}");
            } else {
                debug!("Published to {} sink", sink.name());
            }
        }
    }

    fn idle(&mut self) {
        debug!("Sleeping {}s until the next measurement", self.cycle_delay.as_secs());
        self.clock.sleep(self.cycle_delay);
    }
}
