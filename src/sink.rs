//! Destinations for the result of a measurement cycle

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::aqi::AqiResult;
use crate::color::Rgb;
use crate::error::Result;
use crate::reading::Reading;
use crate::window::WindowedAverage;

/// Everything a cycle produced, handed to every sink
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Report {
    /// When the cycle finished sampling
    pub timestamp: DateTime<Local>,
    /// Reading of this cycle alone
    pub reading: Reading,
    /// Average over the window the index was computed from
    pub average: WindowedAverage,
    pub aqi: AqiResult,
    /// Indicator colour, `None` when no colour applies
    pub color: Option<Rgb>,
}

/// A best-effort consumer of cycle reports
///
/// Failures are reported to the caller, which logs them and carries on with
/// the next sink. Sinks never retry within a cycle.
pub trait Sink {
    /// Short name used in diagnostics
    fn name(&self) -> &'static str;

    /// Deliver one report
    ///
    /// # Errors
    ///
    /// * `AqiError::SinkFailure` - the report could not be delivered
    fn publish(&mut self, report: &Report) -> Result<()>;
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn publish(&mut self, report: &Report) -> Result<()> {
        (**self).publish(report)
    }
}
