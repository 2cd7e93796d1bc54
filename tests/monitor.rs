use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use aqi_monitor::config::{Cli, Settings};
use aqi_monitor::csv_log::CsvLog;
use aqi_monitor::sensor::{Clock, Sensor};
use aqi_monitor::{AqiError, AqiStandard, Monitor, Report, Result, Rgb, Sink, WindowedAverage};
use clap::Parser;

/// Sensor replaying one `(pm2_5, pm10)` sample per query and counting operations
#[derive(Clone, Default)]
struct FakeSensor {
    samples: Rc<RefCell<VecDeque<Result<(f64, f64)>>>>,
    operations: Rc<RefCell<usize>>,
}

impl FakeSensor {
    fn with_samples(samples: impl IntoIterator<Item = Result<(f64, f64)>>) -> Self {
        Self {
            samples: Rc::new(RefCell::new(samples.into_iter().collect())),
            operations: Rc::default(),
        }
    }

    fn operations(&self) -> usize {
        *self.operations.borrow()
    }
}

impl Sensor for FakeSensor {
    fn wake(&mut self) -> Result<()> {
        *self.operations.borrow_mut() += 1;
        Ok(())
    }

    fn take_reading(&mut self) -> Result<(f64, f64)> {
        *self.operations.borrow_mut() += 1;
        self.samples
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(AqiError::SensorIo("no more samples".into())))
    }

    fn sleep(&mut self) -> Result<()> {
        *self.operations.borrow_mut() += 1;
        Ok(())
    }
}

#[derive(Default)]
struct RecordingClock {
    sleeps: Vec<Duration>,
}

impl Clock for RecordingClock {
    fn sleep(&mut self, duration: Duration) {
        self.sleeps.push(duration);
    }
}

#[derive(Clone, Default)]
struct CollectingSink {
    reports: Rc<RefCell<Vec<Report>>>,
}

impl Sink for CollectingSink {
    fn name(&self) -> &'static str {
        "collect"
    }

    fn publish(&mut self, report: &Report) -> Result<()> {
        self.reports.borrow_mut().push(*report);
        Ok(())
    }
}

struct BrokenSink;

impl Sink for BrokenSink {
    fn name(&self) -> &'static str {
        "broken"
    }

    fn publish(&mut self, _report: &Report) -> Result<()> {
        Err(AqiError::sink("broken", "connection refused"))
    }
}

fn settings(args: &[&str]) -> Result<Settings> {
    let cli = Cli::try_parse_from(["aqi-monitor", "-m", "1"].iter().chain(args).copied()).unwrap();
    Settings::try_from(cli)
}

fn readings(pairs: &[(f64, f64)]) -> Vec<Result<(f64, f64)>> {
    pairs.iter().map(|pair| Ok(*pair)).collect()
}

#[test]
fn eu_hourly_window_over_three_cycles() {
    let settings = settings(&["-c", "EU", "-d", "1200"]).unwrap();
    let sensor = FakeSensor::with_samples(readings(&[(10.0, 20.0), (20.0, 30.0), (30.0, 40.0)]));
    let sink = CollectingSink::default();

    let mut monitor = Monitor::new(&settings, sensor, RecordingClock::default())
        .unwrap()
        .with_sink(sink.clone());
    assert_eq!(monitor.window().capacity(), 3);

    let reports = monitor.run_cycles(3).unwrap();
    assert_eq!(reports.len(), 3);

    let last = reports[2];
    assert_eq!(
        last.average,
        WindowedAverage {
            pm2_5: 20.0,
            pm10: 30.0
        }
    );
    assert_eq!(last.aqi.index, 34);
    assert_eq!(last.aqi.level.name(), "low");
    assert_eq!(last.color, Some(Rgb::new(163, 255, 15)));
    assert_eq!(sink.reports.borrow().as_slice(), reports.as_slice());
}

#[test]
fn fourth_cycle_evicts_first_reading() {
    let settings = settings(&["-c", "EU", "-d", "1200"]).unwrap();
    let sensor = FakeSensor::with_samples(readings(&[
        (10.0, 20.0),
        (20.0, 30.0),
        (30.0, 40.0),
        (40.0, 50.0),
    ]));

    let mut monitor = Monitor::new(&settings, sensor, RecordingClock::default()).unwrap();
    let reports = monitor.run_cycles(4).unwrap();

    assert_eq!(monitor.window().len(), 3);
    assert_eq!(
        reports[3].average,
        WindowedAverage {
            pm2_5: 30.0,
            pm10: 40.0
        }
    );
    assert_eq!(reports[3].reading.pm2_5, 40.0);
}

#[test]
fn cycle_delay_is_slept_between_cycles() {
    let settings = settings(&["-c", "US", "-d", "600", "-t", "10", "-p", "1"]).unwrap();
    let sensor = FakeSensor::with_samples(readings(&[(5.0, 5.0), (5.0, 5.0)]));

    let mut monitor = Monitor::new(&settings, sensor, RecordingClock::default()).unwrap();
    monitor.run_cycles(2).unwrap();

    let secs = |n| Duration::from_secs(n);
    assert_eq!(
        monitor.clock().sleeps,
        vec![secs(10), secs(1), secs(1), secs(600), secs(10), secs(1), secs(1)]
    );
}

#[test]
fn unsupported_country_fails_before_sensor_io() {
    let sensor = FakeSensor::with_samples(readings(&[(5.0, 5.0)]));

    let result = settings(&["-c", "FR"])
        .and_then(|settings| Monitor::new(&settings, sensor.clone(), RecordingClock::default()));

    match result {
        Err(AqiError::InvalidConfiguration(message)) => assert!(message.contains("FR")),
        Err(err) => panic!("unexpected error: {err}"),
        Ok(_) => panic!("FR must be rejected"),
    }
    assert_eq!(sensor.operations(), 0);
}

#[test]
fn sink_failure_does_not_abort_cycle() {
    let settings = settings(&["-c", "CN"]).unwrap();
    let sensor = FakeSensor::with_samples(readings(&[(5.0, 5.0)]));
    let collecting = CollectingSink::default();

    let mut monitor = Monitor::new(&settings, sensor, RecordingClock::default())
        .unwrap()
        .with_sink(BrokenSink)
        .with_sink(collecting.clone());

    let report = monitor.run_cycle().unwrap();
    assert_eq!(report.aqi.level.name(), "excellent");
    assert_eq!(collecting.reports.borrow().len(), 1);
}

#[test]
fn sensor_failure_is_fatal_by_default() {
    let settings = settings(&[]).unwrap();
    let sensor = FakeSensor::with_samples([Err(AqiError::SensorIo("timeout".into()))]);
    let collecting = CollectingSink::default();

    let mut monitor = Monitor::new(&settings, sensor, RecordingClock::default())
        .unwrap()
        .with_sink(collecting.clone());

    assert_eq!(
        monitor.run_cycles(3),
        Err(AqiError::SensorIo("timeout".into()))
    );
    assert!(collecting.reports.borrow().is_empty());
}

#[test]
fn tolerated_sensor_failure_publishes_nothing_for_that_cycle() {
    let settings = settings(&["--max-sensor-failures", "2"]).unwrap();
    let sensor = FakeSensor::with_samples([
        Ok((10.0, 10.0)),
        Err(AqiError::InvalidFrame("bad checksum".into())),
        Ok((20.0, 20.0)),
    ]);
    let collecting = CollectingSink::default();

    let mut monitor = Monitor::new(&settings, sensor, RecordingClock::default())
        .unwrap()
        .with_sink(collecting.clone());

    let reports = monitor.run_cycles(3).unwrap();
    assert_eq!(reports.len(), 2);
    assert_eq!(collecting.reports.borrow().len(), 2);
    assert_eq!(monitor.window().len(), 2);
    assert_eq!(reports[1].average.pm2_5, 15.0);
}

#[test]
fn consecutive_failures_beyond_limit_stop_the_monitor() {
    let settings = settings(&["--max-sensor-failures", "1"]).unwrap();
    let failure = || Err(AqiError::SensorIo("timeout".into()));
    let sensor = FakeSensor::with_samples([failure(), failure()]);

    let mut monitor = Monitor::new(&settings, sensor, RecordingClock::default()).unwrap();
    assert!(matches!(monitor.run_cycles(3), Err(AqiError::SensorIo(_))));
}

#[test]
fn reports_are_logged_as_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("aqi.csv");
    let settings = settings(&["-c", "US"]).unwrap();
    let sensor = FakeSensor::with_samples(readings(&[(12.34, 56.78)]));

    let mut monitor = Monitor::new(&settings, sensor, RecordingClock::default())
        .unwrap()
        .with_sink(CsvLog::new(&path));
    monitor.run_cycle().unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.ends_with(",12.3,56.8,57,Moderate\n"), "{contents}");
    assert_eq!(monitor.standard(), AqiStandard::Us);
}
