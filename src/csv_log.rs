//! Append-only CSV log of cycle results
//!
//! One line per cycle: `timestamp,pm2_5,pm10,index,level`. The readings are
//! the cycle's own values, the index and level come from the windowed
//! average.

use chrono::{DateTime, Local};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{AqiError, Result};
use crate::sink::{Report, Sink};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Format one log line, including the trailing newline
#[must_use]
pub fn format_line(report: &Report) -> String {
    format!(
        "{},{:.1},{:.1},{},{}\n",
        format_timestamp(&report.timestamp),
        report.reading.pm2_5,
        report.reading.pm10,
        report.aqi.index,
        report.aqi.level
    )
}

fn format_timestamp(timestamp: &DateTime<Local>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Appends reports to a CSV file, creating it when missing
#[derive(Debug, Clone)]
pub struct CsvLog {
    path: PathBuf,
}

impl CsvLog {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for CsvLog {
    fn name(&self) -> &'static str {
        "log"
    }

    fn publish(&mut self, report: &Report) -> Result<()> {
        // Reopened every cycle so the file can be rotated or removed between cycles
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|err| AqiError::sink("log", format!("{}: {err}", self.path.display())))?;
        file.write_all(format_line(report).as_bytes())
            .map_err(|err| AqiError::sink("log", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aqi::classify;
    use crate::reading::Reading;
    use crate::standard::AqiStandard;
    use crate::window::WindowedAverage;
    use chrono::TimeZone;
    use insta::assert_snapshot;

    fn report() -> Report {
        let average = WindowedAverage {
            pm2_5: 20.0,
            pm10: 30.0,
        };
        Report {
            timestamp: Local.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap(),
            reading: Reading::new(30.0, 40.0),
            average,
            aqi: classify(AqiStandard::Eu, &average),
            color: None,
        }
    }

    #[test]
    fn line_format() {
        assert_snapshot!(format_line(&report()).trim_end(), @"2024-03-01 08:30:00.000000,30.0,40.0,34,low");
    }

    #[test]
    fn appends_to_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("aqi.csv");
        std::fs::write(&path, "previous run\n").unwrap();

        let mut log = CsvLog::new(&path);
        log.publish(&report()).unwrap();
        log.publish(&report()).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "previous run");
        assert!(lines[2].ends_with(",30.0,40.0,34,low"));
    }

    #[test]
    fn unwritable_path_is_a_sink_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = CsvLog::new(dir.path().join("missing").join("aqi.csv"));
        assert!(matches!(
            log.publish(&report()),
            Err(AqiError::SinkFailure { sink: "log", .. })
        ));
    }
}
