//! Command line options and the validated settings derived from them

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AqiError, Result};
use crate::mqtt::DEFAULT_PORT;
use crate::reading::SamplingTiming;
use crate::standard::AqiStandard;

/// Measure air quality using an SDS011 sensor
#[derive(Debug, Clone, Parser)]
#[command(name = "aqi-monitor", version, about)]
pub struct Cli {
    /// Country code (ISO 3166-1 alpha-2) of the AQI standard: CN (Mainland
    /// China AQI), EU (CAQI) or US (EPA AQI)
    #[arg(short, long, default_value = "EU", value_name = "COUNTRY")]
    pub country: String,

    /// Seconds to pause after a measurement before taking the next one
    #[arg(short, long, default_value_t = 1200, value_name = "SECONDS")]
    pub delay: u64,

    /// CSV file the measurements are appended to
    #[arg(short, long, value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Number of consecutive samples averaged into one measurement
    #[arg(short, long, default_value_t = 3, value_name = "N")]
    pub measures: u32,

    /// IP address or hostname of the MQTT broker
    #[arg(short = 'n', long, value_name = "IP/HOSTNAME")]
    pub mqtt_hostname: Option<String>,

    /// Port number of the MQTT broker
    #[arg(short = 'r', long, default_value_t = DEFAULT_PORT, value_name = "PORT")]
    pub mqtt_port: u16,

    /// Parent MQTT topic
    #[arg(short = 'i', long, default_value = "aqi", value_name = "TOPIC")]
    pub mqtt_base_topic: String,

    /// Set the Turris Omnia user LEDs to the colour of the AQI level
    #[arg(short, long)]
    pub omnia_leds: bool,

    /// How the LEDs are driven
    #[arg(long, value_enum, default_value_t = LedBackendKind::Rainbow)]
    pub led_backend: LedBackendKind,

    /// Path to the SDS011 sensor
    #[arg(short, long, default_value = "/dev/ttyUSB0", value_name = "FILE")]
    pub sensor: String,

    /// Seconds to let the sensor perform an operation: taking a sample or going to sleep
    #[arg(short = 'p', long, default_value_t = 1, value_name = "SECONDS")]
    pub sensor_operation_delay: u64,

    /// Seconds to let the sensor start
    #[arg(short = 't', long, default_value_t = 10, value_name = "SECONDS")]
    pub sensor_start_delay: u64,

    /// Consecutive failed measurements tolerated before exiting
    #[arg(long, default_value_t = 0, value_name = "N")]
    pub max_sensor_failures: u32,
}

/// LED driver selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LedBackendKind {
    /// The `rainbow` command of TurrisOS
    Rainbow,
    /// Direct writes to `/sys/class/leds`
    Sysfs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MqttSettings {
    pub host: String,
    pub port: u16,
    pub base_topic: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedSettings {
    pub backend: LedBackendKind,
}

/// Validated monitor settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub standard: AqiStandard,
    pub cycle_delay: Duration,
    pub timing: SamplingTiming,
    pub sensor_path: String,
    pub log_path: Option<PathBuf>,
    pub mqtt: Option<MqttSettings>,
    pub leds: Option<LedSettings>,
    pub max_sensor_failures: u32,
}

impl Settings {
    /// Settings for `standard` with the command line defaults otherwise
    #[must_use]
    pub fn new(standard: AqiStandard) -> Self {
        Self {
            standard,
            cycle_delay: Duration::from_secs(1200),
            timing: SamplingTiming::default(),
            sensor_path: "/dev/ttyUSB0".to_string(),
            log_path: None,
            mqtt: None,
            leds: None,
            max_sensor_failures: 0,
        }
    }

    /// Check the values no monitor can run with
    ///
    /// # Errors
    ///
    /// * `AqiError::InvalidConfiguration` - zero samples or zero cycle delay
    pub fn validate(&self) -> Result<()> {
        if self.timing.samples == 0 {
            return Err(AqiError::config("number of measures must be at least 1"));
        }
        if self.cycle_delay.as_secs() == 0 {
            return Err(AqiError::config("delay between measures must be at least 1 second"));
        }
        if let Some(mqtt) = &self.mqtt {
            if mqtt.host.trim().is_empty() {
                return Err(AqiError::config("MQTT hostname must not be empty"));
            }
        }
        Ok(())
    }
}

impl TryFrom<Cli> for Settings {
    type Error = AqiError;

    fn try_from(cli: Cli) -> Result<Self> {
        let standard = cli
            .country
            .parse::<AqiStandard>()
            .map_err(|err| AqiError::config(err.to_string()))?;

        let settings = Self {
            standard,
            cycle_delay: Duration::from_secs(cli.delay),
            timing: SamplingTiming {
                samples: cli.measures,
                start_delay: Duration::from_secs(cli.sensor_start_delay),
                operation_delay: Duration::from_secs(cli.sensor_operation_delay),
            },
            sensor_path: cli.sensor,
            log_path: cli.log,
            mqtt: cli.mqtt_hostname.map(|host| MqttSettings {
                host,
                port: cli.mqtt_port,
                base_topic: cli.mqtt_base_topic,
            }),
            leds: cli.omnia_leds.then_some(LedSettings {
                backend: cli.led_backend,
            }),
            max_sensor_failures: cli.max_sensor_failures,
        };
        settings.validate()?;
        Ok(settings)
    }
}
