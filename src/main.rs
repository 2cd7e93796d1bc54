use std::process::ExitCode;
use std::sync::atomic::AtomicBool;

use aqi_monitor::config::{Cli, LedBackendKind, Settings};
use aqi_monitor::csv_log::CsvLog;
use aqi_monitor::led::{LedSink, RainbowCommand, SysfsLeds};
use aqi_monitor::mqtt::MqttPublisher;
use aqi_monitor::sds011::Sds011;
use aqi_monitor::sensor::ThreadClock;
use aqi_monitor::{Monitor, Result};
use clap::Parser;
use log::{error, info};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = Settings::try_from(cli)?;
    info!("Starting aqi-monitor on {}", settings.sensor_path);

    let sensor = Sds011::open(&settings.sensor_path)?;
    let mut monitor = Monitor::new(&settings, sensor, ThreadClock)?;

    if let Some(path) = &settings.log_path {
        info!("Logging measurements to {}", path.display());
        monitor.add_sink(Box::new(CsvLog::new(path)));
    }
    if let Some(mqtt) = &settings.mqtt {
        info!("Publishing to MQTT broker {}:{} under {}", mqtt.host, mqtt.port, mqtt.base_topic);
        monitor.add_sink(Box::new(MqttPublisher::new(
            mqtt.host.as_str(),
            mqtt.port,
            mqtt.base_topic.as_str(),
        )));
    }
    if let Some(leds) = settings.leds {
        match leds.backend {
            LedBackendKind::Rainbow => monitor.add_sink(Box::new(LedSink::new(RainbowCommand::default()))),
            LedBackendKind::Sysfs => monitor.add_sink(Box::new(LedSink::new(SysfsLeds::default()))),
        }
    }

    // Never set: the process runs until it is terminated
    let stop = AtomicBool::new(false);
    monitor.run(&stop)
}
