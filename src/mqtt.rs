//! MQTT publication of cycle results
//!
//! Each cycle opens a short-lived connection, publishes four non-retained
//! QoS 0 messages under the base topic and disconnects:
//!
//! | Topic                 | Payload                           |
//! |-----------------------|-----------------------------------|
//! | `<base>/aqi`          | index of the windowed average      |
//! | `<base>/level`        | level name, e.g. `very low`       |
//! | `<base>/current_pm25` | PM2.5 of this cycle, one decimal  |
//! | `<base>/current_pm10` | PM10 of this cycle, one decimal   |

use log::debug;
use rumqttc::{Client, Event, MqttOptions, Outgoing, QoS};
use std::time::Duration;

use crate::error::{AqiError, Result};
use crate::sink::{Report, Sink};

pub const DEFAULT_PORT: u16 = 1883;
pub const CLIENT_ID: &str = "aqi-monitor";

/// One message to publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub topic: String,
    pub payload: String,
}

/// Base topic without trailing slashes
#[must_use]
pub fn normalize_topic(base: &str) -> &str {
    base.trim_end_matches('/')
}

/// Messages describing `report` under `base_topic`
#[must_use]
pub fn messages(base_topic: &str, report: &Report) -> Vec<Message> {
    let base = normalize_topic(base_topic);
    let message = |leaf: &str, payload: String| Message {
        topic: format!("{base}/{leaf}"),
        payload,
    };
    vec![
        message("aqi", report.aqi.index.to_string()),
        message("level", report.aqi.level.name().to_string()),
        message("current_pm25", format!("{:.1}", report.reading.pm2_5)),
        message("current_pm10", format!("{:.1}", report.reading.pm10)),
    ]
}

/// Publishes reports to an MQTT broker
#[derive(Debug, Clone)]
pub struct MqttPublisher {
    host: String,
    port: u16,
    base_topic: String,
}

impl MqttPublisher {
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16, base_topic: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            base_topic: base_topic.into(),
        }
    }

    fn send(&self, messages: Vec<Message>) -> Result<()> {
        let mut options = MqttOptions::new(CLIENT_ID, self.host.as_str(), self.port);
        options.set_keep_alive(Duration::from_secs(5));

        let (mut client, mut connection) = Client::new(options, messages.len() + 1);
        for message in messages {
            client
                .publish(message.topic, QoS::AtMostOnce, false, message.payload)
                .map_err(|err| AqiError::sink("mqtt", err))?;
        }
        client
            .disconnect()
            .map_err(|err| AqiError::sink("mqtt", err))?;

        // Drive the event loop until the queued requests are flushed
        for notification in connection.iter() {
            match notification {
                Ok(Event::Outgoing(Outgoing::Disconnect)) => break,
                Ok(event) => debug!("MQTT event: {event:?}"),
                Err(err) => {
                    return Err(AqiError::sink(
                        "mqtt",
                        format!("{}:{}: {err}", self.host, self.port),
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Sink for MqttPublisher {
    fn name(&self) -> &'static str {
        "mqtt"
    }

    fn publish(&mut self, report: &Report) -> Result<()> {
        self.send(messages(&self.base_topic, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aqi::classify;
    use crate::reading::Reading;
    use crate::standard::AqiStandard;
    use crate::window::WindowedAverage;
    use chrono::Local;
    use rstest::rstest;

    fn report(standard: AqiStandard) -> Report {
        let average = WindowedAverage {
            pm2_5: 20.0,
            pm10: 30.0,
        };
        Report {
            timestamp: Local::now(),
            reading: Reading::new(20.0, 31.4),
            average,
            aqi: classify(standard, &average),
            color: None,
        }
    }

    #[rstest]
    #[case("aqi", "aqi")]
    #[case("aqi/", "aqi")]
    #[case("home/balcony//", "home/balcony")]
    fn strips_trailing_slashes(#[case] base: &str, #[case] expected: &str) {
        assert_eq!(normalize_topic(base), expected);
    }

    #[test]
    fn publishes_four_topics() {
        let messages = messages("home/aqi/", &report(AqiStandard::Us));
        let pairs: Vec<(&str, &str)> = messages
            .iter()
            .map(|m| (m.topic.as_str(), m.payload.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("home/aqi/aqi", "71"),
                ("home/aqi/level", "Moderate"),
                ("home/aqi/current_pm25", "20.0"),
                ("home/aqi/current_pm10", "31.4"),
            ]
        );
    }

    #[test]
    fn unreachable_broker_is_a_sink_failure() {
        // Port 9 (discard) is closed on test machines
        let mut publisher = MqttPublisher::new("127.0.0.1", 9, "aqi");
        assert!(matches!(
            publisher.publish(&report(AqiStandard::Eu)),
            Err(AqiError::SinkFailure { sink: "mqtt", .. })
        ));
    }
}
