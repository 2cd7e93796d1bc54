//! Nova Fitness SDS011 driver
//!
//! Serial protocol at 9600 8N1, as documented in the "Laser Dust Sensor
//! Control Protocol V1.3". The driver puts the sensor in query mode so it only
//! measures when asked, which preserves the laser diode between cycles.
//!
//! Command frames are 19 bytes:
//! `AA B4 <command> <13 data bytes> FF FF <checksum> AB`
//!
//! Reply frames are 10 bytes:
//! `AA <C0|C5> <6 data bytes> <checksum> AB`

use log::{debug, info};
use std::io::{Read, Write};
use std::time::Duration;

use crate::error::{AqiError, Result};
use crate::sensor::Sensor;

pub const BAUD_RATE: u32 = 9600;
pub const COMMAND_LENGTH: usize = 19;
pub const REPLY_LENGTH: usize = 10;

const HEAD: u8 = 0xAA;
const TAIL: u8 = 0xAB;
const COMMAND_ID: u8 = 0xB4;
const DATA_REPLY: u8 = 0xC0;
const COMMAND_REPLY: u8 = 0xC5;

const CMD_REPORTING_MODE: u8 = 0x02;
const CMD_QUERY: u8 = 0x04;
const CMD_SLEEP_WORK: u8 = 0x06;

/// Bytes skipped while looking for a frame header before giving up
const MAX_RESYNC_BYTES: usize = 64;

/// Build a command frame addressed to all sensors
#[must_use]
pub fn encode_command(command: u8, data: [u8; 2]) -> [u8; COMMAND_LENGTH] {
    let mut frame = [0u8; COMMAND_LENGTH];
    frame[0] = HEAD;
    frame[1] = COMMAND_ID;
    frame[2] = command;
    frame[3] = data[0];
    frame[4] = data[1];
    // Bytes 15-16: device id FFFF addresses every sensor on the line
    frame[15] = 0xFF;
    frame[16] = 0xFF;
    frame[17] = checksum(&frame[2..17]);
    frame[18] = TAIL;
    frame
}

/// Decode a data reply into `(pm2_5, pm10)` in ug/m3
///
/// # Errors
///
/// * `AqiError::InvalidFrame` - wrong length, framing bytes, reply type or checksum
pub fn decode_reading(frame: &[u8]) -> Result<(f64, f64)> {
    validate_reply(frame)?;

    if frame[1] != DATA_REPLY {
        return Err(AqiError::InvalidFrame(format!(
            "Expected data reply 0xC0, got 0x{:02X}",
            frame[1]
        )));
    }

    let pm2_5 = f64::from(u16::from_le_bytes([frame[2], frame[3]])) / 10.0;
    let pm10 = f64::from(u16::from_le_bytes([frame[4], frame[5]])) / 10.0;
    Ok((pm2_5, pm10))
}

/// Check length, framing bytes and checksum of a reply frame
///
/// # Errors
///
/// * `AqiError::InvalidFrame` - the frame is malformed
pub fn validate_reply(frame: &[u8]) -> Result<()> {
    if frame.len() != REPLY_LENGTH {
        return Err(AqiError::invalid_length(REPLY_LENGTH, frame.len()));
    }

    if frame[0] != HEAD || frame[9] != TAIL {
        return Err(AqiError::InvalidFrame(format!(
            "Bad framing bytes: {}",
            hex::encode(frame)
        )));
    }

    let expected = checksum(&frame[2..8]);
    if frame[8] != expected {
        return Err(AqiError::InvalidFrame(format!(
            "Checksum mismatch: expected 0x{expected:02X}, got 0x{:02X}",
            frame[8]
        )));
    }

    Ok(())
}

/// Low byte of the sum of `bytes`
fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |sum, b| sum.wrapping_add(*b))
}

/// SDS011 on any byte stream, usually a serial port
pub struct Sds011<P> {
    port: P,
}

impl Sds011<Box<dyn serialport::SerialPort>> {
    /// Open the sensor on a serial device such as `/dev/ttyUSB0`
    ///
    /// # Errors
    ///
    /// * `AqiError::SensorIo` - the device cannot be opened or configured
    pub fn open(path: &str) -> Result<Self> {
        let port = serialport::new(path, BAUD_RATE)
            .timeout(Duration::from_secs(2))
            .open()
            .map_err(|err| AqiError::SensorIo(format!("{path}: {err}")))?;
        info!("Opened SDS011 on {path}");
        Self::new(port)
    }
}

impl<P: Read + Write> Sds011<P> {
    /// Wrap an open port and switch the sensor to query mode
    ///
    /// # Errors
    ///
    /// * `AqiError::SensorIo` / `AqiError::InvalidFrame` - the sensor did not acknowledge
    pub fn new(port: P) -> Result<Self> {
        let mut sensor = Self { port };
        sensor.command(CMD_REPORTING_MODE, [1, 1])?;
        Ok(sensor)
    }

    /// Give back the underlying port
    pub fn into_inner(self) -> P {
        self.port
    }

    fn command(&mut self, command: u8, data: [u8; 2]) -> Result<()> {
        let frame = encode_command(command, data);
        debug!("SDS011 <- {}", hex::encode(frame));
        self.port.write_all(&frame)?;
        self.port.flush()?;
        // Commands other than a query are acknowledged with a C5 reply
        if command != CMD_QUERY {
            self.read_reply(COMMAND_REPLY)?;
        }
        Ok(())
    }

    /// Read frames until one of type `kind` arrives, skipping other reply types
    fn read_reply(&mut self, kind: u8) -> Result<[u8; REPLY_LENGTH]> {
        let mut skipped = 0;
        loop {
            let frame = self.read_frame()?;
            debug!("SDS011 -> {}", hex::encode(frame));
            validate_reply(&frame)?;
            if frame[1] == kind {
                return Ok(frame);
            }
            skipped += 1;
            if skipped > MAX_RESYNC_BYTES / REPLY_LENGTH {
                return Err(AqiError::InvalidFrame(format!(
                    "No reply of type 0x{kind:02X} received"
                )));
            }
        }
    }

    fn read_frame(&mut self) -> Result<[u8; REPLY_LENGTH]> {
        let mut frame = [0u8; REPLY_LENGTH];
        let mut byte = [0u8; 1];
        let mut skipped = 0;
        loop {
            self.port.read_exact(&mut byte)?;
            if byte[0] == HEAD {
                break;
            }
            skipped += 1;
            if skipped > MAX_RESYNC_BYTES {
                return Err(AqiError::InvalidFrame("No frame header found".into()));
            }
        }
        frame[0] = HEAD;
        self.port.read_exact(&mut frame[1..])?;
        Ok(frame)
    }
}

impl<P: Read + Write> Sensor for Sds011<P> {
    fn wake(&mut self) -> Result<()> {
        self.command(CMD_SLEEP_WORK, [1, 1])
    }

    fn take_reading(&mut self) -> Result<(f64, f64)> {
        self.command(CMD_QUERY, [0, 0])?;
        let frame = self.read_reply(DATA_REPLY)?;
        decode_reading(&frame)
    }

    fn sleep(&mut self) -> Result<()> {
        self.command(CMD_SLEEP_WORK, [1, 0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Cursor;

    /// Port that replays canned replies and records what was written
    struct FakePort {
        replies: Cursor<Vec<u8>>,
        written: Vec<u8>,
    }

    impl FakePort {
        fn new(replies: &[&str]) -> Self {
            let bytes = replies
                .iter()
                .flat_map(|r| hex::decode(r).unwrap())
                .collect();
            Self {
                replies: Cursor::new(bytes),
                written: Vec::new(),
            }
        }
    }

    impl Read for FakePort {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.replies.read(buf)
        }
    }

    impl Write for FakePort {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    const MODE_ACK: &str = "aac502010100ffff02ab";
    const WORK_ACK: &str = "aac506010100ffff06ab";
    const SLEEP_ACK: &str = "aac506010000ffff05ab";
    const DATA: &str = "aac0d4043a0aa1601dab";

    #[rstest]
    #[case(CMD_REPORTING_MODE, [1, 1], "aab402010100000000000000000000ffff02ab")]
    #[case(CMD_QUERY, [0, 0], "aab404000000000000000000000000ffff02ab")]
    #[case(CMD_SLEEP_WORK, [1, 0], "aab406010000000000000000000000ffff05ab")]
    #[case(CMD_SLEEP_WORK, [1, 1], "aab406010100000000000000000000ffff06ab")]
    fn command_frames(#[case] command: u8, #[case] data: [u8; 2], #[case] expected: &str) {
        assert_eq!(hex::encode(encode_command(command, data)), expected);
    }

    #[test]
    fn decodes_data_reply() {
        let frame = hex::decode(DATA).unwrap();
        assert_eq!(decode_reading(&frame).unwrap(), (123.6, 261.8));
    }

    #[test]
    fn decode_errors() {
        assert!(matches!(
            decode_reading(&[0xAA, 0xC0, 0x00]),
            Err(AqiError::InvalidFrame(_))
        ));

        let mut frame = hex::decode(DATA).unwrap();
        frame[8] = frame[8].wrapping_add(1);
        assert!(matches!(
            decode_reading(&frame),
            Err(AqiError::InvalidFrame(msg)) if msg.starts_with("Checksum mismatch")
        ));

        let mut frame = hex::decode(DATA).unwrap();
        frame[9] = 0x00;
        assert!(matches!(decode_reading(&frame), Err(AqiError::InvalidFrame(_))));

        // A well formed command acknowledgement is not a reading
        let ack = hex::decode(MODE_ACK).unwrap();
        assert!(validate_reply(&ack).is_ok());
        assert!(matches!(decode_reading(&ack), Err(AqiError::InvalidFrame(_))));
    }

    #[test]
    fn queries_and_skips_command_replies() {
        let port = FakePort::new(&[
            MODE_ACK,
            WORK_ACK,
            WORK_ACK,
            DATA,
            SLEEP_ACK,
        ]);
        let mut sensor = Sds011::new(port).unwrap();
        sensor.wake().unwrap();
        assert_eq!(sensor.take_reading().unwrap(), (123.6, 261.8));
        sensor.sleep().unwrap();

        let written = sensor.into_inner().written;
        let frames: Vec<String> = written.chunks(COMMAND_LENGTH).map(hex::encode).collect();
        assert_eq!(
            frames,
            vec![
                "aab402010100000000000000000000ffff02ab",
                "aab406010100000000000000000000ffff06ab",
                "aab404000000000000000000000000ffff02ab",
                "aab406010000000000000000000000ffff05ab",
            ]
        );
    }

    #[test]
    fn resynchronizes_on_garbage() {
        let port = FakePort::new(&[MODE_ACK, "0102", DATA]);
        let mut sensor = Sds011::new(port).unwrap();
        assert_eq!(sensor.take_reading().unwrap(), (123.6, 261.8));
    }

    #[test]
    fn truncated_stream_is_an_io_error() {
        let port = FakePort::new(&[MODE_ACK, "aac0d404"]);
        let mut sensor = Sds011::new(port).unwrap();
        assert!(matches!(sensor.take_reading(), Err(AqiError::SensorIo(_))));
    }
}
