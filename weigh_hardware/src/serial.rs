//! `Transport` over a physical serial port.

use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use tracing::{debug, trace};
use weigh_traits::{Available, BoxError, Transport};

use crate::error::{HwError, Result};
use crate::settings::{Parity, SerialSettings, StopBits};

/// Read chunk size; scale lines are well under this.
const READ_CHUNK: usize = 256;

pub struct SerialTransport {
    settings: SerialSettings,
    port: Option<Box<dyn serialport::SerialPort>>,
}

impl SerialTransport {
    pub fn new(settings: SerialSettings) -> Self {
        Self {
            settings,
            port: None,
        }
    }

    pub fn settings(&self) -> &SerialSettings {
        &self.settings
    }

    fn port(&mut self) -> Result<&mut Box<dyn serialport::SerialPort>> {
        self.port.as_mut().ok_or(HwError::NotOpen)
    }

    fn open_port(&mut self) -> Result<()> {
        let s = &self.settings;
        let data_bits = match s.data_bits {
            5 => serialport::DataBits::Five,
            6 => serialport::DataBits::Six,
            7 => serialport::DataBits::Seven,
            8 => serialport::DataBits::Eight,
            other => return Err(HwError::Serial(format!("unsupported data bits: {other}"))),
        };
        let parity = match s.parity {
            Parity::None => serialport::Parity::None,
            Parity::Odd => serialport::Parity::Odd,
            Parity::Even => serialport::Parity::Even,
        };
        let stop_bits = match s.stop_bits {
            StopBits::One => serialport::StopBits::One,
            StopBits::Two => serialport::StopBits::Two,
        };
        let port = serialport::new(&s.path, s.baud_rate)
            .data_bits(data_bits)
            .parity(parity)
            .stop_bits(stop_bits)
            .timeout(Duration::from_millis(50))
            .open()
            .map_err(|e| HwError::Serial(format!("open {}: {e}", s.path)))?;
        debug!(path = %s.path, baud = s.baud_rate, "serial port opened");
        self.port = Some(port);
        Ok(())
    }

    fn read_port(&mut self, timeout: Duration) -> Result<Available> {
        let port = self.port()?;
        port.set_timeout(timeout.max(Duration::from_millis(1)))
            .map_err(|e| HwError::Serial(e.to_string()))?;

        let mut buf = [0u8; READ_CHUNK];
        let n = match port.read(&mut buf) {
            Ok(0) => return Ok(Available::Closed),
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::TimedOut => return Ok(Available::Idle),
            Err(e) => return Err(HwError::Io(e)),
        };
        let mut out = buf[..n].to_vec();

        // Drain whatever else is already buffered without waiting again.
        while port
            .bytes_to_read()
            .map_err(|e| HwError::Serial(e.to_string()))?
            > 0
        {
            match port.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => out.extend_from_slice(&buf[..n]),
                Err(e) if e.kind() == ErrorKind::TimedOut => break,
                Err(e) => return Err(HwError::Io(e)),
            }
        }
        trace!(bytes = out.len(), "serial read");
        Ok(Available::Bytes(out))
    }
}

impl Transport for SerialTransport {
    fn open(&mut self) -> std::result::Result<(), BoxError> {
        self.open_port().map_err(Into::into)
    }

    fn write(&mut self, bytes: &[u8]) -> std::result::Result<(), BoxError> {
        let port = self.port()?;
        port.write_all(bytes).map_err(HwError::Io)?;
        port.flush().map_err(HwError::Io)?;
        Ok(())
    }

    fn read_available(&mut self, timeout: Duration) -> std::result::Result<Available, BoxError> {
        self.read_port(timeout).map_err(Into::into)
    }

    fn close(&mut self) -> std::result::Result<(), BoxError> {
        if self.port.take().is_some() {
            debug!(path = %self.settings.path, "serial port closed");
        }
        Ok(())
    }
}
