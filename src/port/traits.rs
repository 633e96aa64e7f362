//! Core traits for serial port abstraction.
//!
//! `SerialPortAdapter` lets the real port and the mock be used
//! interchangeably; `PortOpener` is the seam through which the session
//! acquires a handle.

use super::error::PortError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Baud rate used for the LoRa module link.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Read timeout configured on every opened handle.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Parameters used when opening a port. Framing is always 8N1 without flow
/// control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortConfiguration {
    /// Baud rate (bits per second).
    pub baud_rate: u32,

    /// Read timeout.
    pub timeout: Duration,
}

impl Default for PortConfiguration {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// Trait for serial port I/O operations.
pub trait SerialPortAdapter: Send + std::fmt::Debug {
    /// Write bytes to the serial port.
    ///
    /// Returns the number of bytes actually written.
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError>;

    /// Read bytes from the serial port into the provided buffer.
    ///
    /// Returns the number of bytes actually read.
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError>;

    /// Get the name/path of this serial port.
    fn name(&self) -> &str;

    /// Number of received bytes waiting in the input buffer.
    fn bytes_to_read(&self) -> Result<usize, PortError>;

    /// Flush pending output to the device.
    fn flush(&mut self) -> Result<(), PortError> {
        Ok(())
    }

    /// Write the whole buffer, retrying on short writes.
    fn write_all_bytes(&mut self, mut data: &[u8]) -> Result<(), PortError> {
        while !data.is_empty() {
            match self.write_bytes(data)? {
                0 => {
                    return Err(PortError::Io(std::io::Error::new(
                        std::io::ErrorKind::WriteZero,
                        "serial port accepted no bytes",
                    )))
                }
                n => data = &data[n..],
            }
        }
        self.flush()
    }
}

/// Opens serial handles by name.
pub trait PortOpener: Send + Sync {
    /// Open `port_name` with the given parameters.
    fn open(
        &self,
        port_name: &str,
        config: PortConfiguration,
    ) -> Result<Box<dyn SerialPortAdapter>, PortError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_configuration() {
        let config = PortConfiguration::default();
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.timeout, Duration::from_secs(1));
    }

    #[derive(Debug, Default)]
    struct Trickle {
        written: Vec<u8>,
    }

    impl SerialPortAdapter for Trickle {
        fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError> {
            // Accept at most two bytes per call.
            let n = data.len().min(2);
            self.written.extend_from_slice(&data[..n]);
            Ok(n)
        }

        fn read_bytes(&mut self, _buffer: &mut [u8]) -> Result<usize, PortError> {
            Ok(0)
        }

        fn name(&self) -> &str {
            "TRICKLE"
        }

        fn bytes_to_read(&self) -> Result<usize, PortError> {
            Ok(0)
        }
    }

    #[test]
    fn test_write_all_handles_short_writes() {
        let mut port = Trickle::default();
        port.write_all_bytes(b"alice: hello\n").unwrap();
        assert_eq!(port.written, b"alice: hello\n");
    }
}
