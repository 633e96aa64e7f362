//! Mock serial port and opener for tests.
//!
//! `MockSerialPort` clones share one state, so a test can keep a handle to
//! the port it gave the session and inspect what was written or feed what
//! should be read.

use super::error::PortError;
use super::traits::{PortConfiguration, PortOpener, SerialPortAdapter};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

#[derive(Debug, Default)]
struct MockPortState {
    /// Bytes returned by subsequent reads.
    read_queue: VecDeque<u8>,
    /// One entry per completed `write_bytes` call.
    write_log: Vec<Vec<u8>>,
    /// Fail the next write with a broken-pipe error.
    fail_next_write: bool,
    /// Fail the next read with an I/O error.
    fail_next_read: bool,
    /// Handles handed out by the opener and not yet dropped.
    open_handles: usize,
}

/// Mock serial port implementation for testing.
///
/// # Example
/// ```
/// use lora_messenger::port::{MockSerialPort, SerialPortAdapter};
///
/// let mut port = MockSerialPort::new("MOCK0");
/// port.enqueue_read(b"bob: hi\n");
///
/// let mut buffer = [0u8; 16];
/// let n = port.read_bytes(&mut buffer).unwrap();
/// assert_eq!(&buffer[..n], b"bob: hi\n");
///
/// port.write_bytes(b"alice: hello\n").unwrap();
/// assert_eq!(port.written(), b"alice: hello\n");
/// ```
#[derive(Clone)]
pub struct MockSerialPort {
    name: String,
    state: Arc<Mutex<MockPortState>>,
}

impl MockSerialPort {
    /// Create a new mock serial port with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(MockPortState::default())),
        }
    }

    /// Enqueue bytes to be returned by subsequent read operations.
    pub fn enqueue_read(&self, data: &[u8]) {
        self.state.lock().read_queue.extend(data);
    }

    /// Get a copy of every write call's payload.
    pub fn write_log(&self) -> Vec<Vec<u8>> {
        self.state.lock().write_log.clone()
    }

    /// All written bytes concatenated.
    pub fn written(&self) -> Vec<u8> {
        self.state.lock().write_log.concat()
    }

    /// Make the next write fail.
    pub fn fail_next_write(&self) {
        self.state.lock().fail_next_write = true;
    }

    /// Make the next read fail.
    pub fn fail_next_read(&self) {
        self.state.lock().fail_next_read = true;
    }

    /// Number of bytes still waiting to be read.
    pub fn available_bytes(&self) -> usize {
        self.state.lock().read_queue.len()
    }

    /// Number of boxed handles handed out by [`MockPortOpener`] that have not
    /// been dropped yet.
    pub fn open_handles(&self) -> usize {
        self.state.lock().open_handles
    }

    fn opened(&self) -> OpenedMock {
        self.state.lock().open_handles += 1;
        OpenedMock {
            inner: self.clone(),
        }
    }
}

impl SerialPortAdapter for MockSerialPort {
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError> {
        let mut state = self.state.lock();
        if state.fail_next_write {
            state.fail_next_write = false;
            return Err(PortError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "mock write failure",
            )));
        }
        state.write_log.push(data.to_vec());
        Ok(data.len())
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        let mut state = self.state.lock();
        if state.fail_next_read {
            state.fail_next_read = false;
            return Err(PortError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "mock read failure",
            )));
        }

        let mut bytes_read = 0;
        for byte in buffer.iter_mut() {
            match state.read_queue.pop_front() {
                Some(b) => {
                    *byte = b;
                    bytes_read += 1;
                }
                None => break,
            }
        }

        if bytes_read == 0 {
            Err(PortError::Io(std::io::Error::new(
                std::io::ErrorKind::WouldBlock,
                "No data available",
            )))
        } else {
            Ok(bytes_read)
        }
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn bytes_to_read(&self) -> Result<usize, PortError> {
        Ok(self.state.lock().read_queue.len())
    }
}

impl std::fmt::Debug for MockSerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSerialPort")
            .field("name", &self.name)
            .field("available_bytes", &self.available_bytes())
            .finish()
    }
}

/// A handle given out by the opener; dropping it counts as closing the port.
#[derive(Debug)]
struct OpenedMock {
    inner: MockSerialPort,
}

impl Drop for OpenedMock {
    fn drop(&mut self) {
        let mut state = self.inner.state.lock();
        state.open_handles = state.open_handles.saturating_sub(1);
    }
}

impl SerialPortAdapter for OpenedMock {
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError> {
        self.inner.write_bytes(data)
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        self.inner.read_bytes(buffer)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn bytes_to_read(&self) -> Result<usize, PortError> {
        self.inner.bytes_to_read()
    }
}

/// Port opener that hands out registered mock ports and records every
/// attempt.
#[derive(Debug, Clone, Default)]
pub struct MockPortOpener {
    ports: Arc<Mutex<HashMap<String, MockSerialPort>>>,
    attempts: Arc<Mutex<Vec<String>>>,
}

impl MockPortOpener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a port and return a handle sharing its state.
    pub fn add_port(&self, name: &str) -> MockSerialPort {
        let port = MockSerialPort::new(name);
        self.ports.lock().insert(name.to_string(), port.clone());
        port
    }

    /// Remove a port so later opens fail as if it was unplugged.
    pub fn unplug(&self, name: &str) {
        self.ports.lock().remove(name);
    }

    /// Names passed to `open`, in call order.
    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().clone()
    }
}

impl PortOpener for MockPortOpener {
    fn open(
        &self,
        port_name: &str,
        _config: PortConfiguration,
    ) -> Result<Box<dyn SerialPortAdapter>, PortError> {
        self.attempts.lock().push(port_name.to_string());
        match self.ports.lock().get(port_name) {
            Some(port) => Ok(Box::new(port.opened())),
            None => Err(PortError::not_found(port_name)),
        }
    }
}
