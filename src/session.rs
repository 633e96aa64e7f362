//! Session state shared by the interface and the writer.
//!
//! A `Session` owns the running flag, the single serial connection and the
//! writer thread. Every operation goes through it; there is no global
//! state.
//!
//! # Concurrency
//!
//! ```text
//! interface thread ──poll()/connect()──┐
//!                                      ├──> Mutex<Option<Connection>>
//! writer thread ────write_line()───────┘
//! ```
//!
//! The poll path only reads bytes the driver already reports as available,
//! so holding the lock never blocks on the wire.

use crate::codec::{decode_line, encode_line, LineBuffer, DEFAULT_MAX_LINE_BYTES};
use crate::port::{PortConfiguration, PortError, PortOpener, SerialPortAdapter};
use crate::writer::{SendWorker, WriterError};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Upper bound on a single read call during a poll.
const READ_CHUNK: usize = 1024;

/// Default depth of the outbound queue.
pub const DEFAULT_SEND_QUEUE_CAPACITY: usize = 32;

/// The connection slot shared with the writer.
pub type SharedConnection = Arc<Mutex<Option<Connection>>>;

/// Errors from session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session has been shut down")]
    Inactive,

    #[error("no serial port is connected")]
    NotConnected,

    #[error("send queue is full, message not queued")]
    QueueFull,

    #[error("serial writer is not running")]
    WriterStopped,

    #[error("timed out waiting for pending writes")]
    FlushTimeout,

    #[error(transparent)]
    Port(#[from] PortError),
}

impl From<WriterError> for SessionError {
    fn from(err: WriterError) -> Self {
        match err {
            WriterError::QueueFull => Self::QueueFull,
            WriterError::Stopped => Self::WriterStopped,
            WriterError::FlushTimeout => Self::FlushTimeout,
        }
    }
}

/// Tunables for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionSettings {
    pub port: PortConfiguration,
    pub max_line_bytes: usize,
    pub send_queue_capacity: usize,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            port: PortConfiguration::default(),
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            send_queue_capacity: DEFAULT_SEND_QUEUE_CAPACITY,
        }
    }
}

/// Public description of the open connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub port_name: String,
    pub baud_rate: u32,
}

/// An open serial handle plus its inbound line buffer.
#[derive(Debug)]
pub struct Connection {
    port: Box<dyn SerialPortAdapter>,
    lines: LineBuffer,
    info: ConnectionInfo,
}

impl Connection {
    pub fn new(
        port: Box<dyn SerialPortAdapter>,
        config: PortConfiguration,
        max_line_bytes: usize,
    ) -> Self {
        let info = ConnectionInfo {
            port_name: port.name().to_string(),
            baud_rate: config.baud_rate,
        };
        Self {
            port,
            lines: LineBuffer::new(max_line_bytes),
            info,
        }
    }

    pub fn port_name(&self) -> &str {
        &self.info.port_name
    }

    pub fn info(&self) -> &ConnectionInfo {
        &self.info
    }

    /// Write an already framed line.
    pub fn write_line(&mut self, bytes: &[u8]) -> Result<(), PortError> {
        self.port.write_all_bytes(bytes)
    }

    /// Drain whatever the driver has buffered and return every complete,
    /// non-empty line.
    ///
    /// Lines that fail to decode are logged and skipped. A read error is
    /// returned after the lines already completed have been kept for the
    /// next poll.
    pub fn read_lines(&mut self) -> Result<Vec<String>, PortError> {
        let mut remaining = self.port.bytes_to_read()?;
        let mut chunk = [0u8; READ_CHUNK];
        while remaining > 0 {
            let want = remaining.min(chunk.len());
            match self.port.read_bytes(&mut chunk[..want]) {
                Ok(0) => break,
                Ok(n) => {
                    remaining = remaining.saturating_sub(n);
                    if let Err(e) = self.lines.push(&chunk[..n]) {
                        warn!("Error receiving message on {}: {}", self.info.port_name, e);
                    }
                }
                Err(e) if e.is_would_block() => break,
                Err(e) => return Err(e),
            }
        }

        let mut lines = Vec::new();
        while let Some(raw) = self.lines.next_line() {
            match decode_line(&raw) {
                Ok(text) if text.is_empty() => {}
                Ok(text) => lines.push(text),
                Err(e) => warn!("Error receiving message on {}: {}", self.info.port_name, e),
            }
        }
        Ok(lines)
    }
}

/// Explicit session object replacing ambient globals.
pub struct Session {
    settings: SessionSettings,
    opener: Arc<dyn PortOpener>,
    running: Arc<AtomicBool>,
    connection: SharedConnection,
    writer: SendWorker,
}

impl Session {
    /// Create an active session with no connection and start its writer.
    pub fn new(opener: Arc<dyn PortOpener>, settings: SessionSettings) -> std::io::Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let connection: SharedConnection = Arc::new(Mutex::new(None));
        let writer = SendWorker::spawn(
            connection.clone(),
            running.clone(),
            settings.send_queue_capacity,
        )?;

        Ok(Self {
            settings,
            opener,
            running,
            connection,
            writer,
        })
    }

    /// False once `shutdown` has run.
    pub fn is_active(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Description of the open connection, if any.
    pub fn connection(&self) -> Option<ConnectionInfo> {
        self.connection.lock().as_ref().map(|c| c.info().clone())
    }

    pub fn is_connected(&self) -> bool {
        self.connection.lock().is_some()
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Open `port_name`, closing any previous connection first.
    ///
    /// On failure no connection is left open.
    pub fn connect(&self, port_name: &str) -> Result<ConnectionInfo, SessionError> {
        if !self.is_active() {
            return Err(SessionError::Inactive);
        }

        let mut slot = self.connection.lock();
        if let Some(previous) = slot.take() {
            info!(
                "Closing {} before opening {}",
                previous.port_name(),
                port_name
            );
        }

        match self.opener.open(port_name, self.settings.port) {
            Ok(port) => {
                let conn = Connection::new(port, self.settings.port, self.settings.max_line_bytes);
                let info = conn.info().clone();
                *slot = Some(conn);
                info!("Connected to {} at {} baud", port_name, info.baud_rate);
                Ok(info)
            }
            Err(e) => {
                warn!("Failed to connect to {}: {}", port_name, e);
                Err(SessionError::Port(e))
            }
        }
    }

    /// Queue `text` for transmission as one line.
    pub fn send_line(&self, text: &str) -> Result<(), SessionError> {
        if !self.is_active() {
            return Err(SessionError::Inactive);
        }
        if !self.is_connected() {
            return Err(SessionError::NotConnected);
        }
        self.writer.submit(encode_line(text))?;
        Ok(())
    }

    /// Read every complete inbound line that has arrived since the last poll.
    ///
    /// Returns an empty list when inactive, disconnected or idle.
    pub fn poll(&self) -> Result<Vec<String>, SessionError> {
        if !self.is_active() {
            return Ok(Vec::new());
        }
        let mut slot = self.connection.lock();
        let Some(conn) = slot.as_mut() else {
            return Ok(Vec::new());
        };
        let lines = conn.read_lines()?;
        if !lines.is_empty() {
            debug!("Received {} line(s) on {}", lines.len(), conn.port_name());
        }
        Ok(lines)
    }

    /// Block until every line queued so far has been attempted.
    pub fn flush(&self, timeout: Duration) -> Result<(), SessionError> {
        self.writer.flush(timeout)?;
        Ok(())
    }

    /// Stop background work and close the connection.
    ///
    /// Returns true for the call that actually performed the shutdown.
    pub fn shutdown(&self) -> bool {
        if !self.running.swap(false, Ordering::SeqCst) {
            return false;
        }
        info!("Stopping session");
        self.writer.stop();
        if let Some(conn) = self.connection.lock().take() {
            info!("Closed {}", conn.port_name());
        }
        true
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("active", &self.is_active())
            .field("connection", &self.connection())
            .field("writer", &self.writer)
            .finish()
    }
}
