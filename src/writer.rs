//! Background writer for outbound lines.
//!
//! One dedicated thread drains a bounded queue and writes each job to the
//! shared connection in submission order. The session's running flag is
//! checked under the connection lock before every write, which makes
//! shutdown the cancellation point for queued work.

use crate::session::SharedConnection;
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors returned to callers of the writer.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum WriterError {
    #[error("send queue is full")]
    QueueFull,

    #[error("writer has been stopped")]
    Stopped,

    #[error("timed out waiting for queued writes")]
    FlushTimeout,
}

enum Job {
    Write(Vec<u8>),
    Flush(Sender<()>),
}

/// Handle to the writer thread.
pub struct SendWorker {
    sender: Mutex<Option<Sender<Job>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl SendWorker {
    /// Start the writer thread with a queue of `capacity` jobs.
    pub fn spawn(
        connection: SharedConnection,
        running: Arc<AtomicBool>,
        capacity: usize,
    ) -> std::io::Result<Self> {
        let (sender, receiver) = bounded(capacity.max(1));
        let handle = thread::Builder::new()
            .name("serial-writer".into())
            .spawn(move || run(receiver, connection, running))?;

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            handle: Mutex::new(Some(handle)),
        })
    }

    /// Queue bytes for writing without blocking.
    pub fn submit(&self, bytes: Vec<u8>) -> Result<(), WriterError> {
        let guard = self.sender.lock();
        let sender = guard.as_ref().ok_or(WriterError::Stopped)?;
        sender.try_send(Job::Write(bytes)).map_err(|e| match e {
            TrySendError::Full(_) => WriterError::QueueFull,
            TrySendError::Disconnected(_) => WriterError::Stopped,
        })
    }

    /// Wait until every job queued before this call has been processed.
    pub fn flush(&self, timeout: Duration) -> Result<(), WriterError> {
        let deadline = Instant::now() + timeout;
        let (ack_tx, ack_rx) = bounded(1);
        // Wait on a clone so `submit` and `stop` are not held up by a full queue.
        let sender = self.sender.lock().clone().ok_or(WriterError::Stopped)?;
        let queued = sender.send_deadline(Job::Flush(ack_tx), deadline);
        drop(sender);
        queued.map_err(|_| WriterError::FlushTimeout)?;
        ack_rx
            .recv_deadline(deadline)
            .map_err(|_| WriterError::FlushTimeout)
    }

    /// Close the queue and join the thread. Idempotent.
    pub fn stop(&self) {
        self.sender.lock().take();
        if let Some(handle) = self.handle.lock().take() {
            if handle.join().is_err() {
                warn!("Serial writer thread panicked");
            }
        }
    }

    /// Whether the queue still accepts jobs.
    pub fn is_running(&self) -> bool {
        self.sender.lock().is_some()
    }
}

impl std::fmt::Debug for SendWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SendWorker")
            .field("running", &self.is_running())
            .finish()
    }
}

impl Drop for SendWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(receiver: Receiver<Job>, connection: SharedConnection, running: Arc<AtomicBool>) {
    for job in receiver.iter() {
        match job {
            Job::Write(bytes) => {
                let mut guard = connection.lock();
                if !running.load(Ordering::SeqCst) {
                    debug!("Dropping queued write of {} bytes after shutdown", bytes.len());
                    continue;
                }
                match guard.as_mut() {
                    Some(conn) => match conn.write_line(&bytes) {
                        Ok(()) => debug!("Wrote {} bytes to {}", bytes.len(), conn.port_name()),
                        Err(e) => warn!("Error sending message on {}: {}", conn.port_name(), e),
                    },
                    None => warn!("No connection open, dropping {} queued bytes", bytes.len()),
                }
            }
            Job::Flush(ack) => {
                let _ = ack.send(());
            }
        }
    }
    debug!("Serial writer stopped");
}
