//! Shared test utilities for the messenger integration tests.
//!
//! - Messenger construction over a mock opener
//! - Waiting for the background writer
//! - Transcript snapshots for assertions

#![allow(dead_code)]

use lora_messenger::port::{MockPortOpener, MockSerialPort};
use lora_messenger::session::SessionSettings;
use lora_messenger::transcript::Direction;
use lora_messenger::Messenger;
use std::sync::Arc;
use std::time::Duration;

/// Upper bound for waiting on the writer thread in tests.
pub const FLUSH_TIMEOUT: Duration = Duration::from_secs(2);

/// A messenger wired to a mock opener that knows `ports`.
pub struct Harness {
    pub opener: MockPortOpener,
    pub messenger: Messenger,
}

impl Harness {
    /// Messenger whose selector lists `ports`, all of which can be opened.
    pub fn with_ports(ports: &[&str]) -> Self {
        Self::with_settings(ports, SessionSettings::default())
    }

    pub fn with_settings(ports: &[&str], settings: SessionSettings) -> Self {
        let opener = MockPortOpener::new();
        for port in ports {
            opener.add_port(port);
        }
        let mut messenger = Messenger::new(Arc::new(opener.clone()), settings)
            .expect("failed to start writer thread");
        messenger.set_ports(ports.iter().map(|p| p.to_string()).collect());
        Self { opener, messenger }
    }

    /// Messenger already connected to `port`, returning the device handle.
    pub fn connected(port: &str) -> (Self, MockSerialPort) {
        let mut harness = Self::with_ports(&[]);
        let device = harness.opener.add_port(port);
        harness
            .messenger
            .connect_to(port)
            .expect("mock port should open");
        (harness, device)
    }

    /// Wait until everything queued so far has been written.
    pub fn flush(&self) {
        self.messenger
            .session()
            .flush(FLUSH_TIMEOUT)
            .expect("writer did not drain");
    }

    /// Fill in both fields and press send.
    pub fn send(&mut self, username: &str, message: &str) -> Result<(), lora_messenger::ChatError> {
        self.messenger.username = username.to_string();
        self.messenger.input = message.to_string();
        self.messenger.send()
    }
}

/// Transcript as `(direction, text)` pairs.
pub fn transcript(messenger: &Messenger) -> Vec<(Direction, String)> {
    messenger
        .transcript()
        .entries()
        .iter()
        .map(|e| (e.direction, e.text.clone()))
        .collect()
}
