//! The messenger component.
//!
//! Holds everything the chat screen shows (port selector, username, message
//! input, transcript) together with the session that talks to the radio.
//! Front-ends only translate user input into calls on [`Messenger`].

use crate::port::{list_ports, PortOpener, PortSelector};
use crate::session::{ConnectionInfo, Session, SessionError, SessionSettings};
use crate::transcript::Transcript;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Why a send did not happen.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("messenger has been shut down")]
    Inactive,

    #[error("No COM port selected or connected!")]
    NotConnected,

    #[error("username is empty")]
    EmptyUsername,

    #[error("message is empty")]
    EmptyMessage,

    #[error("line breaks are not allowed in {0}")]
    EmbeddedNewline(&'static str),

    #[error("too many messages waiting to be sent")]
    QueueFull,

    #[error(transparent)]
    Session(SessionError),
}

impl From<SessionError> for ChatError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Inactive => Self::Inactive,
            SessionError::NotConnected => Self::NotConnected,
            SessionError::QueueFull => Self::QueueFull,
            other => Self::Session(other),
        }
    }
}

/// Build the wire text `"<username>: <message>"` from raw field contents.
///
/// Both parts are trimmed; either being empty, or containing a line break,
/// is an error.
pub fn compose(username: &str, message: &str) -> Result<String, ChatError> {
    let username = username.trim();
    let message = message.trim();
    if username.is_empty() {
        return Err(ChatError::EmptyUsername);
    }
    if message.is_empty() {
        return Err(ChatError::EmptyMessage);
    }
    if username.contains(['\r', '\n']) {
        return Err(ChatError::EmbeddedNewline("username"));
    }
    if message.contains(['\r', '\n']) {
        return Err(ChatError::EmbeddedNewline("message"));
    }
    Ok(format!("{username}: {message}"))
}

/// Model of the whole chat screen.
#[derive(Debug)]
pub struct Messenger {
    session: Session,
    selector: PortSelector,
    transcript: Transcript,
    /// Contents of the username field.
    pub username: String,
    /// Contents of the message field.
    pub input: String,
}

impl Messenger {
    pub fn new(opener: Arc<dyn PortOpener>, settings: SessionSettings) -> std::io::Result<Self> {
        Ok(Self {
            session: Session::new(opener, settings)?,
            selector: PortSelector::default(),
            transcript: Transcript::new(),
            username: String::new(),
            input: String::new(),
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn selector(&self) -> &PortSelector {
        &self.selector
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn connection(&self) -> Option<ConnectionInfo> {
        self.session.connection()
    }

    /// Re-enumerate devices from the operating system.
    pub fn refresh_ports(&mut self) {
        self.set_ports(list_ports());
    }

    /// Replace the selector's port list.
    pub fn set_ports(&mut self, ports: Vec<String>) {
        self.selector.refresh(ports);
    }

    /// Handle a choice in the port selector.
    ///
    /// The placeholder opens nothing and leaves any current connection
    /// alone. A real port is opened, replacing the current connection.
    pub fn select_port(&mut self, index: usize) -> Result<Option<ConnectionInfo>, SessionError> {
        let Some(port_name) = self.selector.select(index).map(str::to_owned) else {
            return Ok(None);
        };
        self.session.connect(&port_name).map(Some)
    }

    /// Select and open a port by name, whether or not it was enumerated.
    pub fn connect_to(&mut self, port_name: &str) -> Result<ConnectionInfo, SessionError> {
        if self.selector.select_name(port_name).is_none() {
            info!("Opening {} which is not in the enumerated list", port_name);
        }
        self.session.connect(port_name)
    }

    /// Send the message field as the user named in the username field.
    ///
    /// On success the line is echoed to the transcript, queued for the
    /// writer and the message field is cleared. On failure nothing is
    /// written, the transcript is untouched and the fields keep their
    /// contents.
    pub fn send(&mut self) -> Result<(), ChatError> {
        let result = self.try_send();
        if let Err(ref e) = result {
            warn!("Message not sent: {}", e);
        }
        result
    }

    fn try_send(&mut self) -> Result<(), ChatError> {
        if !self.session.is_active() {
            return Err(ChatError::Inactive);
        }
        if !self.session.is_connected() {
            return Err(ChatError::NotConnected);
        }
        let line = compose(&self.username, &self.input)?;
        self.session.send_line(&line)?;
        self.transcript.push_sent(line);
        self.input.clear();
        Ok(())
    }

    /// One poll tick: append every newly received line. Returns how many
    /// entries were added.
    pub fn poll_tick(&mut self) -> usize {
        match self.session.poll() {
            Ok(lines) => {
                let count = lines.len();
                for line in lines {
                    self.transcript.push_received(line);
                }
                count
            }
            Err(e) => {
                warn!("Error receiving message: {}", e);
                0
            }
        }
    }

    /// Stop the session. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if self.session.shutdown() {
            info!("Messenger stopped");
        }
    }
}
