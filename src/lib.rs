//! LoRa Messenger Library
//!
//! A chat client for a LoRa radio attached over a serial link. Lines of the
//! form `"<username>: <message>"` are written to the radio and whatever it
//! receives is read back once per poll tick.
//!
//! # Modules
//!
//! - `port`: Serial adapter trait, real and mock ports, discovery
//! - `codec`: Line framing for the wire format
//! - `transcript`: Sent/received chat history
//! - `writer`: Background single-writer send queue
//! - `session`: Running flag plus the guarded connection
//! - `messenger`: The chat model driven by the front-ends
//! - `config`: Configuration management with TOML support
//! - `logging`: `tracing` subscriber setup
//! - `error`: Top-level error type
//! - `headless`: stdin/stdout front-end
//! - `tui`: Terminal UI application (when `tui` feature is enabled)

pub mod codec;
pub mod config;
pub mod error;
pub mod headless;
pub mod logging;
pub mod messenger;
pub mod port;
pub mod session;
pub mod transcript;
pub mod writer;

// TUI module
#[cfg(feature = "tui")]
pub mod tui;

// Re-export commonly used types for convenience
pub use error::{AppError, AppResult};
pub use messenger::{compose, ChatError, Messenger};
pub use port::{
    MockPortOpener, MockSerialPort, PortConfiguration, PortError, PortOpener, SerialPortAdapter,
    SyncSerialPort, SystemPortOpener,
};
pub use session::{ConnectionInfo, Session, SessionError, SessionSettings};
pub use transcript::{Direction, Entry, Transcript};
