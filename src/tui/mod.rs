//! Terminal User Interface (TUI) for the messenger.
//!
//! A ratatui/crossterm front-end over [`crate::messenger::Messenger`]: port
//! list, username field, colored chat transcript, message field and a
//! `[ Send ]` control, with a status line mirroring the latest diagnostic.
//!
//! # Example
//!
//! ```rust,no_run
//! use lora_messenger::config::Config;
//! use lora_messenger::messenger::Messenger;
//! use lora_messenger::port::SystemPortOpener;
//! use lora_messenger::tui::App;
//! use std::sync::Arc;
//!
//! let config = Config::default();
//! let messenger = Messenger::new(Arc::new(SystemPortOpener), config.serial.session_settings())?;
//! let mut app = App::with_config(messenger, &config);
//! app.refresh_ports();
//! app.run()?;
//! # Ok::<(), std::io::Error>(())
//! ```

mod app;
mod event;
mod theme;
mod ui;

pub mod widgets;

pub use app::{App, AppState, FocusArea};
pub use event::{Event, EventHandler};
pub use theme::{Theme, THEMES};
pub use ui::render;
