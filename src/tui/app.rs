//! TUI Application state and main loop.

use crate::config::Config;
use crate::messenger::Messenger;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::io;
use std::time::Duration;
use tracing::{info, warn};

use super::event::{Event, EventHandler};
use super::theme::Theme;
use super::ui;
use super::widgets::TextField;

/// Lines moved by PageUp/PageDown in the transcript.
const PAGE_LINES: usize = 10;

/// Focus area in the UI, in Tab order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusArea {
    /// Port selection list
    PortList,
    /// Username field
    Username,
    /// Message field
    #[default]
    Message,
    /// The `[ Send ]` control
    SendButton,
    /// Chat transcript
    Transcript,
}

impl FocusArea {
    const ORDER: [FocusArea; 5] = [
        FocusArea::PortList,
        FocusArea::Username,
        FocusArea::Message,
        FocusArea::SendButton,
        FocusArea::Transcript,
    ];

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }

    pub fn previous(self) -> Self {
        let len = Self::ORDER.len();
        Self::ORDER[(self.position() + len - 1) % len]
    }
}

/// Application state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    /// Application is running
    Running,
    /// Application should quit
    Quitting,
}

/// Main TUI application.
pub struct App {
    /// Current app state
    pub state: AppState,
    /// Current theme
    pub theme: Theme,
    /// Focus area
    pub focus: FocusArea,

    /// The chat model
    pub messenger: Messenger,

    /// Cursor in the username field
    pub username_field: TextField,
    /// Cursor in the message field
    pub message_field: TextField,

    /// Highlighted row in the port list (0 is the placeholder)
    pub port_highlight: usize,
    /// Transcript lines scrolled up from the bottom
    pub scroll_offset: usize,

    /// Latest diagnostic shown in the status bar
    pub status_message: Option<String>,

    poll_interval: Duration,
}

impl App {
    /// Create the app around an existing messenger. Does not touch the
    /// terminal.
    pub fn new(messenger: Messenger, theme: Theme, poll_interval: Duration) -> Self {
        let port_highlight = messenger.selector().selected_index();
        let focus = if messenger.username.trim().is_empty() {
            FocusArea::Username
        } else {
            FocusArea::Message
        };
        Self {
            state: AppState::Running,
            theme,
            focus,
            username_field: TextField::at_end(&messenger.username),
            message_field: TextField::at_end(&messenger.input),
            messenger,
            port_highlight,
            scroll_offset: 0,
            status_message: None,
            poll_interval,
        }
    }

    /// Create the app using the theme and poll interval from `config`.
    pub fn with_config(messenger: Messenger, config: &Config) -> Self {
        let theme = match Theme::by_name(&config.tui.theme) {
            Some(theme) => theme.clone(),
            None => {
                warn!("Unknown theme '{}', using default", config.tui.theme);
                Theme::default()
            }
        };
        Self::new(messenger, theme, config.serial.poll_interval())
    }

    /// Run the application main loop.
    ///
    /// The messenger is shut down and the terminal restored however the
    /// loop ends.
    pub fn run(&mut self) -> io::Result<()> {
        let mut terminal = ui::setup_terminal()?;
        let events = EventHandler::new(self.poll_interval);

        let result = self.event_loop(&mut terminal, &events);

        self.messenger.shutdown();
        let restored = ui::restore_terminal(terminal);
        result.and(restored)
    }

    fn event_loop(&mut self, terminal: &mut ui::Tui, events: &EventHandler) -> io::Result<()> {
        while self.state == AppState::Running {
            terminal.draw(|frame| ui::render(self, frame))?;

            match events.next() {
                Ok(event) => self.handle_event(event),
                Err(_) => self.state = AppState::Quitting,
            }
        }
        info!("Application closed");
        Ok(())
    }

    /// React to one event.
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Tick => self.on_tick(),
            Event::Key(key) => self.handle_key(key),
            Event::Resize(_, _) => {
                // Terminal will auto-resize
            }
            Event::Error(err) => {
                warn!("Terminal event error: {}", err);
                self.status_message = Some(format!("Error: {}", err));
            }
        }
    }

    fn on_tick(&mut self) {
        let added = self.messenger.poll_tick();
        if added > 0 && self.scroll_offset > 0 {
            // Keep the same lines in view while the user reads history.
            self.scroll_offset += added;
        }
    }

    /// Handle keyboard input.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.state = AppState::Quitting;
                return;
            }
            KeyCode::Esc => {
                self.state = AppState::Quitting;
                return;
            }
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return;
            }
            KeyCode::BackTab => {
                self.focus = self.focus.previous();
                return;
            }
            KeyCode::F(5) => {
                self.refresh_ports();
                return;
            }
            _ => {}
        }

        match self.focus {
            FocusArea::PortList => self.handle_port_list_key(key),
            FocusArea::Username => {
                if key.code == KeyCode::Enter {
                    self.focus = FocusArea::Message;
                } else {
                    self.username_field
                        .handle_key(&mut self.messenger.username, key);
                }
            }
            FocusArea::Message => {
                if key.code == KeyCode::Enter {
                    self.send_message();
                } else {
                    self.message_field.handle_key(&mut self.messenger.input, key);
                }
            }
            FocusArea::SendButton => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                    self.send_message();
                }
            }
            FocusArea::Transcript => self.handle_transcript_key(key),
        }
    }

    fn handle_port_list_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.port_highlight = self.port_highlight.saturating_sub(1),
            KeyCode::Down => {
                let last = self.messenger.selector().len().saturating_sub(1);
                self.port_highlight = (self.port_highlight + 1).min(last);
            }
            KeyCode::Home => self.port_highlight = 0,
            KeyCode::End => {
                self.port_highlight = self.messenger.selector().len().saturating_sub(1)
            }
            KeyCode::Enter => self.select_highlighted_port(),
            _ => {}
        }
    }

    fn handle_transcript_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up => self.scroll_up(1),
            KeyCode::Down => self.scroll_down(1),
            KeyCode::PageUp => self.scroll_up(PAGE_LINES),
            KeyCode::PageDown => self.scroll_down(PAGE_LINES),
            KeyCode::Home => self.scroll_up(usize::MAX),
            KeyCode::End => self.scroll_offset = 0,
            _ => {}
        }
    }

    fn scroll_up(&mut self, lines: usize) {
        let max = self.messenger.transcript().len().saturating_sub(1);
        self.scroll_offset = self.scroll_offset.saturating_add(lines).min(max);
    }

    fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    /// Re-enumerate ports, keeping the highlight on a valid row.
    pub fn refresh_ports(&mut self) {
        self.messenger.refresh_ports();
        let count = self.messenger.selector().ports().len();
        self.port_highlight = self.messenger.selector().selected_index();
        self.status_message = Some(format!("Found {} port(s)", count));
    }

    /// Open the highlighted port; the placeholder opens nothing.
    pub fn select_highlighted_port(&mut self) {
        self.status_message = match self.messenger.select_port(self.port_highlight) {
            Ok(Some(info)) => Some(format!(
                "Connected to {} at {} baud",
                info.port_name, info.baud_rate
            )),
            Ok(None) => Some("Select a COM port".to_string()),
            Err(e) => Some(format!("Error connecting to COM port: {}", e)),
        };
        self.port_highlight = self.messenger.selector().selected_index();
    }

    /// Send the message field.
    pub fn send_message(&mut self) {
        match self.messenger.send() {
            Ok(()) => {
                self.message_field.home();
                self.scroll_offset = 0;
                self.status_message = None;
            }
            Err(e) => self.status_message = Some(e.to_string()),
        }
    }

    /// Header text describing the connection.
    pub fn connection_label(&self) -> String {
        match self.messenger.connection() {
            Some(info) => format!("{} @ {}", info.port_name, info.baud_rate),
            None => "Not connected".to_string(),
        }
    }
}
