//! UI rendering for the TUI.

use super::app::{App, FocusArea};
use super::widgets::TextField;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame, Terminal,
};
use std::io::{self, Stdout};

/// Terminal type the app draws on.
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

/// Set up the terminal for TUI rendering.
pub fn setup_terminal() -> io::Result<Tui> {
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    if let Err(e) = crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen) {
        let _ = crossterm::terminal::disable_raw_mode();
        return Err(e);
    }
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

/// Restore the terminal to normal mode.
pub fn restore_terminal(mut terminal: Tui) -> io::Result<()> {
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Render the entire UI.
pub fn render(app: &App, frame: &mut Frame) {
    let size = frame.area();

    // Main layout: header, body, message row, status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(6),    // Body
            Constraint::Length(3), // Message + send
            Constraint::Length(1), // Status bar
        ])
        .split(size);

    render_header(app, frame, chunks[0]);
    render_body(app, frame, chunks[1]);
    render_message_row(app, frame, chunks[2]);
    render_status_bar(app, frame, chunks[3]);
}

fn border_style(app: &App, area: FocusArea) -> Style {
    if app.focus == area {
        Style::default().fg(app.theme.accent)
    } else {
        Style::default().fg(app.theme.border)
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let connected = app.messenger.connection().is_some();
    let status = if connected { "Connected" } else { "Disconnected" };

    let header = Line::from(vec![
        Span::styled(
            " LoRa Messenger ",
            Style::default()
                .fg(app.theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::styled(app.connection_label(), Style::default().fg(app.theme.fg)),
        Span::raw(" | "),
        Span::styled(
            status,
            Style::default().fg(if connected {
                app.theme.success_color
            } else {
                app.theme.inactive
            }),
        ),
    ]);

    let header_widget = Paragraph::new(header).style(Style::default().bg(app.theme.selection));
    frame.render_widget(header_widget, area);
}

fn render_body(app: &App, frame: &mut Frame, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(24), Constraint::Min(30)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(columns[0]);

    render_port_list(app, frame, left[0]);
    render_text_field(
        app,
        frame,
        left[1],
        " Username ",
        &app.messenger.username,
        &app.username_field,
        FocusArea::Username,
    );
    render_transcript(app, frame, columns[1]);
}

fn render_port_list(app: &App, frame: &mut Frame, area: Rect) {
    let selector = app.messenger.selector();
    let connected = app.messenger.connection().map(|c| c.port_name);

    let items: Vec<ListItem> = selector
        .options()
        .into_iter()
        .enumerate()
        .map(|(i, label)| {
            let is_connected = i > 0 && connected.as_deref() == Some(label);
            let style = if i == app.port_highlight {
                Style::default()
                    .fg(app.theme.fg)
                    .bg(app.theme.selection)
                    .add_modifier(Modifier::BOLD)
            } else if i == 0 {
                Style::default().fg(app.theme.inactive)
            } else if is_connected {
                Style::default().fg(app.theme.success_color)
            } else {
                Style::default().fg(app.theme.fg)
            };

            let prefix = if is_connected {
                "● "
            } else if i == app.port_highlight {
                "> "
            } else {
                "  "
            };

            ListItem::new(format!("{}{}", prefix, label)).style(style)
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(app, FocusArea::PortList))
            .title(" Ports (F5) "),
    );

    frame.render_widget(list, area);
}

fn render_transcript(app: &App, frame: &mut Frame, area: Rect) {
    let entries = app.messenger.transcript().entries();
    let height = area.height.saturating_sub(2) as usize;
    let width = area.width.saturating_sub(2) as usize;
    let end = entries.len().saturating_sub(app.scroll_offset);

    // Walk back from the newest visible entry until the pane is full.
    let mut rows: Vec<Line> = Vec::new();
    for entry in entries[..end].iter().rev() {
        if rows.len() >= height {
            break;
        }
        let style = Style::default().fg(app.theme.direction_color(entry.direction));
        for piece in wrap_text(&entry.text, width).into_iter().rev() {
            rows.push(Line::from(Span::styled(piece, style)));
        }
    }
    rows.reverse();
    let overflow = rows.len().saturating_sub(height);
    let lines: Vec<Line> = rows.into_iter().skip(overflow).collect();

    let title = if app.scroll_offset > 0 {
        format!(" Chat (+{} below) ", app.scroll_offset)
    } else {
        " Chat ".to_string()
    };

    let transcript_widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(app, FocusArea::Transcript))
            .title(title),
    );

    frame.render_widget(transcript_widget, area);
}

/// Split `text` into rows of at most `width` characters.
fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 || text.is_empty() {
        return vec![text.to_string()];
    }
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(width).map(|row| row.iter().collect()).collect()
}

fn render_message_row(app: &App, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(20), Constraint::Length(10)])
        .split(area);

    render_text_field(
        app,
        frame,
        chunks[0],
        " Message ",
        &app.messenger.input,
        &app.message_field,
        FocusArea::Message,
    );

    let button_style = if app.focus == FocusArea::SendButton {
        Style::default()
            .fg(app.theme.bg)
            .bg(app.theme.accent)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.theme.fg)
    };
    let button = Paragraph::new(Span::styled("[ Send ]", button_style)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(app, FocusArea::SendButton)),
    );
    frame.render_widget(button, chunks[1]);
}

fn render_text_field(
    app: &App,
    frame: &mut Frame,
    area: Rect,
    title: &str,
    text: &str,
    field: &TextField,
    focus: FocusArea,
) {
    let inner_width = area.width.saturating_sub(2) as usize;
    let column = field.column(text);
    // Scroll horizontally so the cursor stays visible.
    let skip = column.saturating_sub(inner_width.saturating_sub(1));
    let visible: String = text.chars().skip(skip).take(inner_width).collect();

    let widget = Paragraph::new(visible)
        .style(Style::default().fg(app.theme.fg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style(app, focus))
                .title(title.to_string()),
        );
    frame.render_widget(widget, area);

    if app.focus == focus {
        let cursor_x = area.x + 1 + (column - skip) as u16;
        frame.set_cursor_position((cursor_x, area.y + 1));
    }
}

fn render_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let (status_text, color) = match &app.status_message {
        Some(message) => (message.as_str(), app.theme.error_color),
        None => ("Ready", app.theme.fg),
    };

    let keybinds = "Tab:focus  Enter:select/send  F5:refresh  Esc:quit";

    let status = Line::from(vec![
        Span::styled(format!(" {} ", status_text), Style::default().fg(color)),
        Span::raw(" | "),
        Span::styled(keybinds, Style::default().fg(app.theme.inactive)),
    ]);

    let status_widget = Paragraph::new(status).style(Style::default().bg(app.theme.selection));
    frame.render_widget(status_widget, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messenger::Messenger;
    use crate::port::MockPortOpener;
    use crate::session::SessionSettings;
    use crate::tui::theme::Theme;
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Buffer;
    use std::sync::Arc;
    use std::time::Duration;

    fn buffer_text(buffer: &Buffer) -> String {
        let area = buffer.area;
        let mut out = String::new();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    fn draw(app: &App) -> (String, Buffer) {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|frame| render(app, frame)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        (buffer_text(&buffer), buffer)
    }

    fn find(buffer: &Buffer, needle: &str) -> Option<(u16, u16)> {
        let text = buffer_text(buffer);
        text.lines().enumerate().find_map(|(y, line)| {
            line.find(needle)
                .map(|byte| (line[..byte].chars().count() as u16, y as u16))
        })
    }

    fn app(opener: &MockPortOpener, ports: &[&str]) -> App {
        let mut messenger =
            Messenger::new(Arc::new(opener.clone()), SessionSettings::default()).unwrap();
        messenger.set_ports(ports.iter().map(|p| p.to_string()).collect());
        App::new(messenger, Theme::classic(), Duration::from_secs(1))
    }

    #[test]
    fn test_renders_placeholder_and_ports() {
        let opener = MockPortOpener::new();
        let app = app(&opener, &["COM3", "COM4"]);
        let (text, _) = draw(&app);

        assert!(text.contains("Select Port"));
        assert!(text.contains("COM3"));
        assert!(text.contains("COM4"));
        assert!(text.contains("Not connected"));
        assert!(text.contains("[ Send ]"));
    }

    #[test]
    fn test_transcript_colors_by_direction() {
        let opener = MockPortOpener::new();
        let port = opener.add_port("COM3");
        let mut app = app(&opener, &["COM3"]);
        app.messenger.connect_to("COM3").unwrap();
        app.messenger.username = "alice".into();
        app.messenger.input = "hello".into();
        app.messenger.send().unwrap();
        port.enqueue_read(b"bob: hi\n");
        app.messenger.poll_tick();

        let (text, buffer) = draw(&app);
        assert!(text.contains("COM3 @ 9600"));

        let (x, y) = find(&buffer, "alice: hello").unwrap();
        assert_eq!(buffer[(x, y)].fg, app.theme.sent_color);
        let (x, y) = find(&buffer, "bob: hi").unwrap();
        assert_eq!(buffer[(x, y)].fg, app.theme.received_color);
    }

    #[test]
    fn test_status_line_shows_latest_diagnostic() {
        let opener = MockPortOpener::new();
        let mut app = app(&opener, &[]);
        app.status_message = Some("No COM port selected or connected!".into());
        let (text, _) = draw(&app);
        assert!(text.contains("No COM port selected or connected!"));
    }

    #[test]
    fn test_transcript_shows_latest_lines() {
        let opener = MockPortOpener::new();
        let port = opener.add_port("COM3");
        let mut app = app(&opener, &["COM3"]);
        app.messenger.connect_to("COM3").unwrap();
        let inbound: String = (0..40).map(|i| format!("line {i:02}\n")).collect();
        port.enqueue_read(inbound.as_bytes());
        app.messenger.poll_tick();

        let (text, _) = draw(&app);
        assert!(text.contains("line 39"));
        assert!(!text.contains("line 00"));

        app.scroll_offset = 39;
        let (text, _) = draw(&app);
        assert!(text.contains("line 00"));
        assert!(!text.contains("line 39"));
    }

    #[test]
    fn test_wrap_text_splits_on_char_boundaries() {
        assert_eq!(wrap_text("abcdef", 4), vec!["abcd", "ef"]);
        assert_eq!(wrap_text("ééé", 2), vec!["éé", "é"]);
        assert_eq!(wrap_text("", 4), vec![""]);
        assert_eq!(wrap_text("abc", 0), vec!["abc"]);
    }

    #[test]
    fn test_long_lines_wrap_instead_of_clipping() {
        let opener = MockPortOpener::new();
        let port = opener.add_port("COM3");
        let mut app = app(&opener, &["COM3"]);
        app.messenger.connect_to("COM3").unwrap();
        app.messenger.username = "alice".into();
        app.messenger.input = format!("{}END", "x".repeat(101));
        app.messenger.send().unwrap();
        port.enqueue_read(b"bob: hi\n");
        app.messenger.poll_tick();

        let (_, buffer) = draw(&app);
        let (x, y) = find(&buffer, "END").unwrap();
        assert_eq!(buffer[(x, y)].fg, app.theme.sent_color);
        let (_, below) = find(&buffer, "bob: hi").unwrap();
        assert_eq!(below, y + 1);
    }
}
