//! Theme definitions for the TUI.

use crate::transcript::Direction;
use ratatui::style::Color;

/// A color theme for the TUI.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Theme name
    pub name: &'static str,

    // Base colors
    /// Background color
    pub bg: Color,
    /// Foreground (text) color
    pub fg: Color,

    // Semantic colors
    /// Color for messages we sent
    pub sent_color: Color,
    /// Color for messages received from the radio
    pub received_color: Color,
    /// Color for the status line when it reports a problem
    pub error_color: Color,
    /// Color for the connection indicator
    pub success_color: Color,

    // UI element colors
    /// Border color
    pub border: Color,
    /// Selection/highlight color
    pub selection: Color,
    /// Inactive element color
    pub inactive: Color,
    /// Accent color for the focused element
    pub accent: Color,
}

impl Theme {
    /// Terminal default colors with green sent / blue received lines.
    pub const fn classic() -> Self {
        Self {
            name: "classic",
            bg: Color::Reset,
            fg: Color::Reset,
            sent_color: Color::Rgb(0x33, 0xcc, 0x33),
            received_color: Color::Rgb(0x33, 0x33, 0xff),
            error_color: Color::Red,
            success_color: Color::Green,
            border: Color::Gray,
            selection: Color::DarkGray,
            inactive: Color::DarkGray,
            accent: Color::Yellow,
        }
    }

    /// Dark theme
    pub const fn dark() -> Self {
        Self {
            name: "dark",
            bg: Color::Rgb(30, 30, 46),
            fg: Color::Rgb(205, 214, 244),
            sent_color: Color::Rgb(166, 227, 161),
            received_color: Color::Rgb(137, 180, 250),
            error_color: Color::Rgb(243, 139, 168),
            success_color: Color::Rgb(166, 227, 161),
            border: Color::Rgb(88, 91, 112),
            selection: Color::Rgb(69, 71, 90),
            inactive: Color::Rgb(108, 112, 134),
            accent: Color::Rgb(203, 166, 247),
        }
    }

    /// Light theme
    pub const fn light() -> Self {
        Self {
            name: "light",
            bg: Color::Rgb(239, 241, 245),
            fg: Color::Rgb(76, 79, 105),
            sent_color: Color::Rgb(64, 160, 43),
            received_color: Color::Rgb(30, 102, 245),
            error_color: Color::Rgb(210, 15, 57),
            success_color: Color::Rgb(64, 160, 43),
            border: Color::Rgb(172, 176, 190),
            selection: Color::Rgb(204, 208, 218),
            inactive: Color::Rgb(140, 143, 161),
            accent: Color::Rgb(136, 57, 239),
        }
    }

    /// Get theme by name
    pub fn by_name(name: &str) -> Option<&'static Theme> {
        THEMES.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Text color for a transcript entry.
    pub fn direction_color(&self, direction: Direction) -> Color {
        match direction {
            Direction::Sent => self.sent_color,
            Direction::Received => self.received_color,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

/// Available themes
pub static THEMES: &[Theme] = &[Theme::classic(), Theme::dark(), Theme::light()];
