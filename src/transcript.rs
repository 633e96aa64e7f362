//! The chat transcript: an append-only history of rendered messages.

use std::fmt;

/// Which way a transcript entry travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Composed locally and handed to the writer.
    Sent,
    /// Read from the serial link.
    Received,
}

impl Direction {
    /// Short marker used by plain-text front-ends.
    pub fn marker(self) -> &'static str {
        match self {
            Self::Sent => ">>",
            Self::Received => "<<",
        }
    }
}

/// One rendered line of the conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub direction: Direction,
    pub text: String,
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.direction.marker(), self.text)
    }
}

/// Ordered, append-only list of entries. Never truncated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    entries: Vec<Entry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_sent(&mut self, text: impl Into<String>) {
        self.push(Direction::Sent, text.into());
    }

    pub fn push_received(&mut self, text: impl Into<String>) {
        self.push(Direction::Received, text.into());
    }

    fn push(&mut self, direction: Direction, text: String) {
        self.entries.push(Entry { direction, text });
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Entries appended after the first `start` ones.
    pub fn since(&self, start: usize) -> &[Entry] {
        self.entries.get(start..).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
