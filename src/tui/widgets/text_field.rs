//! Single-line text editing.
//!
//! [`TextField`] only tracks the cursor; the text itself lives in the
//! messenger so the model stays the single source of truth for field
//! contents.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Cursor state for a one-line input field. The cursor is a byte offset
/// that always sits on a `char` boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextField {
    cursor: usize,
}

impl TextField {
    /// A field with the cursor after the existing text.
    pub fn at_end(text: &str) -> Self {
        Self { cursor: text.len() }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Cursor position in characters, for placing the terminal cursor.
    pub fn column(&self, text: &str) -> usize {
        text[..self.clamped(text)].chars().count()
    }

    /// Pull the cursor back inside `text` after it changed underneath us.
    pub fn clamp(&mut self, text: &str) {
        self.cursor = self.clamped(text);
    }

    fn clamped(&self, text: &str) -> usize {
        let mut pos = self.cursor.min(text.len());
        while !text.is_char_boundary(pos) {
            pos -= 1;
        }
        pos
    }

    pub fn insert(&mut self, text: &mut String, c: char) {
        self.clamp(text);
        text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    pub fn backspace(&mut self, text: &mut String) {
        self.clamp(text);
        if let Some((idx, _)) = text[..self.cursor].char_indices().next_back() {
            text.remove(idx);
            self.cursor = idx;
        }
    }

    pub fn delete(&mut self, text: &mut String) {
        self.clamp(text);
        if self.cursor < text.len() {
            text.remove(self.cursor);
        }
    }

    pub fn left(&mut self, text: &str) {
        self.clamp(text);
        if let Some((idx, _)) = text[..self.cursor].char_indices().next_back() {
            self.cursor = idx;
        }
    }

    pub fn right(&mut self, text: &str) {
        self.clamp(text);
        if let Some(c) = text[self.cursor..].chars().next() {
            self.cursor += c.len_utf8();
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self, text: &str) {
        self.cursor = text.len();
    }

    /// Apply an editing key. Returns `false` if the key is not an editing
    /// key, so the caller can handle it.
    pub fn handle_key(&mut self, text: &mut String, key: KeyEvent) -> bool {
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return false;
        }
        match key.code {
            KeyCode::Char(c) if !c.is_control() => self.insert(text, c),
            KeyCode::Backspace => self.backspace(text),
            KeyCode::Delete => self.delete(text),
            KeyCode::Left => self.left(text),
            KeyCode::Right => self.right(text),
            KeyCode::Home => self.home(),
            KeyCode::End => self.end(text),
            _ => return false,
        }
        true
    }
}
