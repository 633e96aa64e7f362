//! Line framing for the serial link.
//!
//! Messages travel as UTF-8 text terminated by `\n`. There is no header,
//! length prefix or escaping; a line is whatever sits between two
//! terminators.

use memchr::{memchr, memrchr};
use thiserror::Error;

/// Line terminator on the wire.
pub const LINE_TERMINATOR: u8 = b'\n';

/// Default cap on an unterminated inbound line.
pub const DEFAULT_MAX_LINE_BYTES: usize = 4096;

/// Errors raised while turning inbound bytes into text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("received line is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("discarded {0} bytes without a line terminator")]
    Overflow(usize),
}

/// Encode one outbound line: the text followed by the terminator.
pub fn encode_line(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len() + 1);
    bytes.extend_from_slice(text.as_bytes());
    bytes.push(LINE_TERMINATOR);
    bytes
}

/// Decode one inbound line and trim surrounding whitespace (including a
/// trailing `\r`).
pub fn decode_line(raw: &[u8]) -> Result<String, CodecError> {
    Ok(std::str::from_utf8(raw)?.trim().to_string())
}

/// Accumulates inbound bytes and hands out complete lines.
///
/// A partial line stays buffered until its terminator arrives. A line that
/// outgrows the limit is dropped as a whole, including the bytes that arrive
/// after the overflow.
#[derive(Debug, Clone)]
pub struct LineBuffer {
    pending: Vec<u8>,
    max_line_bytes: usize,
    /// Set after an overflow until the oversized line's terminator is seen.
    discarding: bool,
}

impl Default for LineBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_BYTES)
    }
}

impl LineBuffer {
    pub fn new(max_line_bytes: usize) -> Self {
        Self {
            pending: Vec::new(),
            max_line_bytes,
            discarding: false,
        }
    }

    /// Append received bytes.
    ///
    /// If the unterminated tail grows past the limit it is dropped,
    /// `CodecError::Overflow` reports how much was lost, and everything up to
    /// and including that line's terminator is skipped on later pushes.
    /// Complete lines already buffered are kept.
    pub fn push(&mut self, mut bytes: &[u8]) -> Result<(), CodecError> {
        if self.discarding {
            match memchr(LINE_TERMINATOR, bytes) {
                Some(end) => {
                    self.discarding = false;
                    bytes = &bytes[end + 1..];
                }
                None => return Ok(()),
            }
        }
        self.pending.extend_from_slice(bytes);

        let tail_start = memrchr(LINE_TERMINATOR, &self.pending).map_or(0, |i| i + 1);
        let tail_len = self.pending.len() - tail_start;
        if tail_len > self.max_line_bytes {
            self.pending.truncate(tail_start);
            self.discarding = true;
            return Err(CodecError::Overflow(tail_len));
        }
        Ok(())
    }

    /// Remove and return the next complete line without its terminator.
    pub fn next_line(&mut self) -> Option<Vec<u8>> {
        let end = memchr(LINE_TERMINATOR, &self.pending)?;
        let mut line: Vec<u8> = self.pending.drain(..=end).collect();
        line.pop();
        Some(line)
    }

    /// Bytes received but not yet part of a complete line.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_appends_terminator() {
        assert_eq!(encode_line("alice: hello"), b"alice: hello\n");
        assert_eq!(encode_line("мир"), "мир\n".as_bytes());
    }

    #[test]
    fn test_decode_trims() {
        assert_eq!(decode_line(b"  bob: hi\r").unwrap(), "bob: hi");
        assert_eq!(decode_line(b"   ").unwrap(), "");
    }

    #[test]
    fn test_decode_rejects_invalid_utf8() {
        let err = decode_line(&[0x62, 0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, CodecError::InvalidUtf8(_)));
    }

    #[test]
    fn test_partial_line_waits_for_terminator() {
        let mut buffer = LineBuffer::default();
        buffer.push(b"bob: h").unwrap();
        assert_eq!(buffer.next_line(), None);
        assert_eq!(buffer.pending_len(), 6);

        buffer.push(b"i\ncarol").unwrap();
        assert_eq!(buffer.next_line().as_deref(), Some(&b"bob: hi"[..]));
        assert_eq!(buffer.next_line(), None);
        assert_eq!(buffer.pending_len(), 5);
    }

    #[test]
    fn test_multiple_lines_in_one_chunk() {
        let mut buffer = LineBuffer::default();
        buffer.push(b"a\nb\n\nc\n").unwrap();
        let lines: Vec<Vec<u8>> = std::iter::from_fn(|| buffer.next_line()).collect();
        assert_eq!(lines, vec![b"a".to_vec(), b"b".to_vec(), Vec::new(), b"c".to_vec()]);
    }

    #[test]
    fn test_overflow_drops_only_the_tail() {
        let mut buffer = LineBuffer::new(8);
        buffer.push(b"ok\n").unwrap();
        let err = buffer.push(b"0123456789").unwrap_err();
        assert_eq!(err, CodecError::Overflow(10));
        assert_eq!(buffer.next_line().as_deref(), Some(&b"ok"[..]));
        assert_eq!(buffer.pending_len(), 0);
    }

    #[test]
    fn test_overflowed_line_is_skipped_until_its_terminator() {
        let mut buffer = LineBuffer::new(8);
        assert!(buffer.push(b"0123456789").is_err());

        buffer.push(b"still the same line").unwrap();
        assert_eq!(buffer.next_line(), None);
        assert_eq!(buffer.pending_len(), 0);

        buffer.push(b"-END
bob: hi
").unwrap();
        assert_eq!(buffer.next_line().as_deref(), Some(&b"bob: hi"[..]));
        assert_eq!(buffer.next_line(), None);
    }

    #[test]
    fn test_overflow_and_terminator_in_one_chunk() {
        let mut buffer = LineBuffer::new(4);
        assert!(buffer.push(b"ok
0123456").is_err());
        buffer.push(b"789
next
").unwrap();
        let lines: Vec<Vec<u8>> = std::iter::from_fn(|| buffer.next_line()).collect();
        assert_eq!(lines, vec![b"ok".to_vec(), b"next".to_vec()]);
    }
}
