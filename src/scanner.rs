//! Byte cursor used by every decoder.
//!
//! The scanner never hands out indices into the underlying buffer; decoders only peek
//! ahead or consume. Delimited tokens (numbers, `nil`, booleans) stop
//! *before* their delimiter so a closing `}` is always left for the table decoder.

use std::borrow::Cow;

/// Whitespace as understood by the literal grammar (ASCII whitespace plus vertical tab).
#[inline]
pub(crate) fn is_space(b: u8) -> bool {
    b.is_ascii_whitespace() || b == 0x0B
}

/// Bytes that end a delimited token.
#[inline]
pub(crate) fn is_delimiter(b: u8) -> bool {
    is_space(b) || b == b',' || b == b'}'
}

#[inline]
fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// A peekable cursor over an in-memory byte source.
#[derive(Clone, Debug)]
pub struct Scanner<'a> {
    input: &'a [u8],
    position: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Scanner { input, position: 0 }
    }

    /// Current byte offset, used for error reporting.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.position >= self.input.len()
    }

    #[inline]
    pub fn peek(&self) -> Option<u8> {
        self.input.get(self.position).copied()
    }

    /// Looks `n` bytes past the cursor without consuming anything.
    #[inline]
    pub fn peek_nth(&self, n: usize) -> Option<u8> {
        self.input.get(self.position + n).copied()
    }

    /// Consumes and returns the next byte, or `None` at end of input.
    #[inline]
    pub fn next_byte(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.position += 1;
        Some(b)
    }

    pub fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b) if is_space(b)) {
            self.position += 1;
        }
    }

    /// Skips whitespace and `,` entry separators.
    pub fn skip_separators(&mut self) {
        while matches!(self.peek(), Some(b) if is_space(b) || b == b',') {
            self.position += 1;
        }
    }

    /// Reads up to (not including) the next whitespace, `,`, `}` or end of input.
    pub fn read_token(&mut self) -> Cow<'a, str> {
        let start = self.position;
        while matches!(self.peek(), Some(b) if !is_delimiter(b)) {
            self.position += 1;
        }
        String::from_utf8_lossy(&self.input[start..self.position])
    }

    /// Returns the identifier-shaped run at the cursor without consuming it.
    pub fn peek_word(&self) -> &'a [u8] {
        let rest = &self.input[self.position.min(self.input.len())..];
        let len = rest.iter().take_while(|&&b| is_word_byte(b)).count();
        &rest[..len]
    }

    /// Returns the first non-whitespace byte at or after `offset` bytes past the cursor.
    pub fn peek_significant_from(&self, offset: usize) -> Option<u8> {
        self.input
            .get(self.position + offset..)?
            .iter()
            .copied()
            .find(|&b| !is_space(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peek_does_not_consume() {
        let mut scanner = Scanner::new(b"ab");
        assert_eq!(scanner.peek(), Some(b'a'));
        assert_eq!(scanner.peek_nth(1), Some(b'b'));
        assert_eq!(scanner.position(), 0);
        assert_eq!(scanner.next_byte(), Some(b'a'));
        assert_eq!(scanner.next_byte(), Some(b'b'));
        assert_eq!(scanner.next_byte(), None);
        assert!(scanner.is_at_end());
    }

    #[test]
    fn test_read_token_leaves_delimiter() {
        let mut scanner = Scanner::new(b"123}");
        assert_eq!(scanner.read_token(), "123");
        assert_eq!(scanner.peek(), Some(b'}'));

        let mut scanner = Scanner::new(b"nil, 2");
        assert_eq!(scanner.read_token(), "nil");
        assert_eq!(scanner.peek(), Some(b','));
    }

    #[test]
    fn test_skip_separators() {
        let mut scanner = Scanner::new(b" ,\t,\n x");
        scanner.skip_separators();
        assert_eq!(scanner.peek(), Some(b'x'));
    }

    #[test]
    fn test_peek_word_and_significant() {
        let scanner = Scanner::new(b"true = 1");
        assert_eq!(scanner.peek_word(), b"true");
        assert_eq!(scanner.peek_significant_from(4), Some(b'='));
        assert_eq!(Scanner::new(b"").peek_word(), b"");
    }

    #[test]
    fn test_vertical_tab_is_whitespace() {
        let mut scanner = Scanner::new(b"\x0B\x0C 1");
        scanner.skip_whitespace();
        assert_eq!(scanner.peek(), Some(b'1'));
    }
}
