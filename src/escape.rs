//! Escape spellings for quoted string literals.
//!
//! Encoding works per character with a fixed priority: named control and special
//! characters first, then the generic ranges (`\DDD` below 0x20 and in 0x7E..=0xFF,
//! `\u{hex}` above 0xFF). Decoding is the inverse and runs directly on a [`Scanner`]
//! positioned just after a backslash.

use crate::scanner::Scanner;
use crate::{Error, Result};
use std::borrow::Cow;

/// Returns the literal spelling of a single character.
///
/// # Examples
///
/// ```rust
/// use serde_lua_table::escape::escape_char;
///
/// assert_eq!(escape_char('\n'), "\\n");
/// assert_eq!(escape_char('['), "\\[");
/// assert_eq!(escape_char('\u{7f}'), "\\127");
/// assert_eq!(escape_char('\u{263a}'), "\\u{263a}");
/// assert_eq!(escape_char('a'), "a");
/// ```
pub fn escape_char(c: char) -> Cow<'static, str> {
    let spelled = match c {
        '\0' => "\\0",
        '\u{08}' => "\\b",
        '\u{0C}' => "\\f",
        '\n' => "\\n",
        '\r' => "\\r",
        '\t' => "\\t",
        '\u{0B}' => "\\v",
        '\\' => "\\\\",
        '"' => "\\\"",
        '\'' => "\\'",
        '[' => "\\[",
        ']' => "\\]",
        c if (c as u32) < 0x20 || (0x7E..=0xFF).contains(&(c as u32)) => {
            return Cow::Owned(format!("\\{:03}", c as u32));
        }
        c if (c as u32) > 0xFF => return Cow::Owned(format!("\\u{{{:x}}}", c as u32)),
        c => return Cow::Owned(c.to_string()),
    };
    Cow::Borrowed(spelled)
}

/// Appends `s` to `out` as a double-quoted literal.
///
/// A NUL followed by an ASCII digit is spelled `\000` so the decoder cannot read the
/// digit as part of a decimal escape.
pub fn write_quoted(out: &mut String, s: &str) {
    out.reserve(s.len() + 2);
    out.push('"');
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\0' && matches!(chars.peek(), Some(d) if d.is_ascii_digit()) {
            out.push_str("\\000");
        } else {
            out.push_str(&escape_char(c));
        }
    }
    out.push('"');
}

fn push_char(out: &mut Vec<u8>, c: char) {
    let mut buf = [0u8; 4];
    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
}

fn code_point(position: usize, value: u32) -> Result<char> {
    char::from_u32(value)
        .ok_or_else(|| Error::malformed(position, format!("invalid code point {:#x}", value)))
}

fn hex_value(b: u8) -> Option<u32> {
    (b as char).to_digit(16)
}

/// Decodes one escape sequence. The scanner must sit just past the backslash;
/// the decoded character is appended to `out` as UTF-8.
pub(crate) fn decode_escape(scanner: &mut Scanner<'_>, out: &mut Vec<u8>) -> Result<()> {
    let start = scanner.position();
    let b = scanner
        .next_byte()
        .ok_or_else(|| Error::unexpected_eof(start, "escape sequence"))?;
    match b {
        b'a' => out.push(0x07),
        b'b' => out.push(0x08),
        b'f' => out.push(0x0C),
        b'n' => out.push(b'\n'),
        b'r' => out.push(b'\r'),
        b't' => out.push(b'\t'),
        b'v' => out.push(0x0B),
        b'\\' | b'"' | b'\'' | b'[' | b']' => out.push(b),
        b'0'..=b'9' => {
            let decimal = matches!(
                (scanner.peek(), scanner.peek_nth(1)),
                (Some(d1), Some(d2)) if d1.is_ascii_digit() && d2.is_ascii_digit()
            );
            if decimal {
                let mut value = u32::from(b - b'0');
                for _ in 0..2 {
                    let d = scanner.next_byte().map_or(0, |d| u32::from(d - b'0'));
                    value = value * 10 + d;
                }
                push_char(out, code_point(start, value)?);
            } else if b == b'0' {
                out.push(0);
            } else {
                let offset = usize::from(matches!(scanner.peek(), Some(d) if d.is_ascii_digit()));
                let at = scanner.position() + offset;
                return Err(match scanner.peek_nth(offset) {
                    None => Error::unexpected_eof(at, "three-digit decimal escape"),
                    Some(c) => Error::malformed(
                        at,
                        format!("non-digit character '{}' in decimal escape", c as char),
                    ),
                });
            }
        }
        b'x' => {
            let mut value = 0;
            for _ in 0..2 {
                let at = scanner.position();
                let d = scanner
                    .next_byte()
                    .ok_or_else(|| Error::unexpected_eof(at, "two hex digits"))?;
                let digit = hex_value(d).ok_or_else(|| {
                    Error::malformed(at, format!("non-hex character '{}' in \\x escape", d as char))
                })?;
                value = value * 16 + digit;
            }
            push_char(out, code_point(start, value)?);
        }
        b'u' => {
            let at = scanner.position();
            match scanner.next_byte() {
                Some(b'{') => {}
                Some(other) => {
                    return Err(Error::malformed(
                        at,
                        format!("expected '{{' after \\u, found '{}'", other as char),
                    ))
                }
                None => return Err(Error::unexpected_eof(at, "'{' after \\u")),
            }
            let mut value: u32 = 0;
            let mut digits = 0;
            loop {
                let at = scanner.position();
                match scanner.next_byte() {
                    Some(b'}') if digits > 0 => break,
                    Some(d) => {
                        let digit = hex_value(d).ok_or_else(|| {
                            Error::malformed(
                                at,
                                format!("non-hex character '{}' in \\u escape", d as char),
                            )
                        })?;
                        value = value
                            .checked_mul(16)
                            .and_then(|v| v.checked_add(digit))
                            .ok_or_else(|| Error::malformed(at, "\\u escape out of range"))?;
                        digits += 1;
                    }
                    None => return Err(Error::unexpected_eof(at, "'}' closing \\u escape")),
                }
            }
            push_char(out, code_point(start, value)?);
        }
        other => {
            return Err(Error::malformed(
                start,
                format!("invalid escape character '{}'", other as char),
            ))
        }
    }
    Ok(())
}
