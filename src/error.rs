//! Error types for Lua literal encoding and decoding.
//!
//! Decoding stops at the first problem; the returned [`Error`] carries the byte offset
//! where it was detected.
//!
//! ## Error Categories
//!
//! - **Unexpected end of input**: the input ran out mid-token, mid-escape, mid-string or mid-table
//! - **Malformed literals**: a token does not match the expected production
//! - **Unsupported features**: hex floats, long-bracket strings and comments, multi-dimensional arrays
//! - **Type mismatches**: a requested target type cannot be produced from the decoded shape
//!
//! Host adapters that need a coarse classification (for example to pick a response status)
//! should match on [`Error::kind`] rather than on individual variants.
//!
//! ## Examples
//!
//! ```rust
//! use serde_lua_table::{parse_value, ErrorKind};
//!
//! let err = parse_value("nill").unwrap_err();
//! assert_eq!(err.kind(), ErrorKind::MalformedLiteral);
//! assert_eq!(err.position(), Some(0));
//! ```

use std::fmt;
use thiserror::Error;

/// Coarse classification of an [`Error`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    UnexpectedEndOfInput,
    MalformedLiteral,
    UnsupportedFeature,
    TypeMismatch,
    /// I/O failures and free-form serde messages.
    Other,
}

/// Represents all possible errors that can occur while encoding or decoding Lua literals.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// IO error during reading or writing
    #[error("IO error: {0}")]
    Io(String),

    /// The input ended before the current production was complete
    #[error("Unexpected end of input at position {position}: expected {expected}")]
    UnexpectedEof { position: usize, expected: String },

    /// A token does not match the production the decoder expected
    #[error("Malformed literal at position {position}: {msg}")]
    MalformedLiteral { position: usize, msg: String },

    /// Recognized syntax that this codec deliberately does not implement
    #[error("Unsupported feature at position {position}: {feature}")]
    UnsupportedFeature { position: usize, feature: String },

    /// The decoded shape cannot be turned into the requested type
    #[error("Type mismatch{}: expected {expected}, found {found}", at(.position))]
    TypeMismatch {
        position: Option<usize>,
        expected: String,
        found: String,
    },

    /// Tables nested deeper than the configured limit
    #[error("Nesting deeper than {limit} levels at position {position}")]
    DepthLimitExceeded { position: usize, limit: usize },

    /// Custom error
    #[error("Error: {0}")]
    Custom(String),
}

fn at(position: &Option<usize>) -> String {
    position
        .map(|p| format!(" at position {}", p))
        .unwrap_or_default()
}

impl Error {
    /// Creates an unexpected end-of-input error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_lua_table::Error;
    ///
    /// let err = Error::unexpected_eof(7, "closing quote");
    /// assert!(err.to_string().contains("position 7"));
    /// ```
    pub fn unexpected_eof(position: usize, expected: &str) -> Self {
        Error::UnexpectedEof {
            position,
            expected: expected.to_string(),
        }
    }

    /// Creates a malformed-literal error.
    pub fn malformed<T: fmt::Display>(position: usize, msg: T) -> Self {
        Error::MalformedLiteral {
            position,
            msg: msg.to_string(),
        }
    }

    /// Creates an unsupported-feature error.
    pub fn unsupported(position: usize, feature: &str) -> Self {
        Error::UnsupportedFeature {
            position,
            feature: feature.to_string(),
        }
    }

    /// Creates a type mismatch error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_lua_table::Error;
    ///
    /// let err = Error::type_mismatch(Some(5), "integer", "string");
    /// assert!(err.to_string().contains("expected integer"));
    /// ```
    pub fn type_mismatch(position: Option<usize>, expected: &str, found: &str) -> Self {
        Error::TypeMismatch {
            position,
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub fn depth_limit(position: usize, limit: usize) -> Self {
        Error::DepthLimitExceeded { position, limit }
    }

    /// Creates a custom error with a display message.
    pub fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    /// Creates an I/O error for reader/writer failures.
    pub fn io(msg: &str) -> Self {
        Error::Io(msg.to_string())
    }

    /// Returns the coarse classification of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnexpectedEof { .. } => ErrorKind::UnexpectedEndOfInput,
            Error::MalformedLiteral { .. } | Error::DepthLimitExceeded { .. } => {
                ErrorKind::MalformedLiteral
            }
            Error::UnsupportedFeature { .. } => ErrorKind::UnsupportedFeature,
            Error::TypeMismatch { .. } => ErrorKind::TypeMismatch,
            Error::Io(_) | Error::Custom(_) => ErrorKind::Other,
        }
    }

    /// Returns the byte offset at which the error was detected, when known.
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        match self {
            Error::UnexpectedEof { position, .. }
            | Error::MalformedLiteral { position, .. }
            | Error::UnsupportedFeature { position, .. }
            | Error::DepthLimitExceeded { position, .. } => Some(*position),
            Error::TypeMismatch { position, .. } => *position,
            Error::Io(_) | Error::Custom(_) => None,
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }

    fn invalid_type(unexp: serde::de::Unexpected, exp: &dyn serde::de::Expected) -> Self {
        Error::type_mismatch(None, &exp.to_string(), &unexp.to_string())
    }

    fn invalid_value(unexp: serde::de::Unexpected, exp: &dyn serde::de::Expected) -> Self {
        Error::type_mismatch(None, &exp.to_string(), &unexp.to_string())
    }

    fn invalid_length(len: usize, exp: &dyn serde::de::Expected) -> Self {
        Error::type_mismatch(None, &exp.to_string(), &format!("{} entries", len))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::Error as _;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            Error::unexpected_eof(0, "value").kind(),
            ErrorKind::UnexpectedEndOfInput
        );
        assert_eq!(Error::malformed(3, "bad").kind(), ErrorKind::MalformedLiteral);
        assert_eq!(
            Error::unsupported(1, "hex float").kind(),
            ErrorKind::UnsupportedFeature
        );
        assert_eq!(
            Error::type_mismatch(None, "record", "integer").kind(),
            ErrorKind::TypeMismatch
        );
        assert_eq!(Error::depth_limit(9, 4).kind(), ErrorKind::MalformedLiteral);
        assert_eq!(Error::io("closed").kind(), ErrorKind::Other);
    }

    #[test]
    fn test_type_mismatch_display_with_and_without_position() {
        let with = Error::type_mismatch(Some(12), "record", "integer");
        assert_eq!(
            with.to_string(),
            "Type mismatch at position 12: expected record, found integer"
        );
        let without = Error::type_mismatch(None, "record", "integer");
        assert_eq!(
            without.to_string(),
            "Type mismatch: expected record, found integer"
        );
    }

    #[test]
    fn test_serde_invalid_type_is_type_mismatch() {
        let err = Error::invalid_type(serde::de::Unexpected::Bool(true), &"a string");
        assert_eq!(err.kind(), ErrorKind::TypeMismatch);
        assert_eq!(err.position(), None);
    }
}
