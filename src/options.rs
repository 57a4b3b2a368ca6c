//! Configuration options for the Lua literal codec.
//!
//! [`LuaOptions`] holds four independent switches plus a nesting limit:
//!
//! - `indenting`: pretty-print tables with newlines and tab indentation
//! - `markup_output`: emit a `-- <type>` comment line before every record field
//!   (implies the multi-line layout of `indenting`)
//! - `serialize_type`: write a leading `__type="<type name>"` entry into every emitted table
//! - `deserialize_type`: reconstruct typed values from tables carrying a `__type` entry
//!
//! ## Examples
//!
//! ```rust
//! use serde_lua_table::{to_string_with_options, LuaOptions};
//!
//! let options = LuaOptions::new().with_indenting(true);
//! let lua = to_string_with_options(&vec![1, 2], options).unwrap();
//! assert_eq!(lua, "{\n\t1,\n\t2,\n}");
//! ```

/// Nesting limit applied when [`LuaOptions::max_depth`] is left at its default.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Configuration for encoding and decoding.
///
/// Options are plain data: build them once, hand them to a codec and treat them as read-only.
///
/// # Examples
///
/// ```rust
/// use serde_lua_table::LuaOptions;
///
/// let options = LuaOptions::new()
///     .with_serialize_type(true)
///     .with_deserialize_type(true);
/// assert!(!options.is_multiline());
/// assert!(LuaOptions::markup().is_multiline());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LuaOptions {
    pub indenting: bool,
    pub markup_output: bool,
    pub serialize_type: bool,
    pub deserialize_type: bool,
    /// `None` disables the limit.
    pub max_depth: Option<usize>,
}

impl Default for LuaOptions {
    fn default() -> Self {
        LuaOptions {
            indenting: false,
            markup_output: false,
            serialize_type: false,
            deserialize_type: false,
            max_depth: Some(DEFAULT_MAX_DEPTH),
        }
    }
}

impl LuaOptions {
    /// Creates default options: single-line output, no type markers.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_lua_table::LuaOptions;
    ///
    /// let options = LuaOptions::new();
    /// assert!(!options.indenting);
    /// assert!(!options.deserialize_type);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates options for tab-indented, one-entry-per-line output.
    #[must_use]
    pub fn pretty() -> Self {
        LuaOptions {
            indenting: true,
            ..Default::default()
        }
    }

    /// Creates options that annotate every record field with its declared type.
    #[must_use]
    pub fn markup() -> Self {
        LuaOptions {
            markup_output: true,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_indenting(mut self, indenting: bool) -> Self {
        self.indenting = indenting;
        self
    }

    #[must_use]
    pub fn with_markup_output(mut self, markup_output: bool) -> Self {
        self.markup_output = markup_output;
        self
    }

    #[must_use]
    pub fn with_serialize_type(mut self, serialize_type: bool) -> Self {
        self.serialize_type = serialize_type;
        self
    }

    #[must_use]
    pub fn with_deserialize_type(mut self, deserialize_type: bool) -> Self {
        self.deserialize_type = deserialize_type;
        self
    }

    /// Sets the maximum table nesting depth; `None` removes the limit.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_lua_table::{parse_value_with_options, ErrorKind, LuaOptions};
    ///
    /// let options = LuaOptions::new().with_max_depth(Some(2));
    /// let err = parse_value_with_options("{{{}}}", options).unwrap_err();
    /// assert_eq!(err.kind(), ErrorKind::MalformedLiteral);
    /// ```
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Returns `true` when entries are written one per line.
    #[inline]
    #[must_use]
    pub const fn is_multiline(&self) -> bool {
        self.indenting || self.markup_output
    }
}
