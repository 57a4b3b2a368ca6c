//! # serde_lua_table
//!
//! A Serde-compatible codec for Lua table-constructor literals.
//!
//! ## What is a table literal?
//!
//! The data subset of Lua's table constructor syntax: `nil`, booleans, numbers, quoted
//! strings and nested `{ ... }` tables with positional entries, `name = value` entries and
//! `[key] = value` entries. It is the format Lua programs use for save files and
//! configuration, and it reads naturally in a text editor.
//!
//! ```lua
//! {
//!     name = "Alice",
//!     tags = { "rust", "lua" },
//!     [10] = 0x0A,
//!     -- comments are skipped
//! }
//! ```
//!
//! ## Key Features
//!
//! - **Serde Compatible**: any `#[derive(Serialize, Deserialize)]` type round-trips
//! - **Dynamic Values**: decode to [`LuaValue`] / [`LuaTable`] without a target type
//! - **Typed Tables**: with a [`TypeRegistry`], tables tagged `__type = "<name>"` are
//!   rebuilt as typed sequences, mappings and records with field conversion
//! - **Output Control**: [`LuaOptions`] toggles indentation, field type comments and type
//!   markers
//! - **No Unsafe Code**: written entirely in safe Rust
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! serde_lua_table = "0.1"
//! serde = { version = "1.0", features = ["derive"] }
//! ```
//!
//! ### Basic Serialization and Deserialization
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_lua_table::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct User {
//!     id: u32,
//!     name: String,
//!     active: bool,
//! }
//!
//! let user = User { id: 123, name: "Alice".to_string(), active: true };
//!
//! let text = to_string(&user).unwrap();
//! assert_eq!(text, r#"{id=123, name="Alice", active=true, }"#);
//!
//! let user_back: User = from_str(&text).unwrap();
//! assert_eq!(user, user_back);
//! ```
//!
//! ### Dynamic Values
//!
//! ```rust
//! use serde_lua_table::{parse_value, LuaValue};
//!
//! let value = parse_value("{ 'a', 'b', answer = 42, [7] = nil }").unwrap();
//! assert_eq!(value.get(2).and_then(LuaValue::as_str), Some("b"));
//! assert_eq!(value.get("answer").and_then(LuaValue::as_i64), Some(42));
//! assert_eq!(value.get(7), Some(&LuaValue::Nil));
//! ```
//!
//! ### Typed Reconstruction
//!
//! ```rust
//! use serde_lua_table::{
//!     FieldDescriptor, FieldType, LuaFormatter, LuaOptions, LuaValue, TypeDescriptor,
//!     TypeRegistry,
//! };
//!
//! let mut registry = TypeRegistry::new();
//! registry.register(
//!     "Point",
//!     TypeDescriptor::record(vec![
//!         FieldDescriptor::new("x", FieldType::Integer),
//!         FieldDescriptor::new("y", FieldType::Integer),
//!     ]),
//! );
//! let formatter = LuaFormatter::new(LuaOptions::new().with_deserialize_type(true), registry);
//!
//! let value = formatter.decode_str(r#"{ __type = "Point", x = "3" }"#).unwrap();
//! let point = value.as_typed().unwrap();
//! assert_eq!(point.field("x"), Some(&LuaValue::Integer(3)));
//! assert_eq!(point.field("y"), Some(&LuaValue::Integer(0)));
//! ```
//!
//! ## Performance Characteristics
//!
//! - **Serialization**: O(n) in the number of values, into one pre-allocated buffer
//! - **Deserialization**: single pass, one byte of lookahead plus bounded peeks
//! - **Nesting**: bounded by [`LuaOptions::max_depth`], so hostile input cannot exhaust
//!   the stack
//!
//! ## Examples
//!
//! See the `demos/` directory:
//!
//! - **`simple.rs`** - serialize and parse a struct
//! - **`typed_tables.rs`** - registry-driven reconstruction
//! - **`custom_options.rs`** - indentation, markup and type markers
//! - **`dynamic_values.rs`** - working with [`LuaValue`] and the `lua!` macro
//!
//! Run any example with: `cargo run --example <name>`

pub mod de;
pub mod error;
pub mod escape;
pub mod formatter;
pub mod macros;
pub mod options;
pub mod reconstruct;
mod scanner;
pub mod ser;
pub mod table;
pub mod value;

pub use de::Deserializer;
pub use error::{Error, ErrorKind, Result};
pub use formatter::LuaFormatter;
pub use options::{LuaOptions, DEFAULT_MAX_DEPTH};
pub use reconstruct::{
    FieldDescriptor, FieldType, LuaField, LuaType, Reconstructed, TypeDescriptor, TypeRegistry,
};
pub use ser::{Emitter, ValueSerializer};
pub use table::{LuaTable, TableKey, TYPE_KEY};
pub use value::{Field, LuaValue, Typed, TypedShape};

use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io;

/// Serialize any `T: Serialize` to a single-line table literal.
///
/// # Examples
///
/// ```rust
/// use serde_lua_table::to_string;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let point = Point { x: 1, y: 2 };
/// assert_eq!(to_string(&point).unwrap(), "{x=1, y=2, }");
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be represented (for example a map key that is
/// neither an integer nor a string) or nests deeper than the default depth limit.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, LuaOptions::default())
}

/// Serialize any `T: Serialize` to an indented table literal, one entry per line.
///
/// # Examples
///
/// ```rust
/// use serde_lua_table::to_string_pretty;
///
/// assert_eq!(to_string_pretty(&vec![1, 2]).unwrap(), "{\n\t1,\n\t2,\n}");
/// ```
///
/// # Errors
///
/// Same as [`to_string`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_pretty<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, LuaOptions::pretty())
}

/// Serialize any `T: Serialize` with explicit [`LuaOptions`].
///
/// # Examples
///
/// ```rust
/// use serde_lua_table::{to_string_with_options, LuaOptions};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Flag { on: bool }
///
/// let options = LuaOptions::new().with_serialize_type(true);
/// let text = to_string_with_options(&Flag { on: true }, options).unwrap();
/// assert!(text.starts_with("{__type=\""));
/// assert!(text.ends_with("::Flag\", on=true, }"));
/// ```
///
/// # Errors
///
/// Same as [`to_string`], with the depth limit taken from `options`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(value: &T, options: LuaOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    debug!("serializing {}", std::any::type_name::<T>());
    let value = ser::to_lua_value(value)?;
    ser::emit(&value, &options)
}

/// Convert any `T: Serialize` to a [`LuaValue`].
///
/// # Examples
///
/// ```rust
/// use serde_lua_table::{to_value, LuaValue};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let value = to_value(&Point { x: 1, y: 2 }).unwrap();
/// assert_eq!(value.get("y"), Some(&LuaValue::Integer(2)));
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be represented.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_value<T>(value: &T) -> Result<LuaValue>
where
    T: ?Sized + Serialize,
{
    ser::to_lua_value(value)
}

/// Serialize any `T: Serialize` into an [`io::Write`].
///
/// # Examples
///
/// ```rust
/// use serde_lua_table::to_writer;
///
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &("a", 1)).unwrap();
/// assert_eq!(buffer, br#"{"a", 1, }"#);
/// ```
///
/// # Errors
///
/// Returns an error if serialization fails or the writer reports an I/O error.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    to_writer_with_options(writer, value, LuaOptions::default())
}

/// Serialize any `T: Serialize` into an [`io::Write`] with explicit [`LuaOptions`].
///
/// # Errors
///
/// Returns an error if serialization fails or the writer reports an I/O error.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W, T>(mut writer: W, value: &T, options: LuaOptions) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let text = to_string_with_options(value, options)?;
    writer
        .write_all(text.as_bytes())
        .map_err(|e| Error::io(&e.to_string()))
}

/// Deserialize a `T` from a table literal.
///
/// # Examples
///
/// ```rust
/// use serde_lua_table::from_str;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_str("{ x = 1, y = 2 }").unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if the input is not a well-formed literal, uses an unsupported
/// construct, nests too deeply, or does not fit `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<'a, T>(s: &'a str) -> Result<T>
where
    T: Deserialize<'a>,
{
    let mut deserializer = Deserializer::from_str(s);
    T::deserialize(&mut deserializer)
}

/// Deserialize a `T` from an [`io::Read`].
///
/// # Examples
///
/// ```rust
/// use serde_lua_table::from_reader;
///
/// let numbers: Vec<i32> = from_reader(&b"{ 1, 2, 3 }"[..]).unwrap();
/// assert_eq!(numbers, vec![1, 2, 3]);
/// ```
///
/// # Errors
///
/// Returns an error if reading fails or for any reason listed on [`from_str`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(mut reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|e| Error::io(&e.to_string()))?;
    let mut deserializer = Deserializer::from_slice(&bytes);
    T::deserialize(&mut deserializer)
}

/// Deserialize a `T` from literal bytes.
///
/// Strings inside the literal must be valid UTF-8 once escapes are decoded.
///
/// # Examples
///
/// ```rust
/// use serde_lua_table::from_slice;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_slice(b"{x=1,y=2}").unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Same as [`from_str`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<'a, T>(v: &'a [u8]) -> Result<T>
where
    T: Deserialize<'a>,
{
    let mut deserializer = Deserializer::from_slice(v);
    T::deserialize(&mut deserializer)
}

/// Deserialize a `T` from an already decoded [`LuaValue`].
///
/// # Examples
///
/// ```rust
/// use serde_lua_table::{from_value, lua};
/// use std::collections::HashMap;
///
/// let map: HashMap<String, i64> = from_value(lua!({ "a" => 1, "b" => 2 })).unwrap();
/// assert_eq!(map["b"], 2);
/// ```
///
/// # Errors
///
/// Returns an error if the value does not fit `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_value<T>(value: LuaValue) -> Result<T>
where
    T: DeserializeOwned,
{
    T::deserialize(de::ValueDeserializer::new(value))
}

/// Decode a literal into a dynamic [`LuaValue`] with default options.
///
/// # Examples
///
/// ```rust
/// use serde_lua_table::{parse_value, LuaValue};
///
/// assert_eq!(parse_value("").unwrap(), LuaValue::Nil);
/// assert_eq!(parse_value("0x10").unwrap(), LuaValue::Integer(16));
/// ```
///
/// # Errors
///
/// Returns an error if the input is not a well-formed literal.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_value(s: &str) -> Result<LuaValue> {
    parse_value_with_options(s, LuaOptions::default())
}

/// Decode a literal into a dynamic [`LuaValue`] with explicit [`LuaOptions`].
///
/// Without a registry tagged tables stay plain tables; use [`LuaFormatter`] to reconstruct
/// them.
///
/// # Errors
///
/// Returns an error if the input is not a well-formed literal or nests deeper than
/// `options.max_depth`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_value_with_options(s: &str, options: LuaOptions) -> Result<LuaValue> {
    Deserializer::from_str(s).with_options(options).parse_document()
}
