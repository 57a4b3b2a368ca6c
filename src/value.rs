//! Dynamic value representation for Lua literals.
//!
//! This module provides the [`LuaValue`] enum, the universal output of the decoder and
//! the universal input of the emitter. Host types enter and leave it through serde
//! (see [`to_value`](crate::to_value) and [`from_value`](crate::from_value)).
//!
//! ## Core Types
//!
//! - [`LuaValue`]: nil, boolean, integer, float, char, string, table or typed value
//! - [`Typed`]: a structured value that knows its type name, produced by the typed
//!   reconstructor or by serializing a Rust struct, sequence or map
//! - [`TypedShape`]: the three structured shapes (sequence, mapping, record)
//!
//! ## Usage Patterns
//!
//! ### Creating Values
//!
//! ```rust
//! use serde_lua_table::{lua, LuaValue};
//!
//! let nil = LuaValue::Nil;
//! let flag = LuaValue::from(true);
//! let number = LuaValue::from(42);
//! let text = LuaValue::from("hello");
//!
//! let table = lua!({ "name" => "Alice", "age" => 30 });
//! assert_eq!(table.get("age"), Some(&LuaValue::Integer(30)));
//! ```
//!
//! ### Extracting Values
//!
//! ```rust
//! use serde_lua_table::{parse_value, LuaValue};
//! use std::convert::TryFrom;
//!
//! let value = parse_value("12345").unwrap();
//! let n: i64 = i64::try_from(value).unwrap();
//! assert_eq!(n, 12345);
//! ```
//!
//! ### Converting from Rust Types
//!
//! ```rust
//! use serde_lua_table::{to_value, LuaValue};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Point { x: i32, y: i32 }
//!
//! let value = to_value(&Point { x: 10, y: 20 }).unwrap();
//! let typed = value.as_typed().unwrap();
//! assert!(typed.type_name.ends_with("Point"));
//! assert_eq!(value.get("y"), Some(&LuaValue::Integer(20)));
//! ```

use crate::table::TableKey;
use crate::{Error, LuaOptions, LuaTable};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A dynamically-typed Lua literal value.
///
/// # Examples
///
/// ```rust
/// use serde_lua_table::LuaValue;
///
/// let nil = LuaValue::Nil;
/// let num = LuaValue::Integer(42);
/// let text = LuaValue::String("hello".to_string());
///
/// assert!(nil.is_nil());
/// assert!(num.is_number());
/// assert!(text.is_string());
/// ```
#[derive(Clone, Debug, PartialEq, Default)]
pub enum LuaValue {
    #[default]
    Nil,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Char(char),
    String(String),
    Table(LuaTable),
    Typed(Box<Typed>),
}

/// A structured value tagged with the name of the type it represents.
#[derive(Clone, Debug, PartialEq)]
pub struct Typed {
    /// Fully-qualified type name, as written into `__type` entries.
    pub type_name: String,
    pub shape: TypedShape,
}

/// The structured shapes a [`Typed`] value can take.
#[derive(Clone, Debug, PartialEq)]
pub enum TypedShape {
    /// Ordered elements, emitted as a positional table.
    Sequence(Vec<LuaValue>),
    /// Key/value pairs, emitted as `[key]=value` entries.
    Mapping(Vec<(LuaValue, LuaValue)>),
    /// Named fields in declaration order, emitted as `name=value` entries.
    Record(Vec<Field>),
}

/// One field of a record.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub name: String,
    /// Declared type of the field, shown by markup output.
    pub type_name: String,
    /// Read-only fields are skipped when markup output is enabled.
    pub writable: bool,
    pub value: LuaValue,
}

impl Field {
    #[must_use]
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, value: LuaValue) -> Self {
        Field {
            name: name.into(),
            type_name: type_name.into(),
            writable: true,
            value,
        }
    }

    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }
}

impl Typed {
    #[must_use]
    pub fn sequence(type_name: impl Into<String>, elements: Vec<LuaValue>) -> Self {
        Typed {
            type_name: type_name.into(),
            shape: TypedShape::Sequence(elements),
        }
    }

    #[must_use]
    pub fn mapping(type_name: impl Into<String>, entries: Vec<(LuaValue, LuaValue)>) -> Self {
        Typed {
            type_name: type_name.into(),
            shape: TypedShape::Mapping(entries),
        }
    }

    #[must_use]
    pub fn record(type_name: impl Into<String>, fields: Vec<Field>) -> Self {
        Typed {
            type_name: type_name.into(),
            shape: TypedShape::Record(fields),
        }
    }

    /// Looks up a record field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&LuaValue> {
        match &self.shape {
            TypedShape::Record(fields) => fields.iter().find(|f| f.name == name).map(|f| &f.value),
            _ => None,
        }
    }

    /// Number of elements, entries or fields.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.shape {
            TypedShape::Sequence(elements) => elements.len(),
            TypedShape::Mapping(entries) => entries.len(),
            TypedShape::Record(fields) => fields.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flattens the value into a generic table, dropping the type name.
    ///
    /// Mapping keys that cannot be table keys (nil, booleans, fractional floats, tables)
    /// produce a type mismatch.
    pub fn into_table(self) -> crate::Result<LuaTable> {
        match self.shape {
            TypedShape::Sequence(elements) => Ok(elements.into_iter().collect()),
            TypedShape::Mapping(entries) => entries
                .into_iter()
                .map(|(k, v)| Ok((TableKey::try_from(k)?, v)))
                .collect(),
            TypedShape::Record(fields) => Ok(fields
                .into_iter()
                .map(|f| (TableKey::String(f.name), f.value))
                .collect()),
        }
    }
}

impl LuaValue {
    /// Returns `true` if the value is nil.
    #[inline]
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, LuaValue::Nil)
    }

    #[inline]
    #[must_use]
    pub const fn is_bool(&self) -> bool {
        matches!(self, LuaValue::Bool(_))
    }

    /// Returns `true` for integers and floats.
    #[inline]
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, LuaValue::Integer(_) | LuaValue::Float(_))
    }

    /// Returns `true` for strings and chars.
    #[inline]
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self, LuaValue::String(_) | LuaValue::Char(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_table(&self) -> bool {
        matches!(self, LuaValue::Table(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_typed(&self) -> bool {
        matches!(self, LuaValue::Typed(_))
    }

    /// Returns `true` for values that are neither tables nor typed values.
    #[inline]
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        !matches!(self, LuaValue::Table(_) | LuaValue::Typed(_))
    }

    /// If the value is a boolean, returns it. Otherwise returns `None`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_lua_table::LuaValue;
    ///
    /// assert_eq!(LuaValue::Bool(true).as_bool(), Some(true));
    /// assert_eq!(LuaValue::from(42).as_bool(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            LuaValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// If the value is a string, returns a reference to it. Otherwise returns `None`.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            LuaValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// If the value is an integer or a whole-number float, returns it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_lua_table::LuaValue;
    ///
    /// assert_eq!(LuaValue::Integer(42).as_i64(), Some(42));
    /// assert_eq!(LuaValue::Float(42.0).as_i64(), Some(42));
    /// assert_eq!(LuaValue::Float(42.5).as_i64(), None);
    /// ```
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            LuaValue::Integer(i) => Some(*i),
            LuaValue::Float(f) => float_to_i64(*f),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            LuaValue::Integer(i) => Some(*i as f64),
            LuaValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_table(&self) -> Option<&LuaTable> {
        match self {
            LuaValue::Table(table) => Some(table),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_typed(&self) -> Option<&Typed> {
        match self {
            LuaValue::Typed(typed) => Some(typed),
            _ => None,
        }
    }

    /// Looks up an entry of a table, a record field or a sequence element.
    ///
    /// Sequence elements use the same 1-based positions as table entries.
    #[must_use]
    pub fn get<K: Into<TableKey>>(&self, key: K) -> Option<&LuaValue> {
        let key = key.into();
        match self {
            LuaValue::Table(table) => table.get(key),
            LuaValue::Typed(typed) => match (&typed.shape, key) {
                (TypedShape::Record(_), TableKey::String(name)) => typed.field(&name),
                (TypedShape::Sequence(elements), TableKey::Integer(i)) => {
                    i.checked_sub(1)
                        .and_then(|i| usize::try_from(i).ok())
                        .and_then(|i| elements.get(i))
                }
                (TypedShape::Mapping(entries), key) => {
                    let key = LuaValue::from(key);
                    entries.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
                }
                _ => None,
            },
            _ => None,
        }
    }

    /// Short name of the value's kind, used in type mismatch messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            LuaValue::Nil => "nil",
            LuaValue::Bool(_) => "boolean",
            LuaValue::Integer(_) => "integer",
            LuaValue::Float(_) => "float",
            LuaValue::Char(_) => "char",
            LuaValue::String(_) => "string",
            LuaValue::Table(_) => "table",
            LuaValue::Typed(typed) => match typed.shape {
                TypedShape::Sequence(_) => "sequence",
                TypedShape::Mapping(_) => "mapping",
                TypedShape::Record(_) => "record",
            },
        }
    }

    /// Renders the value as literal text using `options`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_lua_table::{lua, LuaOptions};
    ///
    /// let value = lua!(["a", "b"]);
    /// assert_eq!(value.to_lua_string(&LuaOptions::new()).unwrap(), r#"{"a", "b", }"#);
    /// ```
    pub fn to_lua_string(&self, options: &LuaOptions) -> crate::Result<String> {
        crate::ser::emit(self, options)
    }
}

pub(crate) fn float_to_i64(f: f64) -> Option<i64> {
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

impl fmt::Display for LuaValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self
            .to_lua_string(&LuaOptions::default())
            .map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl Serialize for LuaValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::{SerializeMap, SerializeSeq};

        match self {
            LuaValue::Nil => serializer.serialize_unit(),
            LuaValue::Bool(b) => serializer.serialize_bool(*b),
            LuaValue::Integer(i) => serializer.serialize_i64(*i),
            LuaValue::Float(f) => serializer.serialize_f64(*f),
            LuaValue::Char(c) => serializer.serialize_char(*c),
            LuaValue::String(s) => serializer.serialize_str(s),
            LuaValue::Table(table) if table.is_sequence() => {
                let mut seq = serializer.serialize_seq(Some(table.len()))?;
                for value in table.values() {
                    seq.serialize_element(value)?;
                }
                seq.end()
            }
            LuaValue::Table(table) => {
                let mut map = serializer.serialize_map(Some(table.len()))?;
                for (key, value) in table {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            LuaValue::Typed(typed) => match &typed.shape {
                TypedShape::Sequence(elements) => {
                    let mut seq = serializer.serialize_seq(Some(elements.len()))?;
                    for element in elements {
                        seq.serialize_element(element)?;
                    }
                    seq.end()
                }
                TypedShape::Mapping(entries) => {
                    let mut map = serializer.serialize_map(Some(entries.len()))?;
                    for (key, value) in entries {
                        map.serialize_entry(key, value)?;
                    }
                    map.end()
                }
                TypedShape::Record(fields) => {
                    let mut map = serializer.serialize_map(Some(fields.len()))?;
                    for field in fields {
                        map.serialize_entry(&field.name, &field.value)?;
                    }
                    map.end()
                }
            },
        }
    }
}

impl Serialize for TableKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            TableKey::Integer(i) => serializer.serialize_i64(*i),
            TableKey::String(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for LuaValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct LuaValueVisitor;

        impl<'de> Visitor<'de> for LuaValueVisitor {
            type Value = LuaValue;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("any Lua literal value")
            }

            fn visit_bool<E>(self, value: bool) -> Result<Self::Value, E> {
                Ok(LuaValue::Bool(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E> {
                Ok(LuaValue::Integer(value))
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E> {
                Ok(LuaValue::from(value))
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E> {
                Ok(LuaValue::Float(value))
            }

            fn visit_char<E>(self, value: char) -> Result<Self::Value, E> {
                Ok(LuaValue::Char(value))
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E> {
                Ok(LuaValue::String(value.to_string()))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E> {
                Ok(LuaValue::String(value))
            }

            fn visit_unit<E>(self) -> Result<Self::Value, E> {
                Ok(LuaValue::Nil)
            }

            fn visit_none<E>(self) -> Result<Self::Value, E> {
                Ok(LuaValue::Nil)
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
            where
                D: Deserializer<'de>,
            {
                Deserialize::deserialize(deserializer)
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut table = LuaTable::new();
                while let Some(element) = seq.next_element()? {
                    table.push(element);
                }
                Ok(LuaValue::Table(table))
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: de::MapAccess<'de>,
            {
                let mut table = LuaTable::new();
                while let Some((key, value)) = map.next_entry::<LuaValue, LuaValue>()? {
                    let key = TableKey::try_from(key).map_err(de::Error::custom)?;
                    table.insert(key, value);
                }
                Ok(LuaValue::Table(table))
            }
        }

        deserializer.deserialize_any(LuaValueVisitor)
    }
}

fn mismatch(expected: &str, value: &LuaValue) -> Error {
    Error::type_mismatch(None, expected, value.kind_name())
}

impl TryFrom<LuaValue> for i64 {
    type Error = Error;

    fn try_from(value: LuaValue) -> crate::Result<Self> {
        value.as_i64().ok_or_else(|| mismatch("integer", &value))
    }
}

impl TryFrom<LuaValue> for f64 {
    type Error = Error;

    fn try_from(value: LuaValue) -> crate::Result<Self> {
        value.as_f64().ok_or_else(|| mismatch("number", &value))
    }
}

impl TryFrom<LuaValue> for bool {
    type Error = Error;

    fn try_from(value: LuaValue) -> crate::Result<Self> {
        value.as_bool().ok_or_else(|| mismatch("boolean", &value))
    }
}

impl TryFrom<LuaValue> for char {
    type Error = Error;

    fn try_from(value: LuaValue) -> crate::Result<Self> {
        match value {
            LuaValue::Char(c) => Ok(c),
            LuaValue::String(ref s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(mismatch("single-character string", &value)),
                }
            }
            _ => Err(mismatch("char", &value)),
        }
    }
}

impl TryFrom<LuaValue> for String {
    type Error = Error;

    fn try_from(value: LuaValue) -> crate::Result<Self> {
        match value {
            LuaValue::String(s) => Ok(s),
            LuaValue::Char(c) => Ok(c.to_string()),
            _ => Err(mismatch("string", &value)),
        }
    }
}

impl TryFrom<LuaValue> for LuaTable {
    type Error = Error;

    fn try_from(value: LuaValue) -> crate::Result<Self> {
        match value {
            LuaValue::Table(table) => Ok(table),
            LuaValue::Typed(typed) => typed.into_table(),
            _ => Err(mismatch("table", &value)),
        }
    }
}

/// Timestamps travel as RFC 3339 strings.
impl TryFrom<LuaValue> for DateTime<Utc> {
    type Error = Error;

    fn try_from(value: LuaValue) -> crate::Result<Self> {
        match value {
            LuaValue::String(ref s) => DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| mismatch("RFC 3339 timestamp", &value)),
            _ => Err(mismatch("RFC 3339 timestamp", &value)),
        }
    }
}

impl From<bool> for LuaValue {
    fn from(value: bool) -> Self {
        LuaValue::Bool(value)
    }
}

macro_rules! from_integer {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for LuaValue {
                fn from(value: $ty) -> Self {
                    LuaValue::Integer(i64::from(value))
                }
            }
        )*
    };
}

from_integer!(i8, i16, i32, i64, u8, u16, u32);

/// Values above `i64::MAX` become floats.
impl From<u64> for LuaValue {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(i) => LuaValue::Integer(i),
            Err(_) => LuaValue::Float(value as f64),
        }
    }
}

impl From<f32> for LuaValue {
    fn from(value: f32) -> Self {
        LuaValue::Float(f64::from(value))
    }
}

impl From<f64> for LuaValue {
    fn from(value: f64) -> Self {
        LuaValue::Float(value)
    }
}

impl From<char> for LuaValue {
    fn from(value: char) -> Self {
        LuaValue::Char(value)
    }
}

impl From<String> for LuaValue {
    fn from(value: String) -> Self {
        LuaValue::String(value)
    }
}

impl From<&str> for LuaValue {
    fn from(value: &str) -> Self {
        LuaValue::String(value.to_string())
    }
}

impl From<LuaTable> for LuaValue {
    fn from(value: LuaTable) -> Self {
        LuaValue::Table(value)
    }
}

impl From<Vec<LuaValue>> for LuaValue {
    fn from(value: Vec<LuaValue>) -> Self {
        LuaValue::Table(value.into_iter().collect())
    }
}

impl From<Typed> for LuaValue {
    fn from(value: Typed) -> Self {
        LuaValue::Typed(Box::new(value))
    }
}

impl From<DateTime<Utc>> for LuaValue {
    fn from(value: DateTime<Utc>) -> Self {
        LuaValue::String(value.to_rfc3339())
    }
}

impl<T: Into<LuaValue>> From<Option<T>> for LuaValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(LuaValue::Nil, Into::into)
    }
}
