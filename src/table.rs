//! Ordered table type for decoded `{...}` constructors.
//!
//! [`LuaTable`] wraps an [`IndexMap`] keyed by [`TableKey`], so entries iterate in the
//! order they were first encountered. Re-inserting an existing key replaces the value
//! in place, which is how duplicate keys inside one constructor behave.
//!
//! ## Examples
//!
//! ```rust
//! use serde_lua_table::{LuaTable, LuaValue, TableKey};
//!
//! let mut table = LuaTable::new();
//! table.push(LuaValue::from("first"));
//! table.insert("name", LuaValue::from("Alice"));
//! table.push(LuaValue::from("second"));
//!
//! assert_eq!(table.len(), 3);
//! assert_eq!(table.get(2).and_then(|v| v.as_str()), Some("second"));
//! assert_eq!(table.get("name").and_then(|v| v.as_str()), Some("Alice"));
//! assert_eq!(table.keys().next(), Some(&TableKey::Integer(1)));
//! ```

use crate::LuaValue;
use indexmap::IndexMap;
use std::fmt;

/// The reserved key naming a table's target type.
pub const TYPE_KEY: &str = "__type";

/// A table key: an integer (positional or bracketed) or a string (bare or bracketed).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TableKey {
    Integer(i64),
    String(String),
}

impl TableKey {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TableKey::String(s) => Some(s),
            TableKey::Integer(_) => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            TableKey::Integer(i) => Some(*i),
            TableKey::String(_) => None,
        }
    }
}

impl fmt::Display for TableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableKey::Integer(i) => write!(f, "{}", i),
            TableKey::String(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for TableKey {
    fn from(value: i64) -> Self {
        TableKey::Integer(value)
    }
}

impl From<i32> for TableKey {
    fn from(value: i32) -> Self {
        TableKey::Integer(i64::from(value))
    }
}

impl From<usize> for TableKey {
    fn from(value: usize) -> Self {
        TableKey::Integer(value as i64)
    }
}

impl From<&str> for TableKey {
    fn from(value: &str) -> Self {
        TableKey::String(value.to_string())
    }
}

impl From<String> for TableKey {
    fn from(value: String) -> Self {
        TableKey::String(value)
    }
}

impl From<TableKey> for LuaValue {
    fn from(key: TableKey) -> Self {
        match key {
            TableKey::Integer(i) => LuaValue::Integer(i),
            TableKey::String(s) => LuaValue::String(s),
        }
    }
}

/// Integers, strings, chars and whole-number floats can key a table.
impl TryFrom<LuaValue> for TableKey {
    type Error = crate::Error;

    fn try_from(value: LuaValue) -> crate::Result<Self> {
        match value {
            LuaValue::Integer(i) => Ok(TableKey::Integer(i)),
            LuaValue::String(s) => Ok(TableKey::String(s)),
            LuaValue::Char(c) => Ok(TableKey::String(c.to_string())),
            LuaValue::Float(f) => crate::value::float_to_i64(f)
                .map(TableKey::Integer)
                .ok_or_else(|| crate::Error::type_mismatch(None, "table key", "fractional float")),
            other => Err(crate::Error::type_mismatch(
                None,
                "table key",
                other.kind_name(),
            )),
        }
    }
}

/// An ordered collection of table entries.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LuaTable(IndexMap<TableKey, LuaValue>);

impl LuaTable {
    /// Creates an empty `LuaTable`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_lua_table::LuaTable;
    ///
    /// let table = LuaTable::new();
    /// assert!(table.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        LuaTable(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        LuaTable(IndexMap::with_capacity(capacity))
    }

    /// Inserts an entry, returning the value previously stored under `key`.
    ///
    /// A replaced key keeps its original position.
    pub fn insert<K: Into<TableKey>>(&mut self, key: K, value: LuaValue) -> Option<LuaValue> {
        self.0.insert(key.into(), value)
    }

    /// Appends `value` at the first free positional index after the sequence part.
    pub fn push(&mut self, value: LuaValue) {
        let next = self.sequence_len() as i64 + 1;
        self.0.insert(TableKey::Integer(next), value);
    }

    #[must_use]
    pub fn get<K: Into<TableKey>>(&self, key: K) -> Option<&LuaValue> {
        self.0.get(&key.into())
    }

    #[must_use]
    pub fn contains_key<K: Into<TableKey>>(&self, key: K) -> bool {
        self.0.contains_key(&key.into())
    }

    /// Removes an entry, preserving the order of the remaining ones.
    pub fn remove<K: Into<TableKey>>(&mut self, key: K) -> Option<LuaValue> {
        self.0.shift_remove(&key.into())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of consecutive integer keys `1..=n` present in the table.
    #[must_use]
    pub fn sequence_len(&self) -> usize {
        let mut n = 0usize;
        while self.0.contains_key(&TableKey::Integer(n as i64 + 1)) {
            n += 1;
        }
        n
    }

    /// Returns `true` when the entries are exactly `1..=len` in encounter order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_lua_table::parse_value;
    ///
    /// let list = parse_value("{ 'a', 'b' }").unwrap();
    /// assert!(list.as_table().unwrap().is_sequence());
    ///
    /// let mixed = parse_value("{ 'a', x = 1 }").unwrap();
    /// assert!(!mixed.as_table().unwrap().is_sequence());
    /// ```
    #[must_use]
    pub fn is_sequence(&self) -> bool {
        self.0
            .keys()
            .enumerate()
            .all(|(i, key)| *key == TableKey::Integer(i as i64 + 1))
    }

    /// Returns the string stored under `__type`, if any.
    #[must_use]
    pub fn type_tag(&self) -> Option<&str> {
        self.0
            .get(&TableKey::String(TYPE_KEY.to_string()))
            .and_then(LuaValue::as_str)
    }

    pub fn keys(&self) -> indexmap::map::Keys<'_, TableKey, LuaValue> {
        self.0.keys()
    }

    pub fn values(&self) -> indexmap::map::Values<'_, TableKey, LuaValue> {
        self.0.values()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, TableKey, LuaValue> {
        self.0.iter()
    }
}

impl IntoIterator for LuaTable {
    type Item = (TableKey, LuaValue);
    type IntoIter = indexmap::map::IntoIter<TableKey, LuaValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a LuaTable {
    type Item = (&'a TableKey, &'a LuaValue);
    type IntoIter = indexmap::map::Iter<'a, TableKey, LuaValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(TableKey, LuaValue)> for LuaTable {
    fn from_iter<T: IntoIterator<Item = (TableKey, LuaValue)>>(iter: T) -> Self {
        LuaTable(IndexMap::from_iter(iter))
    }
}

impl FromIterator<LuaValue> for LuaTable {
    fn from_iter<T: IntoIterator<Item = LuaValue>>(iter: T) -> Self {
        iter.into_iter()
            .enumerate()
            .map(|(i, v)| (TableKey::Integer(i as i64 + 1), v))
            .collect()
    }
}
