//! Typed reconstruction of decoded tables.
//!
//! A table that carries a `__type` entry can be turned into a [`Typed`] value when the
//! tag resolves in a [`TypeRegistry`]. The registry is filled ahead of time: every
//! reconstructible type registers a [`TypeDescriptor`] under its tag, either by hand or
//! through the [`LuaType`] trait. The decoder never looks at Rust type metadata itself.
//!
//! ## Shapes
//!
//! - **Array**: fixed-size, one-dimensional; values are converted in entry order
//! - **Mapping**: every key and value is converted; later duplicates overwrite earlier ones
//! - **Sequence**: values are converted and appended in entry order
//! - **Record**: declared fields are filled from entries with the same name; missing fields
//!   get their zero value and unknown entries are ignored
//!
//! ## Examples
//!
//! ```rust
//! use serde_lua_table::{
//!     FieldDescriptor, FieldType, LuaFormatter, LuaOptions, LuaValue, TypeDescriptor, TypeRegistry,
//! };
//!
//! let mut registry = TypeRegistry::new();
//! registry.register(
//!     "Pkg.TestType",
//!     TypeDescriptor::record(vec![
//!         FieldDescriptor::new("Int1", FieldType::Integer),
//!         FieldDescriptor::new("String1", FieldType::String),
//!     ]),
//! );
//!
//! let formatter = LuaFormatter::new(LuaOptions::new().with_deserialize_type(true), registry);
//! let value = formatter
//!     .decode_str(r#"{ __type="Pkg.TestType", Int1=1, Discard="x", String1="S" }"#)
//!     .unwrap();
//!
//! let record = value.as_typed().unwrap();
//! assert_eq!(record.type_name, "Pkg.TestType");
//! assert_eq!(record.field("Int1"), Some(&LuaValue::Integer(1)));
//! assert_eq!(record.field("Discard"), None);
//! ```

use crate::table::{TableKey, TYPE_KEY};
use crate::value::{float_to_i64, Field, Typed};
use crate::{Error, LuaTable, LuaValue, Result};
use indexmap::map::Entry;
use indexmap::IndexMap;
use log::debug;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Declared type of a record field, array element or mapping key/value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// Accepts any value unchanged.
    Any,
    Bool,
    Integer,
    Float,
    Char,
    String,
    /// Any table or typed value.
    Table,
    /// A registered structured type, referenced by tag.
    Named(String),
}

impl FieldType {
    /// Display name of the type, written by markup output.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            FieldType::Any => "any",
            FieldType::Bool => "boolean",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Char => "char",
            FieldType::String => "string",
            FieldType::Table => "table",
            FieldType::Named(name) => name,
        }
    }

    /// The value a field of this type holds when the table does not supply one.
    #[must_use]
    pub fn zero(&self) -> LuaValue {
        match self {
            FieldType::Bool => LuaValue::Bool(false),
            FieldType::Integer => LuaValue::Integer(0),
            FieldType::Float => LuaValue::Float(0.0),
            FieldType::Char => LuaValue::Char('\0'),
            FieldType::Any | FieldType::String | FieldType::Table | FieldType::Named(_) => {
                LuaValue::Nil
            }
        }
    }

    /// Converts a decoded value to this type.
    ///
    /// `nil` converts to [`FieldType::zero`]. Integers and floats convert into each other
    /// when no precision is lost, numbers and strings convert both ways, and booleans map
    /// to and from `0`/`1`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_lua_table::{FieldType, LuaValue};
    ///
    /// assert_eq!(FieldType::Integer.convert(LuaValue::Float(3.0), None).unwrap(), LuaValue::Integer(3));
    /// assert_eq!(FieldType::Float.convert(LuaValue::from("2.5"), None).unwrap(), LuaValue::Float(2.5));
    /// assert_eq!(FieldType::String.convert(LuaValue::Integer(7), None).unwrap(), LuaValue::from("7"));
    /// assert!(FieldType::Integer.convert(LuaValue::Float(3.5), None).is_err());
    /// ```
    pub fn convert(&self, value: LuaValue, position: Option<usize>) -> Result<LuaValue> {
        if value.is_nil() {
            return Ok(self.zero());
        }
        let converted = match (self, value) {
            (FieldType::Any, v) => Ok(v),
            (FieldType::Bool, LuaValue::Bool(b)) => Ok(LuaValue::Bool(b)),
            (FieldType::Bool, LuaValue::Integer(0)) => Ok(LuaValue::Bool(false)),
            (FieldType::Bool, LuaValue::Integer(1)) => Ok(LuaValue::Bool(true)),
            (FieldType::Integer, LuaValue::Integer(i)) => Ok(LuaValue::Integer(i)),
            (FieldType::Integer, LuaValue::Float(f)) => {
                float_to_i64(f).map(LuaValue::Integer).ok_or(LuaValue::Float(f))
            }
            (FieldType::Integer, LuaValue::Bool(b)) => Ok(LuaValue::Integer(i64::from(b))),
            (FieldType::Integer, LuaValue::String(s)) => match s.trim().parse::<i64>() {
                Ok(i) => Ok(LuaValue::Integer(i)),
                Err(_) => Err(LuaValue::String(s)),
            },
            (FieldType::Float, LuaValue::Float(f)) => Ok(LuaValue::Float(f)),
            (FieldType::Float, LuaValue::Integer(i)) => Ok(LuaValue::Float(i as f64)),
            (FieldType::Float, LuaValue::String(s)) => match s.trim().parse::<f64>() {
                Ok(f) => Ok(LuaValue::Float(f)),
                Err(_) => Err(LuaValue::String(s)),
            },
            (FieldType::Char, LuaValue::Char(c)) => Ok(LuaValue::Char(c)),
            (FieldType::Char, LuaValue::String(s)) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(LuaValue::Char(c)),
                    _ => Err(LuaValue::String(s)),
                }
            }
            (FieldType::String, LuaValue::String(s)) => Ok(LuaValue::String(s)),
            (FieldType::String, LuaValue::Char(c)) => Ok(LuaValue::String(c.to_string())),
            (FieldType::String, LuaValue::Integer(i)) => Ok(LuaValue::String(i.to_string())),
            (FieldType::String, LuaValue::Float(f)) => Ok(LuaValue::String(f.to_string())),
            (FieldType::String, LuaValue::Bool(b)) => Ok(LuaValue::String(b.to_string())),
            (FieldType::Table | FieldType::Named(_), v) if !v.is_scalar() => Ok(v),
            (_, v) => Err(v),
        };
        converted.map_err(|v| Error::type_mismatch(position, self.name(), v.kind_name()))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One declared field of a record type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub ty: FieldType,
    /// Only writable fields are filled during reconstruction.
    pub writable: bool,
}

impl FieldDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        FieldDescriptor {
            name: name.into(),
            ty,
            writable: true,
        }
    }

    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }
}

/// How to rebuild one registered type from a table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeDescriptor {
    /// A fixed-size indexable container. `len` is the required entry count when the
    /// size is part of the type.
    Array {
        element: FieldType,
        rank: usize,
        len: Option<usize>,
    },
    Mapping {
        key: FieldType,
        value: FieldType,
    },
    Sequence {
        element: FieldType,
    },
    Record {
        fields: Vec<FieldDescriptor>,
    },
}

impl TypeDescriptor {
    /// A one-dimensional array sized by the decoded table.
    #[must_use]
    pub fn array(element: FieldType) -> Self {
        TypeDescriptor::Array {
            element,
            rank: 1,
            len: None,
        }
    }

    #[must_use]
    pub fn mapping(key: FieldType, value: FieldType) -> Self {
        TypeDescriptor::Mapping { key, value }
    }

    #[must_use]
    pub fn sequence(element: FieldType) -> Self {
        TypeDescriptor::Sequence { element }
    }

    #[must_use]
    pub fn record(fields: Vec<FieldDescriptor>) -> Self {
        TypeDescriptor::Record { fields }
    }
}

/// Types that can be rebuilt from a tagged table.
///
/// # Examples
///
/// ```rust
/// use serde_lua_table::{FieldDescriptor, FieldType, LuaType, TypeDescriptor, TypeRegistry};
///
/// struct Point;
///
/// impl LuaType for Point {
///     fn type_tag() -> String {
///         "geo.Point".to_string()
///     }
///
///     fn descriptor() -> TypeDescriptor {
///         TypeDescriptor::record(vec![
///             FieldDescriptor::new("x", FieldType::Float),
///             FieldDescriptor::new("y", FieldType::Float),
///         ])
///     }
/// }
///
/// let mut registry = TypeRegistry::new();
/// registry.register_type::<Point>();
/// assert!(registry.resolve("geo.Point").is_some());
/// ```
pub trait LuaType {
    /// Tag written into and read from `__type` entries. Defaults to the Rust type name,
    /// which is also what the serializer emits.
    fn type_tag() -> String {
        std::any::type_name::<Self>().to_string()
    }

    fn descriptor() -> TypeDescriptor;
}

/// Types usable as array elements, mapping keys/values or record fields.
pub trait LuaField {
    fn field_type() -> FieldType;
}

macro_rules! lua_field {
    ($variant:ident: $($ty:ty),*) => {
        $(
            impl LuaField for $ty {
                fn field_type() -> FieldType {
                    FieldType::$variant
                }
            }
        )*
    };
}

lua_field!(Integer: i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);
lua_field!(Float: f32, f64);
lua_field!(Bool: bool);
lua_field!(Char: char);
lua_field!(String: String, chrono::DateTime<chrono::Utc>);
lua_field!(Table: LuaTable);
lua_field!(Any: LuaValue);

impl<T: LuaField> LuaField for Option<T> {
    fn field_type() -> FieldType {
        T::field_type()
    }
}

impl<T> LuaField for Vec<T> {
    fn field_type() -> FieldType {
        FieldType::Table
    }
}

impl<T, const N: usize> LuaField for [T; N] {
    fn field_type() -> FieldType {
        FieldType::Table
    }
}

impl<K, V, S> LuaField for HashMap<K, V, S> {
    fn field_type() -> FieldType {
        FieldType::Table
    }
}

impl<K, V> LuaField for BTreeMap<K, V> {
    fn field_type() -> FieldType {
        FieldType::Table
    }
}

impl<K, V, S> LuaField for IndexMap<K, V, S> {
    fn field_type() -> FieldType {
        FieldType::Table
    }
}

impl<T: LuaField> LuaType for Vec<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::sequence(T::field_type())
    }
}

impl<T: LuaField, const N: usize> LuaType for [T; N] {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Array {
            element: T::field_type(),
            rank: 1,
            len: Some(N),
        }
    }
}

impl<T: LuaField> LuaType for Box<[T]> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::array(T::field_type())
    }
}

impl<K: LuaField, V: LuaField, S> LuaType for HashMap<K, V, S> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::mapping(K::field_type(), V::field_type())
    }
}

impl<K: LuaField, V: LuaField> LuaType for BTreeMap<K, V> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::mapping(K::field_type(), V::field_type())
    }
}

impl<K: LuaField, V: LuaField, S> LuaType for IndexMap<K, V, S> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::mapping(K::field_type(), V::field_type())
    }
}

/// Type tags mapped to their descriptors.
#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    types: IndexMap<String, TypeDescriptor>,
}

impl TypeRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `descriptor` under `tag`, replacing any earlier registration.
    pub fn register(&mut self, tag: impl Into<String>, descriptor: TypeDescriptor) -> &mut Self {
        self.types.insert(tag.into(), descriptor);
        self
    }

    /// Registers `T` under [`LuaType::type_tag`].
    pub fn register_type<T: LuaType + ?Sized>(&mut self) -> &mut Self {
        self.register(T::type_tag(), T::descriptor())
    }

    /// Builder form of [`TypeRegistry::register_type`].
    #[must_use]
    pub fn with_type<T: LuaType + ?Sized>(mut self) -> Self {
        self.register_type::<T>();
        self
    }

    #[must_use]
    pub fn resolve(&self, tag: &str) -> Option<&TypeDescriptor> {
        self.types.get(tag)
    }

    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Outcome of [`reconstruct`].
#[derive(Clone, Debug, PartialEq)]
pub enum Reconstructed {
    Value(LuaValue),
    /// No string tag, or the tag is not registered. The table is handed back untouched.
    Unmatched(LuaTable),
}

/// Rebuilds a tagged table through `registry`.
///
/// `position` is the offset of the table's opening brace and is attached to errors.
pub fn reconstruct(
    mut table: LuaTable,
    registry: &TypeRegistry,
    position: usize,
) -> Result<Reconstructed> {
    let descriptor = match table.type_tag() {
        Some(tag) => match registry.resolve(tag) {
            Some(descriptor) => descriptor,
            None => {
                debug!("no descriptor registered for type tag {:?}", tag);
                return Ok(Reconstructed::Unmatched(table));
            }
        },
        None => return Ok(Reconstructed::Unmatched(table)),
    };
    let tag = match table.remove(TYPE_KEY) {
        Some(LuaValue::String(tag)) => tag,
        _ => return Ok(Reconstructed::Unmatched(table)),
    };
    build(table, &tag, descriptor, position)
        .map(LuaValue::from)
        .map(Reconstructed::Value)
}

/// Rebuilds an untagged table as `tag` using an already resolved descriptor.
pub fn build(
    table: LuaTable,
    tag: &str,
    descriptor: &TypeDescriptor,
    position: usize,
) -> Result<Typed> {
    let at = Some(position);
    match descriptor {
        TypeDescriptor::Array { rank, .. } if *rank > 1 => {
            Err(Error::unsupported(position, "multi-dimensional array"))
        }
        TypeDescriptor::Array { element, len, .. } => {
            if let Some(len) = len {
                if *len != table.len() {
                    return Err(Error::type_mismatch(
                        at,
                        &format!("array of {} elements", len),
                        &format!("{} entries", table.len()),
                    ));
                }
            }
            let elements = table
                .into_iter()
                .map(|(_, v)| element.convert(v, at))
                .collect::<Result<Vec<_>>>()?;
            Ok(Typed::sequence(tag, elements))
        }
        TypeDescriptor::Sequence { element } => {
            let elements = table
                .into_iter()
                .map(|(_, v)| element.convert(v, at))
                .collect::<Result<Vec<_>>>()?;
            Ok(Typed::sequence(tag, elements))
        }
        TypeDescriptor::Mapping { key, value } => {
            let mut entries: Vec<(LuaValue, LuaValue)> = Vec::with_capacity(table.len());
            let mut slots: IndexMap<TableKey, usize> = IndexMap::with_capacity(table.len());
            for (k, v) in table {
                let k = key.convert(LuaValue::from(k), at)?;
                let v = value.convert(v, at)?;
                let existing = match TableKey::try_from(k.clone()) {
                    Ok(table_key) => match slots.entry(table_key) {
                        Entry::Occupied(slot) => Some(*slot.get()),
                        Entry::Vacant(slot) => {
                            slot.insert(entries.len());
                            None
                        }
                    },
                    // Booleans and fractional floats never key a table.
                    Err(_) => entries.iter().position(|(other, _)| *other == k),
                };
                match existing {
                    Some(i) => entries[i].1 = v,
                    None => entries.push((k, v)),
                }
            }
            Ok(Typed::mapping(tag, entries))
        }
        TypeDescriptor::Record { fields } => {
            let mut out = Vec::with_capacity(fields.len());
            for field in fields {
                let supplied = if field.writable {
                    table.get(TableKey::String(field.name.clone())).cloned()
                } else {
                    None
                };
                let value = match supplied {
                    Some(v) => field.ty.convert(v, at)?,
                    None => field.ty.zero(),
                };
                out.push(Field {
                    name: field.name.clone(),
                    type_name: field.ty.name().to_string(),
                    writable: field.writable,
                    value,
                });
            }
            Ok(Typed::record(tag, out))
        }
    }
}
