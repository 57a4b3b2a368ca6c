//! Lua literal serialization.
//!
//! Serialization runs in two steps. [`ValueSerializer`] maps any `T: Serialize` onto the
//! closed [`LuaValue`] model, recording the Rust type name of every struct, sequence and
//! map it meets. [`Emitter`] then writes a [`LuaValue`] as literal text, honoring
//! [`LuaOptions`].
//!
//! ## Overview
//!
//! - **Scalars**: `nil`, `true`/`false`, integers, floats (always with `.` or an exponent)
//!   and double-quoted strings with escapes
//! - **Sequences**: positional entries, `{1, 2, 3, }`
//! - **Mappings**: bracketed keys, `{["a"]=1, [2]="b", }`
//! - **Records**: field names as bare keys, `{x=1, y=2, }`; names that are reserved words
//!   or not identifiers are bracketed
//! - **Type markers**: with `serialize_type`, every table opens with `__type="<type name>"`
//! - **Markup**: with `markup_output`, each record field is preceded by a `-- <type>` line
//!   and read-only fields are left out
//!
//! ## Usage
//!
//! ```rust
//! use serde_lua_table::{to_string, to_string_pretty};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Data { x: i32, y: i32 }
//!
//! let data = Data { x: 1, y: 2 };
//! assert_eq!(to_string(&data).unwrap(), "{x=1, y=2, }");
//! assert_eq!(to_string_pretty(&data).unwrap(), "{\n\tx=1,\n\ty=2,\n}");
//! ```
//!
//! ## Direct Emitter Usage
//!
//! ```rust
//! use serde_lua_table::{lua, Emitter, LuaOptions};
//!
//! let options = LuaOptions::new().with_serialize_type(true);
//! let mut emitter = Emitter::new(&options);
//! emitter.emit(&lua!(["a"])).unwrap();
//! assert_eq!(
//!     emitter.into_inner(),
//!     r#"{__type="serde_lua_table::table::LuaTable", "a", }"#
//! );
//! ```

use crate::escape::write_quoted;
use crate::table::{TableKey, TYPE_KEY};
use crate::value::{Field, Typed, TypedShape};
use crate::{Error, LuaOptions, LuaTable, LuaValue, Result};
use log::trace;
use serde::{ser, Serialize};
use std::any::type_name;
use std::fmt::Write as _;

/// Words that cannot appear as bare keys in a table constructor.
pub const RESERVED_WORDS: &[&str] = &[
    "and", "break", "do", "else", "elseif", "end", "false", "for", "function", "goto", "if", "in",
    "local", "nil", "not", "or", "repeat", "return", "then", "true", "until", "while",
];

/// Returns `true` when `name` can be written as a bare `name=` key.
#[must_use]
pub fn is_bare_key(name: &str) -> bool {
    let mut bytes = name.bytes();
    matches!(bytes.next(), Some(b) if b.is_ascii_alphabetic() || b == b'_')
        && bytes.all(|b| b.is_ascii_alphanumeric() || b == b'_')
        && !RESERVED_WORDS.contains(&name)
}

/// Writes [`LuaValue`]s as literal text.
pub struct Emitter<'o> {
    output: String,
    options: &'o LuaOptions,
    indent_level: usize,
    depth: usize,
}

impl<'o> Emitter<'o> {
    pub fn new(options: &'o LuaOptions) -> Self {
        Emitter {
            output: String::with_capacity(256),
            options,
            indent_level: 0,
            depth: 0,
        }
    }

    pub fn into_inner(self) -> String {
        self.output
    }

    /// Appends the literal form of `value`.
    pub fn emit(&mut self, value: &LuaValue) -> Result<()> {
        match value {
            LuaValue::Nil => self.output.push_str("nil"),
            LuaValue::Bool(b) => self.output.push_str(if *b { "true" } else { "false" }),
            LuaValue::Integer(i) => {
                let _ = write!(self.output, "{}", i);
            }
            LuaValue::Float(f) => self.write_float(*f),
            LuaValue::Char(c) => {
                let mut buf = [0u8; 4];
                write_quoted(&mut self.output, c.encode_utf8(&mut buf));
            }
            LuaValue::String(s) => write_quoted(&mut self.output, s),
            LuaValue::Table(table) => self.emit_table(table)?,
            LuaValue::Typed(typed) => self.emit_typed(typed)?,
        }
        Ok(())
    }

    fn write_float(&mut self, f: f64) {
        if f.is_nan() {
            self.output.push_str("0/0");
        } else if f.is_infinite() {
            self.output
                .push_str(if f > 0.0 { "1e999" } else { "-1e999" });
        } else {
            let _ = write!(self.output, "{:?}", f);
        }
    }

    #[inline]
    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.output.push('\t');
        }
    }

    fn begin_entry(&mut self) {
        if self.options.is_multiline() {
            self.write_indent();
        }
    }

    fn end_entry(&mut self) {
        if self.options.is_multiline() {
            self.output.push_str(",\n");
        } else {
            self.output.push_str(", ");
        }
    }

    /// Writes `{`, the optional type marker, and enters one nesting level.
    fn open_table(&mut self, type_name: Option<&str>) -> Result<()> {
        self.depth += 1;
        if let Some(limit) = self.options.max_depth {
            if self.depth > limit {
                return Err(Error::depth_limit(self.output.len(), limit));
            }
        }
        self.output.push('{');
        if self.options.is_multiline() {
            self.output.push('\n');
            self.indent_level += 1;
        }
        if let (true, Some(name)) = (self.options.serialize_type, type_name) {
            self.begin_entry();
            self.output.push_str(TYPE_KEY);
            self.output.push('=');
            write_quoted(&mut self.output, name);
            self.output.push_str(", ");
            if self.options.is_multiline() {
                self.output.push('\n');
            }
        }
        Ok(())
    }

    fn close_table(&mut self) {
        if self.options.is_multiline() {
            self.indent_level -= 1;
            self.write_indent();
        }
        self.output.push('}');
        self.depth -= 1;
    }

    fn emit_keyed(&mut self, key: &LuaValue, value: &LuaValue) -> Result<()> {
        self.begin_entry();
        self.output.push('[');
        self.emit(key)?;
        self.output.push_str("]=");
        self.emit(value)?;
        self.end_entry();
        Ok(())
    }

    fn emit_positional(&mut self, value: &LuaValue) -> Result<()> {
        self.begin_entry();
        self.emit(value)?;
        self.end_entry();
        Ok(())
    }

    fn emit_table(&mut self, table: &LuaTable) -> Result<()> {
        let marker = if table.contains_key(TYPE_KEY) {
            None
        } else {
            Some(type_name::<LuaTable>())
        };
        self.open_table(marker)?;
        if table.is_sequence() {
            for value in table.values() {
                self.emit_positional(value)?;
            }
        } else {
            for (key, value) in table {
                self.emit_keyed(&LuaValue::from(key.clone()), value)?;
            }
        }
        self.close_table();
        Ok(())
    }

    fn emit_typed(&mut self, typed: &Typed) -> Result<()> {
        trace!("emitting {} ({} entries)", typed.type_name, typed.len());
        self.open_table(Some(&typed.type_name))?;
        match &typed.shape {
            TypedShape::Sequence(elements) => {
                for element in elements {
                    self.emit_positional(element)?;
                }
            }
            TypedShape::Mapping(entries) => {
                for (key, value) in entries {
                    self.emit_keyed(key, value)?;
                }
            }
            TypedShape::Record(fields) => {
                for field in fields {
                    self.emit_field(field)?;
                }
            }
        }
        self.close_table();
        Ok(())
    }

    fn emit_field(&mut self, field: &Field) -> Result<()> {
        if self.options.markup_output {
            if !field.writable {
                return Ok(());
            }
            self.write_indent();
            self.output.push_str("-- ");
            self.output.push_str(&field.type_name);
            self.output.push('\n');
        }
        self.begin_entry();
        if is_bare_key(&field.name) {
            self.output.push_str(&field.name);
        } else {
            self.output.push('[');
            write_quoted(&mut self.output, &field.name);
            self.output.push(']');
        }
        self.output.push('=');
        self.emit(&field.value)?;
        self.end_entry();
        Ok(())
    }
}

/// Renders `value` with `options`.
pub(crate) fn emit(value: &LuaValue, options: &LuaOptions) -> Result<String> {
    let mut emitter = Emitter::new(options);
    emitter.emit(value)?;
    Ok(emitter.into_inner())
}

/// Converts `value` to a [`LuaValue`], naming it after `T`.
pub(crate) fn to_lua_value<T>(value: &T) -> Result<LuaValue>
where
    T: ?Sized + Serialize,
{
    value.serialize(ValueSerializer::named(type_name::<T>()))
}

/// Serializer producing [`LuaValue`]s.
///
/// Structs become [`Typed`] records; sequences and maps become [`Typed`] values when the
/// serializer knows the Rust type being serialized, and plain tables otherwise.
#[derive(Clone, Copy, Debug, Default)]
pub struct ValueSerializer {
    type_name: Option<&'static str>,
}

impl ValueSerializer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A serializer that tags structured output with `type_name`.
    ///
    /// Dynamic values keep their untyped shape.
    #[must_use]
    pub fn named(type_name: &'static str) -> Self {
        let dynamic = [
            std::any::type_name::<LuaValue>(),
            std::any::type_name::<LuaTable>(),
        ];
        ValueSerializer {
            type_name: (!dynamic.contains(&type_name)).then_some(type_name),
        }
    }
}

pub struct SerializeVec {
    type_name: Option<&'static str>,
    vec: Vec<LuaValue>,
}

pub struct SerializeTupleVariant {
    type_name: Option<&'static str>,
    variant: &'static str,
    vec: Vec<LuaValue>,
}

pub struct SerializeMap {
    type_name: Option<&'static str>,
    entries: Vec<(TableKey, LuaValue)>,
    current_key: Option<LuaValue>,
}

pub struct SerializeRecord {
    type_name: String,
    fields: Vec<Field>,
}

pub struct SerializeStructVariant {
    type_name: Option<&'static str>,
    variant: &'static str,
    table: LuaTable,
}

/// Wraps a variant payload as `{["Variant"]=payload}`, named after the enum when known.
fn variant_entry(type_name: Option<&'static str>, variant: &str, value: LuaValue) -> LuaValue {
    match type_name {
        Some(name) => Typed::mapping(name, vec![(LuaValue::from(variant), value)]).into(),
        None => {
            let mut table = LuaTable::with_capacity(1);
            table.insert(variant, value);
            LuaValue::Table(table)
        }
    }
}

impl ser::Serializer for ValueSerializer {
    type Ok = LuaValue;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeTupleVariant;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeRecord;
    type SerializeStructVariant = SerializeStructVariant;

    fn serialize_bool(self, v: bool) -> Result<LuaValue> {
        Ok(LuaValue::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<LuaValue> {
        Ok(LuaValue::from(v))
    }

    fn serialize_i16(self, v: i16) -> Result<LuaValue> {
        Ok(LuaValue::from(v))
    }

    fn serialize_i32(self, v: i32) -> Result<LuaValue> {
        Ok(LuaValue::from(v))
    }

    fn serialize_i64(self, v: i64) -> Result<LuaValue> {
        Ok(LuaValue::Integer(v))
    }

    fn serialize_u8(self, v: u8) -> Result<LuaValue> {
        Ok(LuaValue::from(v))
    }

    fn serialize_u16(self, v: u16) -> Result<LuaValue> {
        Ok(LuaValue::from(v))
    }

    fn serialize_u32(self, v: u32) -> Result<LuaValue> {
        Ok(LuaValue::from(v))
    }

    /// Integers are 64-bit signed; larger values are rejected rather than rounded.
    fn serialize_u64(self, v: u64) -> Result<LuaValue> {
        i64::try_from(v)
            .map(LuaValue::Integer)
            .map_err(|_| Error::type_mismatch(None, "integer up to i64::MAX", &v.to_string()))
    }

    fn serialize_f32(self, v: f32) -> Result<LuaValue> {
        Ok(LuaValue::from(v))
    }

    fn serialize_f64(self, v: f64) -> Result<LuaValue> {
        Ok(LuaValue::Float(v))
    }

    fn serialize_char(self, v: char) -> Result<LuaValue> {
        Ok(LuaValue::Char(v))
    }

    fn serialize_str(self, v: &str) -> Result<LuaValue> {
        Ok(LuaValue::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<LuaValue> {
        Ok(v.iter().map(|&b| LuaValue::from(b)).collect::<Vec<_>>().into())
    }

    fn serialize_none(self) -> Result<LuaValue> {
        Ok(LuaValue::Nil)
    }

    fn serialize_some<T>(self, value: &T) -> Result<LuaValue>
    where
        T: ?Sized + Serialize,
    {
        to_lua_value(value)
    }

    fn serialize_unit(self) -> Result<LuaValue> {
        Ok(LuaValue::Nil)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<LuaValue> {
        Ok(LuaValue::Nil)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<LuaValue> {
        Ok(LuaValue::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<LuaValue>
    where
        T: ?Sized + Serialize,
    {
        to_lua_value(value)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<LuaValue>
    where
        T: ?Sized + Serialize,
    {
        Ok(variant_entry(self.type_name, variant, to_lua_value(value)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec {
            type_name: self.type_name,
            vec: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeTupleVariant> {
        Ok(SerializeTupleVariant {
            type_name: self.type_name,
            variant,
            vec: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap {
            type_name: self.type_name,
            entries: Vec::with_capacity(len.unwrap_or(0)),
            current_key: None,
        })
    }

    fn serialize_struct(self, name: &'static str, len: usize) -> Result<SerializeRecord> {
        Ok(SerializeRecord {
            type_name: self.type_name.unwrap_or(name).to_string(),
            fields: Vec::with_capacity(len),
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeStructVariant> {
        Ok(SerializeStructVariant {
            type_name: self.type_name,
            variant,
            table: LuaTable::with_capacity(len),
        })
    }
}

impl SerializeVec {
    fn finish(self) -> LuaValue {
        match self.type_name {
            Some(name) => Typed::sequence(name, self.vec).into(),
            None => self.vec.into(),
        }
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = LuaValue;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_lua_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<LuaValue> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = LuaValue;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_lua_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<LuaValue> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = LuaValue;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_lua_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<LuaValue> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SerializeTupleVariant {
    type Ok = LuaValue;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.vec.push(to_lua_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<LuaValue> {
        Ok(variant_entry(self.type_name, self.variant, self.vec.into()))
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = LuaValue;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.current_key = Some(to_lua_value(key)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        let key = TableKey::try_from(key)?;
        self.entries.push((key, to_lua_value(value)?));
        Ok(())
    }

    fn end(self) -> Result<LuaValue> {
        Ok(match self.type_name {
            Some(name) => Typed::mapping(
                name,
                self.entries
                    .into_iter()
                    .map(|(k, v)| (LuaValue::from(k), v))
                    .collect(),
            )
            .into(),
            None => LuaValue::Table(self.entries.into_iter().collect()),
        })
    }
}

impl ser::SerializeStruct for SerializeRecord {
    type Ok = LuaValue;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.fields
            .push(Field::new(key, type_name::<T>(), to_lua_value(value)?));
        Ok(())
    }

    fn end(self) -> Result<LuaValue> {
        Ok(Typed::record(self.type_name, self.fields).into())
    }
}

impl ser::SerializeStructVariant for SerializeStructVariant {
    type Ok = LuaValue;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.table.insert(key, to_lua_value(value)?);
        Ok(())
    }

    fn end(self) -> Result<LuaValue> {
        Ok(variant_entry(
            self.type_name,
            self.variant,
            LuaValue::Table(self.table),
        ))
    }
}
