//! Lua literal deserialization.
//!
//! This module provides the [`Deserializer`], a single-pass recursive decoder for
//! table-constructor literals, and the serde glue that turns its output into Rust values.
//!
//! ## Overview
//!
//! - **Value dispatch**: one significant byte decides between `nil`, booleans, numbers,
//!   quoted strings, tables and comments
//! - **Tables**: positional values, bare keys (`name=`), bracketed keys (`[1]=`, `["k"]=`),
//!   nested tables and line comments, separated by `,` or whitespace
//! - **Typed reconstruction**: with [`LuaOptions::deserialize_type`] set and a
//!   [`TypeRegistry`] attached, tables carrying `__type` are rebuilt when they close
//! - **Error reporting**: every error carries the byte offset where it was detected
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use serde_lua_table::from_str;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Data { x: i32, y: i32 }
//!
//! let data: Data = from_str("{ x = 1, y = 2 }").unwrap();
//! assert_eq!(data, Data { x: 1, y: 2 });
//!
//! let nums: Vec<i32> = from_str("{ 1, 2, 3, }").unwrap();
//! assert_eq!(nums, vec![1, 2, 3]);
//! ```

use crate::escape::decode_escape;
use crate::reconstruct::{reconstruct, Reconstructed, TypeRegistry};
use crate::scanner::{is_space, Scanner};
use crate::table::{TableKey, TYPE_KEY};
use crate::value::TypedShape;
use crate::{Error, LuaOptions, LuaTable, LuaValue, Result};
use log::{debug, trace};
use serde::de::{self, IntoDeserializer};
use serde::forward_to_deserialize_any;

/// The Lua literal deserializer.
///
/// Decodes one value from a byte slice. Created via [`Deserializer::from_str`] or
/// [`Deserializer::from_slice`].
pub struct Deserializer<'a> {
    scanner: Scanner<'a>,
    options: LuaOptions,
    registry: Option<&'a TypeRegistry>,
    depth: usize,
}

impl<'a> Deserializer<'a> {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &'a str) -> Self {
        Self::from_slice(input.as_bytes())
    }

    pub fn from_slice(input: &'a [u8]) -> Self {
        Deserializer {
            scanner: Scanner::new(input),
            options: LuaOptions::default(),
            registry: None,
            depth: 0,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: LuaOptions) -> Self {
        self.options = options;
        self
    }

    /// Attaches the registry used to rebuild tagged tables.
    #[must_use]
    pub fn with_registry(mut self, registry: &'a TypeRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Decodes the whole input as one value.
    ///
    /// Empty input decodes to `nil`. Anything other than whitespace and comments after the
    /// value is an error.
    pub fn parse_document(&mut self) -> Result<LuaValue> {
        debug!(
            "decoding literal at offset {} (deserialize_type: {})",
            self.scanner.position(),
            self.options.deserialize_type
        );
        if self.scanner.is_at_end() {
            return Ok(LuaValue::Nil);
        }
        let value = self.parse_value()?;
        self.end()?;
        Ok(value)
    }

    /// Checks that only whitespace and comments remain.
    pub fn end(&mut self) -> Result<()> {
        loop {
            self.scanner.skip_whitespace();
            match self.scanner.peek() {
                None => return Ok(()),
                Some(b'-') if self.scanner.peek_nth(1) == Some(b'-') => self.skip_comment()?,
                Some(c) => {
                    return Err(Error::malformed(
                        self.scanner.position(),
                        format!("unexpected trailing character '{}'", c as char),
                    ))
                }
            }
        }
    }

    /// Decodes the next value, skipping any comments in front of it.
    pub fn parse_value(&mut self) -> Result<LuaValue> {
        loop {
            self.scanner.skip_whitespace();
            let start = self.scanner.position();
            let value = match self.scanner.peek() {
                None => return Err(Error::unexpected_eof(start, "value")),
                Some(b'n') => self.parse_nil().map(|()| LuaValue::Nil),
                Some(b't' | b'f') => self.parse_bool().map(LuaValue::Bool),
                Some(b'0'..=b'9') => self.parse_number(),
                Some(b'"' | b'\'') => self.parse_string().map(LuaValue::String),
                Some(b'{') => self.parse_table(),
                Some(b'[') => Err(Error::unsupported(start, "block string")),
                Some(b'-') => match self.scanner.peek_nth(1) {
                    Some(b'-') => {
                        self.skip_comment()?;
                        continue;
                    }
                    Some(b'0'..=b'9' | b'.') => self.parse_number(),
                    Some(c) => Err(Error::malformed(
                        start + 1,
                        format!("unexpected character '{}' after '-'", c as char),
                    )),
                    None => Err(Error::unexpected_eof(start + 1, "number or comment after '-'")),
                },
                Some(c) => Err(Error::malformed(
                    start,
                    format!("unexpected character '{}'", c as char),
                )),
            };
            return value;
        }
    }

    fn parse_nil(&mut self) -> Result<()> {
        let start = self.scanner.position();
        let token = self.scanner.read_token();
        if token == "nil" {
            Ok(())
        } else {
            Err(Error::malformed(
                start,
                format!("expected 'nil', found '{}'", token),
            ))
        }
    }

    fn parse_bool(&mut self) -> Result<bool> {
        let start = self.scanner.position();
        let token = self.scanner.read_token();
        match token.as_ref() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(Error::malformed(
                start,
                format!("expected 'true' or 'false', found '{}'", other),
            )),
        }
    }

    fn parse_number(&mut self) -> Result<LuaValue> {
        let start = self.scanner.position();
        let token = self.scanner.read_token();
        parse_number_token(&token, start)
    }

    fn parse_string(&mut self) -> Result<String> {
        let start = self.scanner.position();
        let quote = self
            .scanner
            .next_byte()
            .ok_or_else(|| Error::unexpected_eof(start, "string literal"))?;
        let mut bytes = Vec::new();
        loop {
            match self.scanner.next_byte() {
                None => {
                    return Err(Error::unexpected_eof(
                        self.scanner.position(),
                        &format!("closing {} quote", quote as char),
                    ))
                }
                Some(b'\\') => decode_escape(&mut self.scanner, &mut bytes)?,
                Some(b) if b == quote => break,
                Some(b) => bytes.push(b),
            }
        }
        String::from_utf8(bytes)
            .map_err(|_| Error::malformed(start, "string literal is not valid UTF-8"))
    }

    /// Discards a `--` line comment, including its newline.
    fn skip_comment(&mut self) -> Result<()> {
        let start = self.scanner.position();
        for _ in 0..2 {
            match self.scanner.next_byte() {
                Some(b'-') => {}
                Some(c) => {
                    return Err(Error::malformed(
                        start,
                        format!("expected comment, found '{}'", c as char),
                    ))
                }
                None => return Err(Error::unexpected_eof(start, "comment")),
            }
        }
        if self.scanner.peek() == Some(b'[') {
            return Err(Error::unsupported(start, "block comment"));
        }
        while let Some(b) = self.scanner.next_byte() {
            if b == b'\n' {
                break;
            }
        }
        Ok(())
    }

    fn enter(&mut self, position: usize) -> Result<()> {
        self.depth += 1;
        match self.options.max_depth {
            Some(limit) if self.depth > limit => Err(Error::depth_limit(position, limit)),
            _ => Ok(()),
        }
    }

    /// `nil`, `true` or `false` used as a value rather than as a key.
    fn at_positional_word(&self) -> bool {
        let word = self.scanner.peek_word();
        matches!(word, b"nil" | b"true" | b"false")
            && self.scanner.peek_significant_from(word.len()) != Some(b'=')
    }

    fn parse_table(&mut self) -> Result<LuaValue> {
        let start = self.scanner.position();
        self.scanner.next_byte();
        self.enter(start)?;
        trace!("table opened at offset {} (depth {})", start, self.depth);

        let mut table = LuaTable::new();
        let mut next_index: i64 = 1;
        loop {
            self.scanner.skip_separators();
            let at = self.scanner.position();
            match self.scanner.peek() {
                None => return Err(Error::unexpected_eof(at, "'}' closing table")),
                Some(b'}') => {
                    self.scanner.next_byte();
                    break;
                }
                Some(b'-') if self.scanner.peek_nth(1) == Some(b'-') => self.skip_comment()?,
                Some(b'{' | b'"' | b'\'' | b'0'..=b'9' | b'-') => {
                    let value = self.parse_value()?;
                    table.insert(next_index, value);
                    next_index += 1;
                }
                Some(_) if self.at_positional_word() => {
                    let value = self.parse_value()?;
                    table.insert(next_index, value);
                    next_index += 1;
                }
                Some(_) => {
                    let key = self.parse_key()?;
                    trace!("key {:?} at offset {}", key, at);
                    let value = self.parse_value()?;
                    table.insert(key, value);
                }
            }
        }
        self.depth -= 1;
        trace!("table closed with {} entries", table.len());

        if self.options.deserialize_type && table.type_tag().is_some() {
            match self.registry {
                Some(registry) => match reconstruct(table, registry, start)? {
                    Reconstructed::Value(value) => return Ok(value),
                    Reconstructed::Unmatched(unmatched) => table = unmatched,
                },
                None => debug!("type tag at offset {} ignored: no registry attached", start),
            }
        }
        Ok(LuaValue::Table(table))
    }

    /// Reads an explicit key and the `=` that follows it.
    fn parse_key(&mut self) -> Result<TableKey> {
        let start = self.scanner.position();
        let key = if self.scanner.peek() == Some(b'[') {
            self.parse_bracketed_key()?
        } else {
            self.parse_bare_key()?
        };
        self.scanner.skip_whitespace();
        let at = self.scanner.position();
        match self.scanner.next_byte() {
            Some(b'=') => Ok(key),
            Some(b'}') => Err(Error::malformed(
                start,
                format!("expected '=' after key '{}'", key),
            )),
            Some(c) => Err(Error::malformed(
                at,
                format!("expected '=' after key, found '{}'", c as char),
            )),
            None => Err(Error::unexpected_eof(at, "'=' after table key")),
        }
    }

    /// A bare key is everything up to the next `=` or `}`, trimmed and taken verbatim.
    fn parse_bare_key(&mut self) -> Result<TableKey> {
        let start = self.scanner.position();
        let mut raw = Vec::new();
        while let Some(b) = self.scanner.peek() {
            if b == b'=' || b == b'}' {
                break;
            }
            raw.push(b);
            self.scanner.next_byte();
        }
        if self.scanner.is_at_end() {
            return Err(Error::unexpected_eof(self.scanner.position(), "'=' after table key"));
        }
        let end = raw.iter().rposition(|&b| !is_space(b)).map_or(0, |i| i + 1);
        raw.truncate(end);
        if raw.is_empty() {
            return Err(Error::malformed(start, "missing key before '='"));
        }
        String::from_utf8(raw)
            .map(TableKey::String)
            .map_err(|_| Error::malformed(start, "table key is not valid UTF-8"))
    }

    /// `["string"]` or `[integer]`.
    fn parse_bracketed_key(&mut self) -> Result<TableKey> {
        self.scanner.next_byte();
        self.scanner.skip_whitespace();
        let start = self.scanner.position();
        let key = match self.scanner.peek() {
            Some(b'"' | b'\'') => TableKey::String(self.parse_string()?),
            Some(_) => {
                let mut raw = String::new();
                while let Some(b) = self.scanner.peek() {
                    if b == b']' || b == b'=' || b == b'}' || is_space(b) {
                        break;
                    }
                    raw.push(b as char);
                    self.scanner.next_byte();
                }
                match parse_number_token(&raw, start) {
                    Ok(LuaValue::Integer(i)) => TableKey::Integer(i),
                    Ok(_) => {
                        return Err(Error::malformed(
                            start,
                            format!("table key '{}' is not an integer or string", raw),
                        ))
                    }
                    Err(e) if e.kind() == crate::ErrorKind::UnsupportedFeature => return Err(e),
                    Err(_) => {
                        return Err(Error::malformed(
                            start,
                            format!("bracketed key '{}' is not an integer or string", raw),
                        ))
                    }
                }
            }
            None => return Err(Error::unexpected_eof(start, "bracketed key")),
        };
        self.scanner.skip_whitespace();
        let at = self.scanner.position();
        match self.scanner.next_byte() {
            Some(b']') => Ok(key),
            Some(c) => Err(Error::malformed(
                at,
                format!("expected ']' after bracketed key, found '{}'", c as char),
            )),
            None => Err(Error::unexpected_eof(at, "']' after bracketed key")),
        }
    }
}

/// Classifies and parses a delimited number token starting at `start`.
fn parse_number_token(token: &str, start: usize) -> Result<LuaValue> {
    let malformed = || Error::malformed(start, format!("invalid number '{}'", token));
    if token.contains(['p', 'P']) {
        return Err(Error::unsupported(start, "hexadecimal float"));
    }
    if token.contains(['x', 'X']) {
        let (negative, body) = match token.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, token),
        };
        let digits = body
            .strip_prefix("0x")
            .or_else(|| body.strip_prefix("0X"))
            .ok_or_else(malformed)?;
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(malformed());
        }
        let magnitude = u64::from_str_radix(digits, 16).map_err(|_| malformed())? as i64;
        return Ok(LuaValue::Integer(if negative {
            magnitude.wrapping_neg()
        } else {
            magnitude
        }));
    }
    if token.contains(['.', 'e', 'E']) {
        return token
            .parse::<f64>()
            .map(LuaValue::Float)
            .map_err(|_| malformed());
    }
    token
        .parse::<i64>()
        .map(LuaValue::Integer)
        .map_err(|_| malformed())
}

macro_rules! forward_to_value {
    ($($method:ident $(($($arg:ident: $ty:ty),*))?;)*) => {
        $(
            fn $method<V>(self, $($($arg: $ty,)*)? visitor: V) -> Result<V::Value>
            where
                V: de::Visitor<'de>,
            {
                let value = self.parse_document()?;
                ValueDeserializer::new(value).$method($($($arg,)*)? visitor)
            }
        )*
    };
}

impl<'de, 'a> de::Deserializer<'de> for &mut Deserializer<'a> {
    type Error = Error;

    forward_to_value! {
        deserialize_any;
        deserialize_bool;
        deserialize_i8;
        deserialize_i16;
        deserialize_i32;
        deserialize_i64;
        deserialize_u8;
        deserialize_u16;
        deserialize_u32;
        deserialize_u64;
        deserialize_f32;
        deserialize_f64;
        deserialize_char;
        deserialize_str;
        deserialize_string;
        deserialize_bytes;
        deserialize_byte_buf;
        deserialize_option;
        deserialize_unit;
        deserialize_unit_struct(name: &'static str);
        deserialize_newtype_struct(name: &'static str);
        deserialize_seq;
        deserialize_tuple(len: usize);
        deserialize_tuple_struct(name: &'static str, len: usize);
        deserialize_map;
        deserialize_struct(name: &'static str, fields: &'static [&'static str]);
        deserialize_enum(name: &'static str, variants: &'static [&'static str]);
        deserialize_identifier;
        deserialize_ignored_any;
    }
}

fn mismatch(expected: &str, value: &LuaValue) -> Error {
    Error::type_mismatch(None, expected, value.kind_name())
}

/// Drops a `__type` marker so tagged tables deserialize like plain ones.
fn untagged(mut table: LuaTable) -> LuaTable {
    if table.type_tag().is_some() {
        table.remove(TYPE_KEY);
    }
    table
}

fn variant_count_mismatch(len: usize) -> Error {
    Error::type_mismatch(None, "single-entry enum table", &format!("{} entries", len))
}

fn typed_kind(shape: &TypedShape) -> &'static str {
    match shape {
        TypedShape::Sequence(_) => "sequence",
        TypedShape::Mapping(_) => "mapping",
        TypedShape::Record(_) => "record",
    }
}

fn table_entries(table: LuaTable) -> Vec<(LuaValue, LuaValue)> {
    untagged(table)
        .into_iter()
        .map(|(k, v)| (LuaValue::from(k), v))
        .collect()
}

fn typed_entries(shape: TypedShape) -> Vec<(LuaValue, LuaValue)> {
    match shape {
        TypedShape::Sequence(elements) => elements
            .into_iter()
            .enumerate()
            .map(|(i, v)| (LuaValue::Integer(i as i64 + 1), v))
            .collect(),
        TypedShape::Mapping(entries) => entries,
        TypedShape::Record(fields) => fields
            .into_iter()
            .map(|f| (LuaValue::String(f.name), f.value))
            .collect(),
    }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<LuaValue>,
}

impl SeqDeserializer {
    fn new(vec: Vec<LuaValue>) -> Self {
        SeqDeserializer {
            iter: vec.into_iter(),
        }
    }
}

impl<'de> de::SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

struct MapDeserializer {
    iter: std::vec::IntoIter<(LuaValue, LuaValue)>,
    value: Option<LuaValue>,
}

impl MapDeserializer {
    fn new(entries: Vec<(LuaValue, LuaValue)>) -> Self {
        MapDeserializer {
            iter: entries.into_iter(),
            value: None,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(KeyDeserializer { key }).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.value.take() {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }
}

/// Table keys are integers or strings; this lets either side stand in for the other.
struct KeyDeserializer {
    key: LuaValue,
}

impl<'de> de::Deserializer<'de> for KeyDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        ValueDeserializer::new(self.key).deserialize_any(visitor)
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.key {
            LuaValue::Integer(i) => visitor.visit_string(i.to_string()),
            LuaValue::Char(c) => visitor.visit_string(c.to_string()),
            other => ValueDeserializer::new(other).deserialize_any(visitor),
        }
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_i64<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.key {
            LuaValue::String(ref s) => match s.parse::<i64>() {
                Ok(i) => visitor.visit_i64(i),
                Err(_) => Err(mismatch("integer key", &self.key)),
            },
            other => ValueDeserializer::new(other).deserialize_any(visitor),
        }
    }

    fn deserialize_i8<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_i64(visitor)
    }

    fn deserialize_i16<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_i64(visitor)
    }

    fn deserialize_i32<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_i64(visitor)
    }

    fn deserialize_u8<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_i64(visitor)
    }

    fn deserialize_u16<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_i64(visitor)
    }

    fn deserialize_u32<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_i64(visitor)
    }

    fn deserialize_u64<V: de::Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        self.deserialize_i64(visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        ValueDeserializer::new(self.key).deserialize_enum(name, variants, visitor)
    }

    forward_to_deserialize_any! {
        bool i128 u128 f32 f64 char bytes byte_buf option unit unit_struct seq tuple
        tuple_struct map struct ignored_any
    }
}

struct EnumDeserializer {
    variant: String,
    value: Option<LuaValue>,
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(ValueDeserializer::new(LuaValue::String(self.variant)))?;
        Ok((variant, VariantDeserializer { value: self.value }))
    }
}

struct VariantDeserializer {
    value: Option<LuaValue>,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            Some(LuaValue::Nil) | None => Ok(()),
            Some(other) => Err(mismatch("unit variant", &other)),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        match self.value {
            Some(value) => seed.deserialize(ValueDeserializer::new(value)),
            None => Err(Error::type_mismatch(None, "newtype variant", "unit variant")),
        }
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(value) => de::Deserializer::deserialize_seq(ValueDeserializer::new(value), visitor),
            None => Err(Error::type_mismatch(None, "tuple variant", "unit variant")),
        }
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Some(value) => de::Deserializer::deserialize_map(ValueDeserializer::new(value), visitor),
            None => Err(Error::type_mismatch(None, "struct variant", "unit variant")),
        }
    }
}

/// Drives serde visitors from an already decoded [`LuaValue`].
pub(crate) struct ValueDeserializer {
    value: LuaValue,
}

impl ValueDeserializer {
    pub(crate) fn new(value: LuaValue) -> Self {
        ValueDeserializer { value }
    }
}

impl<'de> de::Deserializer<'de> for ValueDeserializer {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            LuaValue::Nil => visitor.visit_unit(),
            LuaValue::Bool(b) => visitor.visit_bool(b),
            LuaValue::Integer(i) => visitor.visit_i64(i),
            LuaValue::Float(f) => visitor.visit_f64(f),
            LuaValue::Char(c) => visitor.visit_char(c),
            LuaValue::String(s) => visitor.visit_string(s),
            LuaValue::Table(table) => {
                let table = untagged(table);
                if table.is_sequence() && !table.is_empty() {
                    visitor.visit_seq(SeqDeserializer::new(table.into_iter().map(|(_, v)| v).collect()))
                } else {
                    visitor.visit_map(MapDeserializer::new(table_entries(table)))
                }
            }
            LuaValue::Typed(typed) => match typed.shape {
                TypedShape::Sequence(elements) => visitor.visit_seq(SeqDeserializer::new(elements)),
                shape => visitor.visit_map(MapDeserializer::new(typed_entries(shape))),
            },
        }
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            LuaValue::String(ref s) if s.chars().count() == 1 => match s.chars().next() {
                Some(c) => visitor.visit_char(c),
                None => Err(mismatch("char", &self.value)),
            },
            other => ValueDeserializer::new(other).deserialize_any(visitor),
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            LuaValue::Nil => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            LuaValue::Nil => visitor.visit_unit(),
            other => Err(mismatch("nil", &other)),
        }
    }

    fn deserialize_unit_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            LuaValue::Table(table) => {
                let table = untagged(table);
                if !table.is_sequence() {
                    return Err(Error::type_mismatch(None, "sequence", "table"));
                }
                visitor.visit_seq(SeqDeserializer::new(table.into_iter().map(|(_, v)| v).collect()))
            }
            LuaValue::Typed(typed) => match typed.shape {
                TypedShape::Sequence(elements) => visitor.visit_seq(SeqDeserializer::new(elements)),
                TypedShape::Mapping(_) => Err(Error::type_mismatch(None, "sequence", "mapping")),
                TypedShape::Record(_) => Err(Error::type_mismatch(None, "sequence", "record")),
            },
            other => Err(mismatch("sequence", &other)),
        }
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            LuaValue::Table(table) => visitor.visit_map(MapDeserializer::new(table_entries(table))),
            LuaValue::Typed(typed) => visitor.visit_map(MapDeserializer::new(typed_entries(typed.shape))),
            other => Err(mismatch("table", &other)),
        }
    }

    /// Struct fields are matched by name; integer-keyed entries are skipped.
    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let entries = match self.value {
            LuaValue::Table(table) => table_entries(table),
            LuaValue::Typed(typed) => typed_entries(typed.shape),
            other => return Err(mismatch("record", &other)),
        };
        let named = entries
            .into_iter()
            .filter(|(k, _)| matches!(k, LuaValue::String(_)))
            .collect();
        visitor.visit_map(MapDeserializer::new(named))
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        let entry = match self.value {
            LuaValue::String(s) => return visitor.visit_enum(s.into_deserializer()),
            LuaValue::Table(table) => {
                let table = untagged(table);
                if table.len() != 1 {
                    return Err(variant_count_mismatch(table.len()));
                }
                table.into_iter().next().map(|(k, v)| (LuaValue::from(k), v))
            }
            LuaValue::Typed(typed) => match typed.shape {
                TypedShape::Mapping(entries) if entries.len() == 1 => entries.into_iter().next(),
                TypedShape::Mapping(entries) => return Err(variant_count_mismatch(entries.len())),
                shape => return Err(Error::type_mismatch(None, "enum", typed_kind(&shape))),
            },
            other => return Err(mismatch("enum", &other)),
        };
        match entry {
            Some((LuaValue::String(variant), value)) => visitor.visit_enum(EnumDeserializer {
                variant,
                value: Some(value),
            }),
            Some((key, _)) => Err(Error::type_mismatch(
                None,
                "enum variant name",
                key.kind_name(),
            )),
            None => Err(variant_count_mismatch(0)),
        }
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_unit()
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 str string
        bytes byte_buf identifier
    }
}
