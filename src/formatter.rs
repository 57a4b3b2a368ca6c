//! The codec boundary used by host adapters.
//!
//! A [`LuaFormatter`] bundles [`LuaOptions`] with a [`TypeRegistry`]. Build it once and
//! share it: every method takes `&self`, and the formatter is `Send + Sync`.
//!
//! ## Examples
//!
//! ```rust
//! use serde_lua_table::{LuaFormatter, LuaOptions, LuaValue, TypeRegistry};
//! use std::collections::HashMap;
//!
//! let registry = TypeRegistry::new().with_type::<HashMap<String, i64>>();
//! let formatter = LuaFormatter::new(LuaOptions::new().with_deserialize_type(true), registry);
//!
//! let tag = std::any::type_name::<HashMap<String, i64>>();
//! let value = formatter.decode_as(br#"{ a = 1, b = "2" }"#, tag).unwrap();
//! assert_eq!(value.get("b"), Some(&LuaValue::Integer(2)));
//! ```

use crate::de::{Deserializer, ValueDeserializer};
use crate::reconstruct::{reconstruct, Reconstructed, TypeRegistry};
use crate::scanner::is_space;
use crate::table::TYPE_KEY;
use crate::{Error, LuaOptions, LuaValue, Result};
use log::debug;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;

/// Options plus type registry: everything needed to decode and encode.
#[derive(Clone, Debug, Default)]
pub struct LuaFormatter {
    options: LuaOptions,
    registry: TypeRegistry,
}

impl LuaFormatter {
    #[must_use]
    pub fn new(options: LuaOptions, registry: TypeRegistry) -> Self {
        LuaFormatter { options, registry }
    }

    /// A formatter with an empty registry.
    #[must_use]
    pub fn with_options(options: LuaOptions) -> Self {
        Self::new(options, TypeRegistry::new())
    }

    #[must_use]
    pub fn options(&self) -> &LuaOptions {
        &self.options
    }

    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    /// Decodes one literal. Empty input decodes to `nil`.
    pub fn decode(&self, bytes: &[u8]) -> Result<LuaValue> {
        Deserializer::from_slice(bytes)
            .with_options(self.options.clone())
            .with_registry(&self.registry)
            .parse_document()
    }

    pub fn decode_str(&self, s: &str) -> Result<LuaValue> {
        self.decode(s.as_bytes())
    }

    /// Decodes one literal as the registered type `tag`.
    ///
    /// A value already reconstructed as `tag` is returned directly. A table is tagged with
    /// `tag` and reconstructed; if that is impossible the result is a type mismatch.
    /// Scalars are returned unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_lua_table::{ErrorKind, LuaFormatter, LuaValue};
    ///
    /// let formatter = LuaFormatter::default();
    /// assert_eq!(formatter.decode_as(b"42", "Anything").unwrap(), LuaValue::Integer(42));
    ///
    /// let err = formatter.decode_as(b"{ x = 1 }", "Unregistered").unwrap_err();
    /// assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    /// ```
    pub fn decode_as(&self, bytes: &[u8], tag: &str) -> Result<LuaValue> {
        debug!("decoding {} bytes as {}", bytes.len(), tag);
        let position = bytes.iter().position(|&b| !is_space(b)).unwrap_or(0);
        match self.decode(bytes)? {
            LuaValue::Typed(typed) if typed.type_name == tag => Ok(LuaValue::Typed(typed)),
            LuaValue::Table(mut table) => {
                table.insert(TYPE_KEY, LuaValue::from(tag));
                match reconstruct(table, &self.registry, position)? {
                    Reconstructed::Value(value) => Ok(value),
                    Reconstructed::Unmatched(_) => {
                        Err(Error::type_mismatch(Some(position), tag, "table"))
                    }
                }
            }
            value if value.is_scalar() => Ok(value),
            other => Err(Error::type_mismatch(
                Some(position),
                tag,
                &format!("{} {}", other.kind_name(), type_name_of(&other)),
            )),
        }
    }

    /// Decodes one literal into a Rust value, reconstructing tagged tables on the way.
    pub fn decode_into<T>(&self, bytes: &[u8]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        T::deserialize(ValueDeserializer::new(self.decode(bytes)?))
    }

    /// Renders a dynamic value.
    pub fn encode_value(&self, value: &LuaValue) -> Result<String> {
        value.to_lua_string(&self.options)
    }

    /// Renders any `T: Serialize`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_lua_table::{LuaFormatter, LuaOptions};
    ///
    /// let formatter = LuaFormatter::with_options(LuaOptions::pretty());
    /// assert_eq!(formatter.encode(&["a", "b"]).unwrap(), "{\n\t\"a\",\n\t\"b\",\n}");
    /// ```
    pub fn encode<T>(&self, value: &T) -> Result<String>
    where
        T: ?Sized + Serialize,
    {
        crate::to_string_with_options(value, self.options.clone())
    }

    pub fn encode_to_writer<W, T>(&self, mut writer: W, value: &T) -> Result<()>
    where
        W: io::Write,
        T: ?Sized + Serialize,
    {
        let text = self.encode(value)?;
        writer
            .write_all(text.as_bytes())
            .map_err(|e| Error::io(&e.to_string()))
    }
}

fn type_name_of(value: &LuaValue) -> &str {
    value.as_typed().map_or("", |typed| typed.type_name.as_str())
}
