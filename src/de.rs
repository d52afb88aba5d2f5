//! TOML deserialization.
//!
//! This module provides the [`Deserializer`] that reads a TOML document and
//! drives serde's `Deserialize` implementations from it.
//!
//! ## Overview
//!
//! Deserialization happens in two steps:
//!
//! - **Parsing**: the whole document is parsed and checked into a [`Table`]
//!   first, so structural errors (a key defined twice, a header reopening a
//!   table) are reported before any user type sees a value
//! - **Visiting**: the resulting tree is handed to the visitor through an
//!   owned value deserializer
//!
//! Date and time values reach visitors as their TOML text, so they
//! deserialize into `String` or into chrono types with serde support.
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use serde_tomlet::from_str;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Point { x: i32, y: i32 }
//!
//! let point: Point = from_str("x = 1\ny = 2").unwrap();
//! assert_eq!(point, Point { x: 1, y: 2 });
//! ```
//!
//! Enums are read from a string for unit variants, or from a single-key
//! table for variants carrying data:
//!
//! ```rust
//! use serde_tomlet::from_str;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! enum Shape { Empty, Circle { r: f64 } }
//!
//! #[derive(Deserialize, Debug, PartialEq)]
//! struct Doc { a: Shape, b: Shape }
//!
//! let doc: Doc = from_str("a = \"Empty\"\nb = { Circle = { r = 1.5 } }").unwrap();
//! assert_eq!(doc, Doc { a: Shape::Empty, b: Shape::Circle { r: 1.5 } });
//! ```

use crate::ser::{format_date, format_local_datetime, format_offset_datetime, format_time};
use crate::{datetime, parser, Error, Result, Table, Value};
use serde::de::IntoDeserializer;
use serde::{de, forward_to_deserialize_any};
use tracing::debug;

/// The TOML deserializer.
///
/// Parses a TOML document into Rust values implementing `Deserialize`.
/// Created via [`Deserializer::from_str`].
pub struct Deserializer<'de> {
    input: &'de str,
}

impl<'de> Deserializer<'de> {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &'de str) -> Self {
        Deserializer { input }
    }

    /// Parses the whole document into its root table.
    ///
    /// # Errors
    ///
    /// Returns the first lexical, syntax or structural error in the document.
    pub fn parse_table(&mut self) -> Result<Table> {
        let table = parser::parse_document(self.input)?;
        debug!(
            bytes = self.input.len(),
            keys = table.len(),
            "parsed TOML document"
        );
        Ok(table)
    }

    fn value_deserializer(&mut self) -> Result<ValueDeserializer> {
        Ok(ValueDeserializer::new(Value::Table(self.parse_table()?)))
    }
}

impl<'de> de::Deserializer<'de> for &mut Deserializer<'de> {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        de::Deserializer::deserialize_any(self.value_deserializer()?, visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        // A document always exists, even when it is empty.
        visitor.visit_some(self)
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
        de::Deserializer::deserialize_enum(self.value_deserializer()?, name, variants, visitor)
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
}

impl SeqDeserializer {
    fn new(vec: Vec<Value>) -> Self {
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
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct MapDeserializer {
    iter: indexmap::map::IntoIter<String, Value>,
    value: Option<Value>,
}

impl MapDeserializer {
    fn new(table: Table) -> Self {
        MapDeserializer {
            iter: table.into_iter(),
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
                seed.deserialize(ValueDeserializer::new(Value::String(key)))
                    .map(Some)
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
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(upper),
            _ => None,
        }
    }
}

struct EnumDeserializer {
    variant: String,
    value: Value,
}

impl<'de> de::EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, Self::Variant)>
    where
        V: de::DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(ValueDeserializer::new(Value::String(self.variant)))?;
        Ok((variant, VariantDeserializer { value: self.value }))
    }
}

struct VariantDeserializer {
    value: Value,
}

impl<'de> de::VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            Value::Table(table) if table.is_empty() => Ok(()),
            _ => Err(Error::custom("expected unit variant")),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value>
    where
        T: de::DeserializeSeed<'de>,
    {
        seed.deserialize(ValueDeserializer::new(self.value))
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Array(arr) => visitor.visit_seq(SeqDeserializer::new(arr)),
            _ => Err(Error::custom("expected tuple variant")),
        }
    }

    fn struct_variant<V>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match self.value {
            Value::Table(table) => visitor.visit_map(MapDeserializer::new(table)),
            _ => Err(Error::custom("expected struct variant")),
        }
    }
}

/// Deserializes from an owned [`Value`] tree.
pub(crate) struct ValueDeserializer {
    value: Value,
}

impl ValueDeserializer {
    pub(crate) fn new(value: Value) -> Self {
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
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Integer(i) => visitor.visit_i64(i),
            Value::Float(f) => visitor.visit_f64(f),
            Value::String(s) => visitor.visit_string(s),
            Value::Array(arr) => visitor.visit_seq(SeqDeserializer::new(arr)),
            Value::Table(table) => visitor.visit_map(MapDeserializer::new(table)),
            Value::LocalDate(d) => visitor.visit_map(DatetimeDeserializer::new(format_date(&d))),
            Value::LocalTime(t) => visitor.visit_map(DatetimeDeserializer::new(format_time(&t))),
            Value::LocalDateTime(dt) => {
                visitor.visit_map(DatetimeDeserializer::new(format_local_datetime(&dt)))
            }
            Value::OffsetDateTime(dt) => {
                visitor.visit_map(DatetimeDeserializer::new(format_offset_datetime(&dt)))
            }
        }
    }

    /// Date/time values are also accepted as their TOML text.
    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        match datetime::text_of(&self.value) {
            Some(text) => visitor.visit_string(text),
            None => self.deserialize_any(visitor),
        }
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    /// A present value is always `Some`; absent struct fields are handled by
    /// serde's own missing-field logic.
    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value>
    where
        V: de::Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
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
        match self.value {
            Value::String(s) => visitor.visit_enum(s.into_deserializer()),
            Value::Table(table) if table.len() == 1 => {
                let mut entries = table.into_iter();
                match entries.next() {
                    Some((variant, value)) => visitor.visit_enum(EnumDeserializer { variant, value }),
                    None => Err(Error::custom("expected enum variant")),
                }
            }
            Value::Table(_) => Err(Error::custom(
                "expected a table with exactly one key naming the enum variant",
            )),
            other => Err(Error::custom(format!(
                "expected enum, found {}",
                other.type_str()
            ))),
        }
    }

    forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char
        bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

/// Presents a date/time as the one-field struct the `Value` visitor expects.
struct DatetimeDeserializer {
    text: Option<String>,
}

impl DatetimeDeserializer {
    fn new(text: String) -> Self {
        DatetimeDeserializer { text: Some(text) }
    }
}

impl<'de> de::MapAccess<'de> for DatetimeDeserializer {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>>
    where
        K: de::DeserializeSeed<'de>,
    {
        if self.text.is_none() {
            return Ok(None);
        }
        let field = ValueDeserializer::new(Value::String(datetime::FIELD.to_string()));
        seed.deserialize(field).map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value>
    where
        V: de::DeserializeSeed<'de>,
    {
        match self.text.take() {
            Some(text) => seed.deserialize(ValueDeserializer::new(Value::String(text))),
            None => Err(Error::custom("next_value_seed called before next_key_seed")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::HashMap;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Server {
        host: String,
        port: u16,
        tags: Vec<String>,
        timeout: Option<f64>,
    }

    #[test]
    fn test_struct_from_document() {
        let mut de = Deserializer::from_str(
            "host = \"localhost\"\nport = 8080\ntags = [\"a\", \"b\"]\n",
        );
        let server = Server::deserialize(&mut de).unwrap();
        assert_eq!(
            server,
            Server {
                host: "localhost".to_string(),
                port: 8080,
                tags: vec!["a".to_string(), "b".to_string()],
                timeout: None,
            }
        );
    }

    #[test]
    fn test_nested_tables_and_arrays_of_tables() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Product {
            name: String,
        }
        #[derive(Deserialize, Debug, PartialEq)]
        struct Doc {
            owner: HashMap<String, String>,
            products: Vec<Product>,
        }

        let src = "[owner]\nname = \"Tom\"\n\n[[products]]\nname = \"Hammer\"\n\n[[products]]\nname = \"Nail\"\n";
        let doc = Doc::deserialize(&mut Deserializer::from_str(src)).unwrap();
        assert_eq!(doc.owner.get("name").map(String::as_str), Some("Tom"));
        assert_eq!(
            doc.products,
            vec![
                Product { name: "Hammer".to_string() },
                Product { name: "Nail".to_string() }
            ]
        );
    }

    #[test]
    fn test_dates_reach_visitors_as_text() {
        #[derive(Deserialize)]
        struct Doc {
            day: String,
            at: String,
        }
        let doc = Doc::deserialize(&mut Deserializer::from_str(
            "day = 1979-05-27\nat = 1979-05-27T07:32:00Z",
        ))
        .unwrap();
        assert_eq!(doc.day, "1979-05-27");
        assert_eq!(doc.at, "1979-05-27T07:32:00Z");
    }

    #[test]
    fn test_enum_forms() {
        #[derive(Deserialize, Debug, PartialEq)]
        enum Mode {
            Fast,
            Limited(u32),
            Pair(i64, i64),
        }
        #[derive(Deserialize, Debug, PartialEq)]
        struct Doc {
            a: Mode,
            b: Mode,
            c: Mode,
        }
        let doc = Doc::deserialize(&mut Deserializer::from_str(
            "a = \"Fast\"\nb = { Limited = 3 }\nc = { Pair = [1, 2] }",
        ))
        .unwrap();
        assert_eq!(
            doc,
            Doc {
                a: Mode::Fast,
                b: Mode::Limited(3),
                c: Mode::Pair(1, 2)
            }
        );
    }

    #[test]
    fn test_parse_errors_surface_before_visiting() {
        let err = Server::deserialize(&mut Deserializer::from_str("host = 1\nhost = 2")).unwrap_err();
        assert_eq!(err, Error::already_defined(2, "host"));
    }

    #[test]
    fn test_type_mismatch_is_custom_error() {
        let err = Server::deserialize(&mut Deserializer::from_str(
            "host = 1\nport = 1\ntags = []",
        ))
        .unwrap_err();
        assert!(matches!(err, Error::Custom(_)));
    }
}
