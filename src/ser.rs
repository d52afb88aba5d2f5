//! TOML serialization.
//!
//! This module provides the [`Serializer`] that writes a [`Value`] tree as
//! TOML text, and [`ValueSerializer`], which turns any `Serialize` type into
//! such a tree.
//!
//! ## Overview
//!
//! The writer picks the syntax for each part of the tree:
//!
//! - **Sections**: top-level tables become `[header]` sections, arrays of
//!   tables become `[[header]]` sections, nested tables become dotted keys
//! - **Inline collections**: used where the options ask for them, and
//!   wherever a header cannot be (inside arrays and inline tables)
//! - **Line wrapping**: arrays stay on one line, or put one element per line,
//!   according to [`ListWrap`](crate::ListWrap)
//! - **String styles**: the plainest of `"…"`, `'…'`, `"""…"""` and `'''…'''`
//!   that can carry the content unchanged, with escaped `"…"` as fallback
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use serde_tomlet::{to_string, to_string_pretty};
//! use serde::Serialize;
//!
//! #[derive(Serialize)]
//! struct Data { x: i32, tags: Vec<&'static str> }
//!
//! let data = Data { x: 1, tags: vec!["a", "b"] };
//!
//! assert_eq!(to_string(&data).unwrap(), "x = 1\ntags = [\"a\", \"b\"]\n");
//! assert_eq!(
//!     to_string_pretty(&data).unwrap(),
//!     "x = 1\ntags = [\n  \"a\",\n  \"b\",\n]\n"
//! );
//! ```
//!
//! ## Direct Serializer Usage
//!
//! ```rust
//! use serde_tomlet::{toml, Serializer, SerializerOptions};
//!
//! let doc = toml!({ "foo": { "bar": { "baz": "x" } } });
//!
//! let mut serializer = Serializer::new(SerializerOptions::new());
//! serializer.serialize_value(&doc).unwrap();
//! assert_eq!(serializer.into_inner(), "[foo]\nbar.baz = \"x\"\n");
//! ```

use crate::datetime;
use crate::lexer::{is_bare_key_char, is_disallowed_control};
use crate::options::{CollectionStyle, ListWrap};
use crate::{Error, Result, SerializerOptions, Table, Value};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{ser, Serialize};
use std::fmt::Write as _;
use tracing::debug;

pub(crate) fn format_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub(crate) fn format_time(time: &NaiveTime) -> String {
    time.format("%H:%M:%S%.f").to_string()
}

pub(crate) fn format_local_datetime(datetime: &NaiveDateTime) -> String {
    datetime.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

/// TOML offsets have minute precision.
pub(crate) fn is_whole_minute_offset(offset: &FixedOffset) -> bool {
    offset.local_minus_utc() % 60 == 0
}

/// A zero offset is written as `Z`. Seconds of the offset are dropped.
pub(crate) fn format_offset_datetime(datetime: &DateTime<FixedOffset>) -> String {
    if datetime.offset().local_minus_utc() == 0 {
        format!("{}Z", format_local_datetime(&datetime.naive_local()))
    } else {
        datetime.format("%Y-%m-%dT%H:%M:%S%.f%:z").to_string()
    }
}

/// Renders a value on a single line in inline syntax, escaping characters a
/// checked serializer would reject.
pub(crate) fn render_inline(value: &Value) -> String {
    let mut serializer = Serializer {
        output: String::new(),
        options: SerializerOptions::compact(),
        strict: false,
    };
    serializer
        .write_value(value, 0, true)
        .map(|()| serializer.output)
        .unwrap_or_else(|e| e.to_string())
}

/// The TOML writer.
///
/// Writes [`Value`] trees rooted in a table as TOML documents. Created via
/// [`Serializer::new`] with customizable options.
pub struct Serializer {
    output: String,
    options: SerializerOptions,
    /// Reject unrepresentable content instead of escaping it.
    strict: bool,
}

impl Serializer {
    pub fn new(options: SerializerOptions) -> Self {
        Serializer {
            output: String::with_capacity(256),
            options,
            strict: true,
        }
    }

    pub fn into_inner(self) -> String {
        self.output
    }

    /// Writes `value` as a document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RootNotTable`] unless `value` is a table, and
    /// [`Error::DisallowedCharacter`] for strings holding control characters.
    pub fn serialize_value(&mut self, value: &Value) -> Result<()> {
        match value {
            Value::Table(table) => self.serialize_table(table),
            other => Err(Error::RootNotTable(other.type_str().to_string())),
        }
    }

    /// Writes `table` as a document.
    pub fn serialize_table(&mut self, table: &Table) -> Result<()> {
        let start = self.output.len();
        self.write_section(&mut Vec::new(), table)?;
        debug!(
            bytes = self.output.len() - start,
            keys = table.len(),
            "serialized TOML document"
        );
        Ok(())
    }

    fn is_table_array(&self, items: &[Value]) -> bool {
        self.options.list_style == CollectionStyle::Header
            && !items.is_empty()
            && items.iter().all(Value::is_table)
    }

    /// A table needs a section when something below it is written as an
    /// array of tables, which only header syntax can express.
    fn needs_section(&self, table: &Table) -> bool {
        table.values().any(|value| match value {
            Value::Array(items) => self.is_table_array(items),
            Value::Table(inner) => self.needs_section(inner),
            _ => false,
        })
    }

    fn is_section(&self, value: &Value, at_root: bool) -> bool {
        match value {
            Value::Table(table) => {
                (at_root && self.options.table_style == CollectionStyle::Header)
                    || self.needs_section(table)
            }
            Value::Array(items) => self.is_table_array(items),
            _ => false,
        }
    }

    /// Writes the body of the table at `path`: its key/value lines, then its
    /// subsections. The caller has already written the header, if any.
    fn write_section(&mut self, path: &mut Vec<String>, table: &Table) -> Result<()> {
        let at_root = path.is_empty();
        let (sections, entries): (Vec<_>, Vec<_>) = table
            .iter()
            .partition(|(_, value)| self.is_section(value, at_root));

        let mut dotted = Vec::new();
        for (key, value) in entries {
            self.write_entry(&mut dotted, key, value)?;
        }

        for (key, value) in sections {
            path.push(key.clone());
            match value {
                Value::Table(inner) => {
                    let has_entries = inner.values().any(|v| !self.is_section(v, false));
                    let has_sections = inner.values().any(|v| self.is_section(v, false));
                    if has_entries || !has_sections {
                        self.write_header(path, false)?;
                    }
                    self.write_section(path, inner)?;
                }
                Value::Array(items) => {
                    for item in items {
                        if let Value::Table(inner) = item {
                            self.write_header(path, true)?;
                            self.write_section(path, inner)?;
                        }
                    }
                }
                _ => {}
            }
            path.pop();
        }
        Ok(())
    }

    fn write_header(&mut self, path: &[String], array: bool) -> Result<()> {
        if !self.output.is_empty() {
            self.output.push('\n');
        }
        self.output.push_str(if array { "[[" } else { "[" });
        self.write_dotted_key(path)?;
        self.output.push_str(if array { "]]\n" } else { "]\n" });
        Ok(())
    }

    /// Writes `key = value`. Under header style, non-empty tables expand into
    /// one dotted-key line per leaf.
    fn write_entry(&mut self, prefix: &mut Vec<String>, key: &str, value: &Value) -> Result<()> {
        match value {
            Value::Table(table)
                if self.options.table_style == CollectionStyle::Header && !table.is_empty() =>
            {
                prefix.push(key.to_string());
                for (inner_key, inner) in table {
                    self.write_entry(prefix, inner_key, inner)?;
                }
                prefix.pop();
                Ok(())
            }
            _ => {
                for segment in prefix.iter() {
                    self.write_key(segment)?;
                    self.output.push('.');
                }
                self.write_key(key)?;
                self.output.push_str(" = ");
                self.write_value(value, 0, false)?;
                self.output.push('\n');
                Ok(())
            }
        }
    }

    fn write_dotted_key(&mut self, path: &[String]) -> Result<()> {
        for (i, segment) in path.iter().enumerate() {
            if i > 0 {
                self.output.push('.');
            }
            self.write_key(segment)?;
        }
        Ok(())
    }

    fn write_key(&mut self, key: &str) -> Result<()> {
        if !key.is_empty() && key.chars().all(is_bare_key_char) {
            self.output.push_str(key);
            return Ok(());
        }
        self.check_characters(key)?;
        if !key.contains(['"', '\\', '\n', '\r']) && !key.contains(is_disallowed_control) {
            let _ = write!(self.output, "\"{}\"", key);
        } else if !key.contains(['\'', '\n', '\r']) && !key.contains(is_disallowed_control) {
            let _ = write!(self.output, "'{}'", key);
        } else {
            self.write_escaped(key);
        }
        Ok(())
    }

    /// Writes a value in inline position. `depth` is the nesting level of
    /// multi-line arrays; `in_inline_table` forbids newlines.
    fn write_value(&mut self, value: &Value, depth: usize, in_inline_table: bool) -> Result<()> {
        match value {
            Value::String(s) => self.write_string(s, !in_inline_table)?,
            Value::Integer(i) => {
                let _ = write!(self.output, "{}", i);
            }
            Value::Float(f) => self.output.push_str(&format_float(*f)),
            Value::Bool(b) => self.output.push_str(if *b { "true" } else { "false" }),
            Value::LocalDate(d) => {
                self.check_year(d.year())?;
                self.output.push_str(&format_date(d));
            }
            Value::LocalTime(t) => self.output.push_str(&format_time(t)),
            Value::LocalDateTime(dt) => {
                self.check_year(dt.year())?;
                self.output.push_str(&format_local_datetime(dt));
            }
            Value::OffsetDateTime(dt) => {
                self.check_year(dt.year())?;
                self.check_offset(dt.offset())?;
                self.output.push_str(&format_offset_datetime(dt));
            }
            Value::Array(items) => self.write_array(items, depth, in_inline_table)?,
            Value::Table(table) => self.write_inline_table(table, depth)?,
        }
        Ok(())
    }

    fn write_array(&mut self, items: &[Value], depth: usize, in_inline_table: bool) -> Result<()> {
        if items.is_empty() {
            self.output.push_str("[]");
            return Ok(());
        }
        let multiline = !in_inline_table
            && match self.options.list_wrap {
                ListWrap::SingleLine => false,
                ListWrap::MultiLine => true,
                ListWrap::Adaptive => items.iter().any(|v| v.is_array() || v.is_table()),
            };

        if !multiline {
            self.output.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    self.output.push_str(", ");
                }
                self.write_value(item, depth, in_inline_table)?;
            }
            self.output.push(']');
            return Ok(());
        }

        let indent = self.options.indent;
        self.output.push_str("[\n");
        for item in items {
            self.output.push_str(&" ".repeat((depth + 1) * indent));
            self.write_value(item, depth + 1, false)?;
            self.output.push_str(",\n");
        }
        self.output.push_str(&" ".repeat(depth * indent));
        self.output.push(']');
        Ok(())
    }

    fn write_inline_table(&mut self, table: &Table, depth: usize) -> Result<()> {
        if table.is_empty() {
            self.output.push_str("{}");
            return Ok(());
        }
        self.output.push_str("{ ");
        for (i, (key, value)) in table.iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            self.write_key(key)?;
            self.output.push_str(" = ");
            self.write_value(value, depth, true)?;
        }
        self.output.push_str(" }");
        Ok(())
    }

    /// Chooses the first string style that can hold `s` verbatim.
    fn write_string(&mut self, s: &str, allow_newlines: bool) -> Result<()> {
        self.check_characters(s)?;
        if s.contains(is_disallowed_control) {
            self.write_escaped(s);
        } else if !s.contains(['"', '\\', '\n', '\r']) {
            let _ = write!(self.output, "\"{}\"", s);
        } else if !s.contains(['\'', '\n', '\r']) {
            let _ = write!(self.output, "'{}'", s);
        } else if allow_newlines
            && !s.contains("\"\"")
            && !s.contains(['\\', '\r'])
            && !s.ends_with('"')
        {
            let _ = write!(self.output, "\"\"\"\n{}\"\"\"", s);
        } else if allow_newlines && !s.contains("''") && !s.contains('\r') && !s.ends_with('\'') {
            let _ = write!(self.output, "'''\n{}'''", s);
        } else {
            self.write_escaped(s);
        }
        Ok(())
    }

    fn write_escaped(&mut self, s: &str) {
        self.output.push('"');
        for ch in s.chars() {
            match ch {
                '"' => self.output.push_str("\\\""),
                '\\' => self.output.push_str("\\\\"),
                '\n' => self.output.push_str("\\n"),
                '\r' => self.output.push_str("\\r"),
                '\u{8}' => self.output.push_str("\\b"),
                '\u{C}' => self.output.push_str("\\f"),
                c if is_disallowed_control(c) => {
                    let _ = write!(self.output, "\\u{:04X}", c as u32);
                }
                c => self.output.push(c),
            }
        }
        self.output.push('"');
    }

    fn check_characters(&self, s: &str) -> Result<()> {
        if !self.strict {
            return Ok(());
        }
        match s.chars().find(|&c| is_disallowed_control(c)) {
            Some(c) => Err(Error::DisallowedCharacter(c)),
            None => Ok(()),
        }
    }

    fn check_offset(&self, offset: &FixedOffset) -> Result<()> {
        if self.strict && !is_whole_minute_offset(offset) {
            return Err(Error::UnsupportedType(format!(
                "offset {} has a seconds part",
                offset
            )));
        }
        Ok(())
    }

    fn check_year(&self, year: i32) -> Result<()> {
        if self.strict && !(0..=9999).contains(&year) {
            return Err(Error::UnsupportedType(format!(
                "year {} is outside 0000..=9999",
                year
            )));
        }
        Ok(())
    }
}

fn format_float(f: f64) -> String {
    if f.is_nan() {
        "nan".to_string()
    } else if f.is_infinite() {
        let text = if f > 0.0 { "inf" } else { "-inf" };
        text.to_string()
    } else {
        // Debug formatting always keeps a fraction or an exponent.
        format!("{:?}", f)
    }
}

/// Serializes any `Serialize` type into a [`Value`].
///
/// `None` cannot be represented on its own; struct fields and map entries
/// holding `None` are skipped.
pub struct ValueSerializer;

pub struct SerializeVec {
    vec: Vec<Value>,
    /// Set for tuple variants, which become `{ variant = [...] }`.
    variant: Option<&'static str>,
}

pub struct SerializeMap {
    map: Table,
    current_key: Option<String>,
    /// Set for struct variants, which become `{ variant = { ... } }`.
    variant: Option<&'static str>,
    /// Set for the struct that carries a date/time value.
    datetime: bool,
}

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SerializeVec;
    type SerializeTuple = SerializeVec;
    type SerializeTupleStruct = SerializeVec;
    type SerializeTupleVariant = SerializeVec;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeMap;
    type SerializeStructVariant = SerializeMap;

    fn serialize_bool(self, v: bool) -> Result<Value> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value> {
        Ok(Value::Integer(i64::from(v)))
    }

    fn serialize_i16(self, v: i16) -> Result<Value> {
        Ok(Value::Integer(i64::from(v)))
    }

    fn serialize_i32(self, v: i32) -> Result<Value> {
        Ok(Value::Integer(i64::from(v)))
    }

    fn serialize_i64(self, v: i64) -> Result<Value> {
        Ok(Value::Integer(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value> {
        Ok(Value::Integer(i64::from(v)))
    }

    fn serialize_u16(self, v: u16) -> Result<Value> {
        Ok(Value::Integer(i64::from(v)))
    }

    fn serialize_u32(self, v: u32) -> Result<Value> {
        Ok(Value::Integer(i64::from(v)))
    }

    fn serialize_u64(self, v: u64) -> Result<Value> {
        i64::try_from(v).map(Value::Integer).map_err(|_| {
            Error::UnsupportedType(format!("integer {} does not fit in i64", v))
        })
    }

    fn serialize_f32(self, v: f32) -> Result<Value> {
        Ok(Value::Float(f64::from(v)))
    }

    fn serialize_f64(self, v: f64) -> Result<Value> {
        Ok(Value::Float(v))
    }

    fn serialize_char(self, v: char) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_str(self, v: &str) -> Result<Value> {
        Ok(Value::String(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value> {
        Ok(Value::Array(
            v.iter().map(|&b| Value::Integer(i64::from(b))).collect(),
        ))
    }

    fn serialize_none(self) -> Result<Value> {
        Err(Error::UnsupportedNone)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value> {
        Err(Error::unsupported_type("unit"))
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Value> {
        Err(Error::UnsupportedType(format!("unit struct {}", name)))
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value> {
        Ok(Value::String(variant.to_string()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value>
    where
        T: ?Sized + Serialize,
    {
        let mut table = Table::with_capacity(1);
        table.insert(variant.to_string(), to_value(value)?);
        Ok(Value::Table(table))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len.unwrap_or(0), None))
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, None))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, None))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeVec> {
        Ok(SerializeVec::new(len, Some(variant)))
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<SerializeMap> {
        Ok(SerializeMap::new(None))
    }

    fn serialize_struct(self, name: &'static str, _len: usize) -> Result<SerializeMap> {
        let mut map = SerializeMap::new(None);
        map.datetime = name == datetime::NAME;
        Ok(map)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        _len: usize,
    ) -> Result<SerializeMap> {
        Ok(SerializeMap::new(Some(variant)))
    }
}

/// Wraps `value` as `{ variant = value }` when serializing an enum variant.
fn tag_variant(variant: Option<&'static str>, value: Value) -> Value {
    match variant {
        Some(name) => {
            let mut table = Table::with_capacity(1);
            table.insert(name.to_string(), value);
            Value::Table(table)
        }
        None => value,
    }
}

impl SerializeVec {
    fn new(capacity: usize, variant: Option<&'static str>) -> Self {
        SerializeVec {
            vec: Vec::with_capacity(capacity),
            variant,
        }
    }

    fn push<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<()> {
        self.vec.push(to_value(value)?);
        Ok(())
    }

    fn finish(self) -> Value {
        tag_variant(self.variant, Value::Array(self.vec))
    }
}

impl SerializeMap {
    fn new(variant: Option<&'static str>) -> Self {
        SerializeMap {
            map: Table::new(),
            current_key: None,
            variant,
            datetime: false,
        }
    }

    /// Inserts `key`, skipping values that serialize to nothing (`None`).
    fn insert<T: ?Sized + Serialize>(&mut self, key: String, value: &T) -> Result<()> {
        match to_value(value) {
            Ok(value) => {
                self.map.insert(key, value);
                Ok(())
            }
            Err(Error::UnsupportedNone) => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn finish(self) -> Value {
        tag_variant(self.variant, Value::Table(self.map))
    }
}

impl ser::SerializeSeq for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SerializeVec {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.push(value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        match to_value(key)? {
            Value::String(s) => {
                self.current_key = Some(s);
                Ok(())
            }
            Value::Integer(i) => {
                self.current_key = Some(i.to_string());
                Ok(())
            }
            other => Err(Error::UnsupportedType(format!(
                "{} as a table key",
                other.type_str()
            ))),
        }
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .current_key
            .take()
            .ok_or_else(|| Error::custom("serialize_value called without serialize_key"))?;
        self.insert(key, value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

impl ser::SerializeStruct for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.insert(key.to_string(), value)
    }

    fn end(mut self) -> Result<Value> {
        if !self.datetime {
            return Ok(self.finish());
        }
        match self.map.remove(datetime::FIELD) {
            Some(Value::String(text)) => datetime::parse(&text),
            _ => Err(Error::custom("malformed date-time value")),
        }
    }
}

impl ser::SerializeStructVariant for SerializeMap {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<()>
    where
        T: ?Sized + Serialize,
    {
        self.insert(key.to_string(), value)
    }

    fn end(self) -> Result<Value> {
        Ok(self.finish())
    }
}

/// Converts any `Serialize` type into a [`Value`].
pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    value.serialize(ValueSerializer)
}
