//! # serde_tomlet
//!
//! A TOML 1.0 codec with Serde support: parse documents into a [`Value`]
//! tree or straight into your own types, and write them back out.
//!
//! ## Key Features
//!
//! - **Complete TOML 1.0 grammar**: all four string forms, integers in four
//!   bases, `inf`/`nan`, and the four date/time shapes
//! - **Strict table rules**: redefined keys, reopened tables and extended
//!   inline collections are rejected with the offending line and key path
//! - **Serde Compatible**: works with `#[derive(Serialize, Deserialize)]`
//! - **Configurable output**: header or inline syntax for tables and arrays
//!   of tables, and three array wrapping policies
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! serde_tomlet = "0.1"
//! serde = { version = "1.0", features = ["derive"] }
//! ```
//!
//! ### Basic Serialization and Deserialization
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use serde_tomlet::{from_str, to_string};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! struct Config {
//!     name: String,
//!     port: u16,
//!     features: Vec<String>,
//! }
//!
//! let config = Config {
//!     name: "demo".to_string(),
//!     port: 8080,
//!     features: vec!["tls".to_string()],
//! };
//!
//! let text = to_string(&config).unwrap();
//! assert_eq!(text, "name = \"demo\"\nport = 8080\nfeatures = [\"tls\"]\n");
//!
//! let back: Config = from_str(&text).unwrap();
//! assert_eq!(config, back);
//! ```
//!
//! ### Working with Documents Directly
//!
//! ```rust
//! use serde_tomlet::{parse, to_toml_string, Value};
//!
//! let doc = parse(r#"
//! [[fruit]]
//! name = "apple"
//!
//! [[fruit]]
//! name = "banana"
//! "#).unwrap();
//!
//! let fruit = doc.get("fruit").and_then(Value::as_array).unwrap();
//! assert_eq!(fruit.len(), 2);
//!
//! let text = to_toml_string(&Value::Table(doc.clone())).unwrap();
//! assert_eq!(parse(&text).unwrap(), doc);
//! ```
//!
//! ### Dynamic Values with the toml! Macro
//!
//! ```rust
//! use serde_tomlet::toml;
//!
//! let data = toml!({
//!     "name": "Alice",
//!     "tags": ["rust", "serde"]
//! });
//! assert_eq!(data.get("name").and_then(|v| v.as_str()), Some("Alice"));
//! ```
//!
//! ## Logging
//!
//! Parsing and serializing emit `tracing` events: a `debug` event per
//! finished document and a `trace` event per statement applied while
//! building one. Install any `tracing` subscriber to see them.
//!
//! ## Examples
//!
//! See the `demos/` directory:
//!
//! - **`simple.rs`** - round-tripping a config struct
//! - **`custom_options.rs`** - the output layout options side by side
//!
//! Run any example with: `cargo run --example <name>`

mod builder;
mod datetime;
pub mod de;
pub mod error;
mod lexer;
pub mod macros;
pub mod map;
pub mod options;
mod parser;
pub mod ser;
pub mod value;

pub use de::Deserializer;
pub use error::{Error, LexicalError, Result};
pub use map::Table;
pub use options::{CollectionStyle, ListWrap, SerializerOptions};
pub use ser::{to_value, Serializer, ValueSerializer};
pub use value::Value;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io;

/// Parses a TOML document into its root [`Table`].
///
/// # Examples
///
/// ```rust
/// use serde_tomlet::{parse, Value};
///
/// let doc = parse("title = \"TOML\"\n[owner]\nname = \"Tom\"").unwrap();
/// assert_eq!(doc.get("title"), Some(&Value::from("TOML")));
/// assert_eq!(
///     doc.get("owner").and_then(|o| o.get("name")).and_then(Value::as_str),
///     Some("Tom")
/// );
/// ```
///
/// # Errors
///
/// Returns the first lexical, syntax or structural error; each carries the
/// 1-based line it was found on.
pub fn parse(s: &str) -> Result<Table> {
    Deserializer::from_str(s).parse_table()
}

/// Writes a [`Value`] tree as a TOML document with default options.
///
/// # Examples
///
/// ```rust
/// use serde_tomlet::{to_toml_string, toml};
///
/// let text = to_toml_string(&toml!({ "a": { "b": 1 } })).unwrap();
/// assert_eq!(text, "[a]\nb = 1\n");
/// ```
///
/// # Errors
///
/// Returns [`Error::RootNotTable`] if `value` is not a table, and
/// [`Error::DisallowedCharacter`] if a string or key holds a control
/// character TOML cannot carry.
pub fn to_toml_string(value: &Value) -> Result<String> {
    to_toml_string_with_options(value, SerializerOptions::default())
}

/// Writes a [`Value`] tree as a TOML document with custom options.
///
/// # Errors
///
/// See [`to_toml_string`].
pub fn to_toml_string_with_options(value: &Value, options: SerializerOptions) -> Result<String> {
    let mut serializer = Serializer::new(options);
    serializer.serialize_value(value)?;
    Ok(serializer.into_inner())
}

/// Serialize any `T: Serialize` to a TOML string.
///
/// `T` must serialize to a table: a struct, a map, or similar.
///
/// # Examples
///
/// ```rust
/// use serde_tomlet::to_string;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let point = Point { x: 1, y: 2 };
/// assert_eq!(to_string(&point).unwrap(), "x = 1\ny = 2\n");
/// ```
///
/// # Errors
///
/// Returns an error if the value has no TOML representation (e.g. a
/// top-level integer, `()`, or a `u64` above `i64::MAX`).
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, SerializerOptions::default())
}

/// Serialize any `T: Serialize` to a TOML string with every array spread
/// over several lines.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_pretty<T>(value: &T) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_string_with_options(value, SerializerOptions::pretty())
}

/// Serialize any `T: Serialize` to a TOML string with custom options.
///
/// # Examples
///
/// ```rust
/// use serde_tomlet::{to_string_with_options, SerializerOptions};
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// #[derive(Serialize)]
/// struct Shape { origin: Point }
///
/// let shape = Shape { origin: Point { x: 1, y: 2 } };
/// let text = to_string_with_options(&shape, SerializerOptions::compact()).unwrap();
/// assert_eq!(text, "origin = { x = 1, y = 2 }\n");
/// ```
///
/// # Errors
///
/// Returns an error if the value cannot be serialized.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options<T>(value: &T, options: SerializerOptions) -> Result<String>
where
    T: ?Sized + Serialize,
{
    to_toml_string_with_options(&to_value(value)?, options)
}

/// Serialize any `T: Serialize` to a writer as TOML.
///
/// # Examples
///
/// ```rust
/// use serde_tomlet::to_writer;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Point { x: i32, y: i32 }
///
/// let point = Point { x: 1, y: 2 };
/// let mut buffer = Vec::new();
/// to_writer(&mut buffer, &point).unwrap();
/// assert_eq!(buffer, b"x = 1\ny = 2\n");
/// ```
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W, T>(writer: W, value: &T) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    to_writer_with_options(writer, value, SerializerOptions::default())
}

/// Serialize any `T: Serialize` to a writer as TOML with custom options.
///
/// # Errors
///
/// Returns an error if serialization fails or writing to the writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W, T>(
    mut writer: W,
    value: &T,
    options: SerializerOptions,
) -> Result<()>
where
    W: io::Write,
    T: ?Sized + Serialize,
{
    let text = to_string_with_options(value, options)?;
    writer
        .write_all(text.as_bytes())
        .map_err(|e| Error::io(&e.to_string()))?;
    Ok(())
}

/// Deserialize an instance of type `T` from a string of TOML text.
///
/// # Examples
///
/// ```rust
/// use serde_tomlet::from_str;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_str("x = 1\ny = 2").unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if the input is not valid TOML or cannot be deserialized
/// to type `T`. Parse errors carry the line they were found on.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str<'a, T>(s: &'a str) -> Result<T>
where
    T: Deserialize<'a>,
{
    let mut deserializer = Deserializer::from_str(s);
    T::deserialize(&mut deserializer)
}

/// Deserialize an instance of type `T` from an I/O stream of TOML.
///
/// # Examples
///
/// ```rust
/// use serde_tomlet::from_reader;
/// use serde::Deserialize;
/// use std::io::Cursor;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let cursor = Cursor::new(b"x = 1\ny = 2");
/// let point: Point = from_reader(cursor).unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if reading from the reader fails, the input is not valid
/// TOML, or the data cannot be deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R, T>(mut reader: R) -> Result<T>
where
    R: io::Read,
    T: DeserializeOwned,
{
    let mut string = String::new();
    reader
        .read_to_string(&mut string)
        .map_err(|e| Error::io(&e.to_string()))?;
    from_str(&string)
}

/// Deserialize an instance of type `T` from the TOML file at `path`.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read as UTF-8 text, otherwise
/// the same errors as [`from_str`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_path<P, T>(path: P) -> Result<T>
where
    P: AsRef<std::path::Path>,
    T: DeserializeOwned,
{
    let path = path.as_ref();
    let string = std::fs::read_to_string(path)
        .map_err(|e| Error::io(&format!("{}: {}", path.display(), e)))?;
    from_str(&string)
}

/// Deserialize an instance of type `T` from bytes of TOML text.
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8, not valid TOML, or
/// cannot be deserialized to type `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice<'a, T>(v: &'a [u8]) -> Result<T>
where
    T: Deserialize<'a>,
{
    let s = std::str::from_utf8(v).map_err(|e| Error::custom(e.to_string()))?;
    from_str(s)
}

/// Deserialize an instance of type `T` from a [`Value`] tree.
///
/// # Examples
///
/// ```rust
/// use serde_tomlet::{from_value, toml};
/// use serde::Deserialize;
///
/// #[derive(Deserialize, PartialEq, Debug)]
/// struct Point { x: i32, y: i32 }
///
/// let point: Point = from_value(toml!({ "x": 1, "y": 2 })).unwrap();
/// assert_eq!(point, Point { x: 1, y: 2 });
/// ```
///
/// # Errors
///
/// Returns an error if the value does not match the shape of `T`.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_value<T>(value: Value) -> Result<T>
where
    T: DeserializeOwned,
{
    T::deserialize(de::ValueDeserializer::new(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct User {
        id: u32,
        name: String,
        active: bool,
        tags: Vec<String>,
        home: Point,
    }

    fn user() -> User {
        User {
            id: 123,
            name: "Alice".to_string(),
            active: true,
            tags: vec!["admin".to_string(), "user".to_string()],
            home: Point { x: 1, y: 2 },
        }
    }

    #[test]
    fn test_serialize_deserialize_point() {
        let point = Point { x: 1, y: 2 };
        let text = to_string(&point).unwrap();
        let point_back: Point = from_str(&text).unwrap();
        assert_eq!(point, point_back);
    }

    #[test]
    fn test_serialize_deserialize_user() {
        let text = to_string(&user()).unwrap();
        assert_eq!(
            text,
            "id = 123\nname = \"Alice\"\nactive = true\ntags = [\"admin\", \"user\"]\n\n[home]\nx = 1\ny = 2\n"
        );
        let user_back: User = from_str(&text).unwrap();
        assert_eq!(user(), user_back);
    }

    #[test]
    fn test_pretty_printing() {
        let text = to_string_pretty(&user()).unwrap();
        assert!(text.contains("tags = [\n  \"admin\",\n  \"user\",\n]\n"));
        let user_back: User = from_str(&text).unwrap();
        assert_eq!(user(), user_back);
    }

    #[test]
    fn test_custom_options() {
        let options = SerializerOptions::compact();
        let text = to_string_with_options(&user(), options).unwrap();
        assert!(text.ends_with("home = { x = 1, y = 2 }\n"));
        let user_back: User = from_str(&text).unwrap();
        assert_eq!(user(), user_back);
    }

    #[test]
    fn test_to_value() {
        let value = to_value(&Point { x: 1, y: 2 }).unwrap();
        assert_eq!(value.get("x"), Some(&Value::Integer(1)));
        assert_eq!(value.get("y"), Some(&Value::Integer(2)));
        assert_eq!(from_value::<Point>(value).unwrap(), Point { x: 1, y: 2 });
    }

    #[test]
    fn test_top_level_sequence_is_not_a_document() {
        let err = to_string(&vec![1, 2, 3]).unwrap_err();
        assert_eq!(err, Error::RootNotTable("array".to_string()));
    }

    #[test]
    fn test_from_slice_rejects_invalid_utf8() {
        let err = from_slice::<Point>(&[0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, Error::Custom(_)));
    }

    #[test]
    fn test_writer_roundtrip() {
        let mut buffer = Vec::new();
        to_writer(&mut buffer, &user()).unwrap();
        let back: User = from_reader(buffer.as_slice()).unwrap();
        assert_eq!(back, user());
    }
}
