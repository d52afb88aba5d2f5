//! Carries date/time values through serde.
//!
//! serde's data model has no date/time type, so a date/time travels as a
//! one-field struct named [`NAME`] whose field [`FIELD`] holds the TOML text.
//! [`ValueSerializer`](crate::ValueSerializer) and the `Value` visitor
//! recognise that shape and rebuild the typed variant; every other consumer
//! sees an ordinary struct.

use crate::lexer::Cursor;
use crate::ser::{format_date, format_local_datetime, format_offset_datetime, format_time};
use crate::{Error, Result, Value};
use serde::ser::SerializeStruct;

pub(crate) const NAME: &str = "$__serde_tomlet_private_datetime";
pub(crate) const FIELD: &str = "$__serde_tomlet_private_datetime";

/// The TOML text of a date/time value, or `None` for other variants.
pub(crate) fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::LocalDate(d) => Some(format_date(d)),
        Value::LocalTime(t) => Some(format_time(t)),
        Value::LocalDateTime(dt) => Some(format_local_datetime(dt)),
        Value::OffsetDateTime(dt) => Some(format_offset_datetime(dt)),
        _ => None,
    }
}

pub(crate) fn serialize<S>(text: &str, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let mut s = serializer.serialize_struct(NAME, 1)?;
    s.serialize_field(FIELD, text)?;
    s.end()
}

/// Parses the text of a date/time value back into its typed variant.
pub(crate) fn parse(text: &str) -> Result<Value> {
    let mut cursor = Cursor::new(text);
    match cursor.datetime()? {
        Some(value) if cursor.at_end() => Ok(value),
        _ => Err(Error::custom(format!("invalid date-time `{}`", text))),
    }
}
