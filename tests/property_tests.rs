//! Property-based tests for the round-trip guarantee: parsing the text a
//! serializer writes yields the tree that was written.
//!
//! TOML documents are tables, so scalars and collections are wrapped in a
//! struct or a table before they are written.

use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use serde_tomlet::{
    from_str, parse, to_string, to_toml_string_with_options, CollectionStyle, ListWrap,
    SerializerOptions, Table, Value,
};

fn roundtrip<T: Serialize + for<'de> Deserialize<'de> + PartialEq + std::fmt::Debug>(
    value: &T,
) -> bool {
    match to_string(value) {
        Ok(serialized) => match from_str::<T>(&serialized) {
            Ok(deserialized) => *value == deserialized,
            Err(e) => {
                eprintln!("Deserialize failed: {}", e);
                eprintln!("Serialized was: {}", serialized);
                false
            }
        },
        Err(e) => {
            eprintln!("Serialize failed: {}", e);
            false
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Wrapper<T> {
    value: T,
}

fn text() -> impl Strategy<Value = String> {
    prop_oneof!["\\PC*", "[a-z \n\"'\\\\]{0,12}"]
}

fn date() -> impl Strategy<Value = NaiveDate> {
    (0i32..=9999, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

fn time() -> impl Strategy<Value = NaiveTime> {
    (0u32..24, 0u32..60, 0u32..60, 0u32..1_000_000_000)
        .prop_map(|(h, m, s, n)| NaiveTime::from_hms_nano_opt(h, m, s, n).unwrap())
}

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        text().prop_map(Value::String),
        any::<i64>().prop_map(Value::Integer),
        any::<f64>()
            .prop_filter("NaN never compares equal", |f| !f.is_nan())
            .prop_map(Value::Float),
        any::<bool>().prop_map(Value::Bool),
        date().prop_map(Value::LocalDate),
        time().prop_map(Value::LocalTime),
        (date(), time()).prop_map(|(d, t)| Value::LocalDateTime(NaiveDateTime::new(d, t))),
        (date(), time(), -1439i32..=1439).prop_map(|(d, t, minutes)| {
            let offset = FixedOffset::east_opt(minutes * 60).unwrap();
            let local = offset
                .from_local_datetime(&NaiveDateTime::new(d, t))
                .single()
                .unwrap();
            Value::OffsetDateTime(local)
        }),
    ]
}

fn value() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(3, 32, 5, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
            prop::collection::vec((text(), inner), 0..5)
                .prop_map(|entries| Value::Table(entries.into_iter().collect())),
        ]
    })
}

fn document() -> impl Strategy<Value = Table> {
    prop::collection::vec((text(), value()), 0..6).prop_map(|entries| entries.into_iter().collect())
}

fn options() -> impl Strategy<Value = SerializerOptions> {
    let style = prop_oneof![Just(CollectionStyle::Inline), Just(CollectionStyle::Header)];
    let wrap = prop_oneof![
        Just(ListWrap::SingleLine),
        Just(ListWrap::MultiLine),
        Just(ListWrap::Adaptive)
    ];
    (style.clone(), style, wrap, 0usize..5).prop_map(|(tables, lists, wrap, indent)| {
        SerializerOptions::new()
            .with_table_style(tables)
            .with_list_style(lists)
            .with_list_wrap(wrap)
            .with_indent(indent)
    })
}

proptest! {
    #[test]
    fn prop_i64(n in any::<i64>()) {
        let ok = roundtrip(&Wrapper { value: n });
        prop_assert!(ok);
    }

    #[test]
    fn prop_u32(n in any::<u32>()) {
        let ok = roundtrip(&Wrapper { value: n });
        prop_assert!(ok);
    }

    #[test]
    fn prop_bool(b in any::<bool>()) {
        let ok = roundtrip(&Wrapper { value: b });
        prop_assert!(ok);
    }

    #[test]
    fn prop_string(s in text()) {
        let ok = roundtrip(&Wrapper { value: s });
        prop_assert!(ok);
    }

    #[test]
    fn prop_vec_i32(v in prop::collection::vec(any::<i32>(), 0..20)) {
        let ok = roundtrip(&Wrapper { value: v });
        prop_assert!(ok);
    }

    #[test]
    fn prop_option_i32(opt in proptest::option::of(any::<i32>())) {
        let ok = roundtrip(&Wrapper { value: opt });
        prop_assert!(ok);
    }

    #[test]
    fn prop_tuple_i32_bool(t in (any::<i32>(), any::<bool>())) {
        let ok = roundtrip(&Wrapper { value: t });
        prop_assert!(ok);
    }

    #[test]
    fn prop_document_roundtrip(doc in document(), options in options()) {
        let text = to_toml_string_with_options(&Value::Table(doc.clone()), options).unwrap();
        let parsed = parse(&text);
        prop_assert_eq!(parsed, Ok(doc), "document was:\n{}", text);
    }
}
