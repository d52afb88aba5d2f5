use serde::{Deserialize, Serialize};
use serde_tomlet::{
    from_path, from_str, from_value, parse, to_string, to_string_pretty, to_string_with_options,
    to_value, CollectionStyle, Error, ListWrap, SerializerOptions, Value,
};
use std::collections::BTreeMap;

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct User {
    id: u32,
    name: String,
    active: bool,
    tags: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Product {
    sku: String,
    price: f64,
    quantity: u32,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Order {
    order_id: u32,
    customer: User,
    items: Vec<Product>,
    total: f64,
}

fn order() -> Order {
    Order {
        order_id: 12345,
        customer: User {
            id: 123,
            name: "Alice".to_string(),
            active: true,
            tags: vec!["vip".to_string()],
        },
        items: vec![
            Product {
                sku: "WIDGET-001".to_string(),
                price: 29.99,
                quantity: 2,
            },
            Product {
                sku: "GADGET-002".to_string(),
                price: 49.99,
                quantity: 1,
            },
        ],
        total: 109.97,
    }
}

fn assert_roundtrip<T>(value: &T)
where
    T: Serialize + for<'de> Deserialize<'de> + PartialEq + std::fmt::Debug,
{
    let text = to_string(value).unwrap();
    let back: T = from_str(&text).unwrap();
    assert_eq!(value, &back, "document was:\n{}", text);
}

#[test]
fn test_simple_struct() {
    let user = User {
        id: 123,
        name: "Alice".to_string(),
        active: true,
        tags: vec!["admin".to_string(), "developer".to_string()],
    };

    let text = to_string(&user).unwrap();
    println!("User TOML:\n{}", text);
    assert_eq!(
        text,
        "id = 123\nname = \"Alice\"\nactive = true\ntags = [\"admin\", \"developer\"]\n"
    );

    let user_back: User = from_str(&text).unwrap();
    assert_eq!(user, user_back);
}

#[test]
fn test_nested_struct_layout() {
    let text = to_string(&order()).unwrap();
    println!("Order TOML:\n{}", text);
    assert_eq!(
        text,
        "order_id = 12345\ntotal = 109.97\n\n\
         [customer]\nid = 123\nname = \"Alice\"\nactive = true\ntags = [\"vip\"]\n\n\
         [[items]]\nsku = \"WIDGET-001\"\nprice = 29.99\nquantity = 2\n\n\
         [[items]]\nsku = \"GADGET-002\"\nprice = 49.99\nquantity = 1\n"
    );
    let order_back: Order = from_str(&text).unwrap();
    assert_eq!(order(), order_back);
}

#[test]
fn test_every_layout_roundtrips() {
    let layouts = [
        SerializerOptions::new(),
        SerializerOptions::pretty(),
        SerializerOptions::compact(),
        SerializerOptions::new().with_table_style(CollectionStyle::Inline),
        SerializerOptions::new().with_list_style(CollectionStyle::Inline),
        SerializerOptions::new()
            .with_list_wrap(ListWrap::MultiLine)
            .with_indent(4),
    ];
    for options in layouts {
        let text = to_string_with_options(&order(), options.clone()).unwrap();
        let back: Order = from_str(&text)
            .unwrap_or_else(|e| panic!("{:?} produced unparsable output ({}):\n{}", options, e, text));
        assert_eq!(order(), back);
    }
}

#[test]
fn test_inline_list_style() {
    let options = SerializerOptions::new()
        .with_list_style(CollectionStyle::Inline)
        .with_list_wrap(ListWrap::SingleLine);
    let text = to_string_with_options(&order(), options).unwrap();
    assert!(text.contains(
        "items = [{ sku = \"WIDGET-001\", price = 29.99, quantity = 2 }, \
         { sku = \"GADGET-002\", price = 49.99, quantity = 1 }]\n"
    ));
}

#[test]
fn test_option_fields() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Settings {
        name: String,
        nickname: Option<String>,
        retries: Option<u8>,
    }

    let settings = Settings {
        name: "svc".to_string(),
        nickname: None,
        retries: Some(3),
    };
    let text = to_string(&settings).unwrap();
    assert_eq!(text, "name = \"svc\"\nretries = 3\n");
    assert_roundtrip(&settings);
}

#[test]
fn test_maps_and_enums() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    enum Level {
        Low,
        Custom(u8),
        Range { min: i64, max: i64 },
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Limits {
        levels: BTreeMap<String, Level>,
    }

    let mut levels = BTreeMap::new();
    levels.insert("a".to_string(), Level::Low);
    levels.insert("b".to_string(), Level::Custom(7));
    levels.insert("c".to_string(), Level::Range { min: -1, max: 10 });
    assert_roundtrip(&Limits { levels });
}

#[test]
fn test_special_strings_roundtrip() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Texts {
        items: Vec<String>,
        nested: BTreeMap<String, String>,
    }

    let samples = [
        "",
        "plain",
        "with \"double\" quotes",
        "with 'single' quotes",
        "both ' and \"",
        "back\\slash",
        "multi\nline",
        "multi\nline ending in quote\"",
        "crlf\r\nline",
        "\"\"\" and '''",
        "tab\there",
        "unicode ✓ ünïcödé",
        "\n leading newline",
    ];
    let texts = Texts {
        items: samples.iter().map(|s| s.to_string()).collect(),
        nested: samples
            .iter()
            .enumerate()
            .map(|(i, s)| (format!("key {}", i), s.to_string()))
            .collect(),
    };
    assert_roundtrip(&texts);
    let text = to_string_pretty(&texts).unwrap();
    assert_eq!(from_str::<Texts>(&text).unwrap(), texts);
}

#[test]
fn test_unrepresentable_values() {
    #[derive(Serialize)]
    struct Big {
        n: u64,
    }
    assert!(matches!(
        to_string(&Big { n: u64::MAX }),
        Err(Error::UnsupportedType(_))
    ));

    assert!(matches!(to_string(&42), Err(Error::RootNotTable(_))));

    #[derive(Serialize)]
    struct Control {
        s: String,
    }
    assert_eq!(
        to_string(&Control { s: "nul\u{0}".to_string() }),
        Err(Error::DisallowedCharacter('\u{0}'))
    );
}

#[test]
fn test_value_bridge() {
    let value = to_value(&order()).unwrap();
    assert_eq!(
        value.get("customer").and_then(|c| c.get("name")),
        Some(&Value::from("Alice"))
    );
    let back: Order = from_value(value).unwrap();
    assert_eq!(back, order());
}

#[test]
fn test_deserialize_into_value() {
    let value: Value = from_str("a = 1\nb = [true, 2.5]\n[c]\nd = 'x'").unwrap();
    assert_eq!(value.get("a"), Some(&Value::Integer(1)));
    assert_eq!(
        value.get("b"),
        Some(&Value::Array(vec![Value::Bool(true), Value::Float(2.5)]))
    );
    assert_eq!(
        value.get("c").and_then(|c| c.get("d")),
        Some(&Value::from("x"))
    );
}

#[test]
fn test_parse_then_typed_access() {
    let table = parse("[server]\nhost = \"0.0.0.0\"\nport = 8080\n").unwrap();
    let server = table.get("server").unwrap();
    assert_eq!(server.get("host").and_then(Value::as_str), Some("0.0.0.0"));
    assert_eq!(server.get("port").and_then(Value::as_integer), Some(8080));
}

#[test]
fn test_from_path() {
    let path = std::env::temp_dir().join(format!("serde_tomlet_{}.toml", std::process::id()));
    std::fs::write(&path, to_string(&order()).unwrap()).unwrap();
    let back: Order = from_path(&path).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(back, order());

    let missing: Result<Order, Error> = from_path(path.with_extension("missing"));
    assert!(matches!(missing, Err(Error::Io(_))));
}

#[test]
fn test_dates_keep_their_type() {
    let src = "d = 1979-05-27\nt = 1979-05-27T07:32:00Z\n";
    let value: Value = from_str(src).unwrap();
    assert_eq!(value, Value::Table(parse(src).unwrap()));
    assert_eq!(to_string(&value).unwrap(), src);

    let bridged = to_value(&value).unwrap();
    assert_eq!(bridged, value);
    assert_eq!(from_value::<Value>(bridged).unwrap(), value);

    #[derive(Deserialize, Debug, PartialEq)]
    struct Texts {
        d: String,
        t: String,
    }
    assert_eq!(
        from_str::<Texts>(src).unwrap(),
        Texts {
            d: "1979-05-27".to_string(),
            t: "1979-05-27T07:32:00Z".to_string(),
        }
    );
}

#[test]
fn test_chrono_fields() {
    use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Release {
        day: NaiveDate,
        at: NaiveTime,
        built: NaiveDateTime,
        published: DateTime<FixedOffset>,
    }

    let src = "day = 1979-05-27\nat = 07:32:00\nbuilt = 1979-05-27T07:32:00\n\
               published = 1979-05-27T00:32:00-07:00\n";
    let release: Release = from_str(src).unwrap();
    let day = NaiveDate::from_ymd_opt(1979, 5, 27).unwrap();
    let at = NaiveTime::from_hms_opt(7, 32, 0).unwrap();
    assert_eq!(release.day, day);
    assert_eq!(release.at, at);
    assert_eq!(release.built, day.and_time(at));
    assert_eq!(
        release.published,
        DateTime::parse_from_rfc3339("1979-05-27T00:32:00-07:00").unwrap()
    );

    // chrono writes its types as strings, which read back the same way.
    assert_roundtrip(&release);
}

#[test]
fn test_deserialize_errors() {
    #[derive(Deserialize, Debug)]
    #[allow(dead_code)]
    struct Strict {
        port: u16,
    }
    assert!(from_str::<Strict>("port = 70000").is_err());
    assert!(from_str::<Strict>("port = \"80\"").is_err());
    assert!(from_str::<Strict>("").is_err());
    assert!(matches!(
        from_str::<Strict>("port = 1\nport = 2"),
        Err(Error::AlreadyDefined { line: 2, .. })
    ));
}
