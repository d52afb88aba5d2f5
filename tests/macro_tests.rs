use serde_tomlet::{to_toml_string, toml, Table, Value};

#[test]
fn test_toml_macro_booleans() {
    assert_eq!(toml!(true), Value::Bool(true));
    assert_eq!(toml!(false), Value::Bool(false));
}

#[test]
fn test_toml_macro_numbers() {
    assert_eq!(toml!(42), Value::Integer(42));
    assert_eq!(toml!(3.5), Value::Float(3.5));
    assert_eq!(toml!(-123), Value::Integer(-123));
    assert_eq!(toml!([(-1), 2]), Value::Array(vec![Value::Integer(-1), Value::Integer(2)]));
}

#[test]
fn test_toml_macro_strings() {
    assert_eq!(toml!("hello world"), Value::String("hello world".to_string()));
    assert_eq!(toml!(""), Value::String(String::new()));
}

#[test]
fn test_toml_macro_arrays() {
    assert_eq!(toml!([]), Value::Array(vec![]));
    assert_eq!(
        toml!([1, "hello", true]),
        Value::Array(vec![
            Value::Integer(1),
            Value::String("hello".to_string()),
            Value::Bool(true),
        ])
    );
    assert_eq!(
        toml!([[1, 2], []]),
        Value::Array(vec![
            Value::Array(vec![Value::Integer(1), Value::Integer(2)]),
            Value::Array(vec![]),
        ])
    );
}

#[test]
fn test_toml_macro_tables() {
    assert_eq!(toml!({}), Value::Table(Table::new()));

    let table = toml!({
        "name": "Alice",
        "age": 30
    });
    match table {
        Value::Table(ref t) => {
            assert_eq!(t.len(), 2);
            assert_eq!(t.get("name"), Some(&Value::from("Alice")));
            assert_eq!(t.get("age"), Some(&Value::Integer(30)));
        }
        _ => panic!("Expected table"),
    }
}

#[test]
fn test_toml_macro_preserves_key_order() {
    let table = toml!({ "z": 1, "a": 2, "m": 3 });
    let keys: Vec<&String> = table.as_table().unwrap().keys().collect();
    assert_eq!(keys, ["z", "a", "m"]);
}

#[test]
fn test_toml_macro_nested() {
    let doc = toml!({
        "owner": { "name": "Tom", "tags": ["a", "b"] },
        "products": [
            { "name": "Hammer", "sku": 738594937 },
            { "name": "Nail", "color": "gray" }
        ]
    });
    let owner = doc.get("owner").unwrap();
    assert_eq!(owner.get("name").and_then(Value::as_str), Some("Tom"));
    let products = doc.get("products").and_then(Value::as_array).unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products[1].get("color"), Some(&Value::from("gray")));
}

#[test]
fn test_toml_macro_with_expressions() {
    let port: u16 = 8080;
    let name = String::from("svc");
    let doc = toml!({ "port": port, "name": name, "ratio": (1.0 / 4.0) });
    assert_eq!(doc.get("port"), Some(&Value::Integer(8080)));
    assert_eq!(doc.get("name"), Some(&Value::from("svc")));
    assert_eq!(doc.get("ratio"), Some(&Value::Float(0.25)));
}

#[test]
fn test_toml_macro_into_document() {
    let doc = toml!({
        "title": "example",
        "server": { "ports": [8000, 8001] }
    });
    assert_eq!(
        to_toml_string(&doc).unwrap(),
        "title = \"example\"\n\n[server]\nports = [8000, 8001]\n"
    );
}
