/// Builds a [`Value`](crate::Value) from a JSON-like literal.
///
/// Tables use `{ "key": value }`, arrays use `[a, b]`, and any other
/// single token tree is converted with `Value::from`. Negative numbers and
/// other multi-token expressions must be wrapped in parentheses.
///
/// ```rust
/// use serde_tomlet::{toml, Value};
///
/// let doc = toml!({
///     "title": "example",
///     "ports": [8000, 8001],
///     "offset": (-5),
///     "owner": { "name": "Tom", "active": true }
/// });
/// assert_eq!(doc.get("offset"), Some(&Value::Integer(-5)));
/// ```
#[macro_export]
macro_rules! toml {
    (true) => {
        $crate::Value::Bool(true)
    };

    (false) => {
        $crate::Value::Bool(false)
    };

    ([]) => {
        $crate::Value::Array(vec![])
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Array(vec![$($crate::toml!($elem)),*])
    };

    ({}) => {
        $crate::Value::Table($crate::Table::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut table = $crate::Table::new();
        $(
            table.insert($key.to_string(), $crate::toml!($value));
        )*
        $crate::Value::Table(table)
    }};

    ($e:expr) => {
        $crate::Value::from($e)
    };
}

#[cfg(test)]
mod tests {
    use crate::{Table, Value};

    #[test]
    fn test_toml_macro_primitives() {
        assert_eq!(toml!(true), Value::Bool(true));
        assert_eq!(toml!(false), Value::Bool(false));
        assert_eq!(toml!(42), Value::Integer(42));
        assert_eq!(toml!(3.5), Value::Float(3.5));
        assert_eq!(toml!("hello"), Value::String("hello".to_string()));
        assert_eq!(toml!((-7)), Value::Integer(-7));
    }

    #[test]
    fn test_toml_macro_arrays() {
        assert_eq!(toml!([]), Value::Array(vec![]));
        assert_eq!(
            toml!([1, "two", [3]]),
            Value::Array(vec![
                Value::Integer(1),
                Value::from("two"),
                Value::Array(vec![Value::Integer(3)])
            ])
        );
    }

    #[test]
    fn test_toml_macro_tables() {
        assert_eq!(toml!({}), Value::Table(Table::new()));

        let table = toml!({
            "name": "Alice",
            "age": 30,
        });
        let table = table.as_table().unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("name"), Some(&Value::from("Alice")));
        assert_eq!(table.get("age"), Some(&Value::Integer(30)));
    }
}
