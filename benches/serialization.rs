use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde::{Deserialize, Serialize};
use serde_tomlet::{from_str, parse, to_string, to_string_pretty};

#[derive(Serialize, Deserialize, Clone)]
struct User {
    id: u32,
    name: String,
    email: String,
    active: bool,
}

#[derive(Serialize, Deserialize, Clone)]
struct Product {
    sku: String,
    name: String,
    price: f64,
    quantity: u32,
}

#[derive(Serialize, Deserialize, Clone)]
struct Catalog {
    products: Vec<Product>,
}

#[derive(Serialize, Deserialize, Clone)]
struct NestedData {
    id: u32,
    metadata: Metadata,
    tags: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone)]
struct Metadata {
    created: String,
    updated: String,
    version: u32,
}

const CARGO_MANIFEST: &str = r#"
[package]
name = "demo"
version = "0.1.0"
edition = "2021"
authors = ["Tom Preston-Werner <tom@example.com>"]

[dependencies]
serde = { version = "1.0", features = ["derive"] }
chrono = { version = "0.4", default-features = false, features = ["std"] }

[profile.release]
lto = true
codegen-units = 1

[[bin]]
name = "demo"
path = "src/main.rs"

[[bin]]
name = "tool"
path = "src/tool.rs"
"#;

fn catalog(size: u32) -> Catalog {
    Catalog {
        products: (0..size)
            .map(|i| Product {
                sku: format!("SKU{}", i),
                name: format!("Product {}", i),
                price: 9.99 + f64::from(i),
                quantity: i,
            })
            .collect(),
    }
}

fn nested() -> NestedData {
    NestedData {
        id: 42,
        metadata: Metadata {
            created: "2023-01-01T00:00:00Z".to_string(),
            updated: "2023-12-31T23:59:59Z".to_string(),
            version: 3,
        },
        tags: vec![
            "important".to_string(),
            "verified".to_string(),
            "production".to_string(),
        ],
    }
}

fn benchmark_serialize_simple(c: &mut Criterion) {
    let user = User {
        id: 123,
        name: "Alice".to_string(),
        email: "alice@example.com".to_string(),
        active: true,
    };

    c.bench_function("serialize_simple_struct", |b| {
        b.iter(|| to_string(black_box(&user)))
    });
}

fn benchmark_deserialize_simple(c: &mut Criterion) {
    let toml = "id = 123\nname = \"Alice\"\nemail = \"alice@example.com\"\nactive = true\n";

    c.bench_function("deserialize_simple_struct", |b| {
        b.iter(|| from_str::<User>(black_box(toml)))
    });
}

fn benchmark_parse_manifest(c: &mut Criterion) {
    c.bench_function("parse_manifest", |b| {
        b.iter(|| parse(black_box(CARGO_MANIFEST)))
    });
}

fn benchmark_serialize_table_array(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize_table_array");

    for size in [10, 50, 100, 500].iter() {
        let data = catalog(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| to_string(black_box(&data)))
        });
    }
    group.finish();
}

fn benchmark_deserialize_table_array(c: &mut Criterion) {
    let mut group = c.benchmark_group("deserialize_table_array");

    for size in [10, 50, 100, 500].iter() {
        let toml = to_string(&catalog(*size)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &toml, |b, toml| {
            b.iter(|| from_str::<Catalog>(black_box(toml)))
        });
    }
    group.finish();
}

fn benchmark_nested(c: &mut Criterion) {
    let data = nested();
    let toml = to_string(&data).unwrap();

    c.bench_function("serialize_nested_struct", |b| {
        b.iter(|| to_string(black_box(&data)))
    });
    c.bench_function("serialize_nested_struct_pretty", |b| {
        b.iter(|| to_string_pretty(black_box(&data)))
    });
    c.bench_function("deserialize_nested_struct", |b| {
        b.iter(|| from_str::<NestedData>(black_box(&toml)))
    });
}

fn benchmark_strings(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_strings");

    group.bench_function("basic", |b| {
        b.iter(|| parse(black_box("s = \"plain text with \\u00e9 and \\t escapes\"")))
    });
    group.bench_function("literal", |b| {
        b.iter(|| parse(black_box("s = 'C:\\Users\\nodejs\\templates'")))
    });
    group.bench_function("multiline", |b| {
        b.iter(|| {
            parse(black_box(
                "s = \"\"\"\nThe quick brown \\\n\n  fox jumps over \\\n    the lazy dog.\"\"\"",
            ))
        })
    });

    group.finish();
}

fn benchmark_comparison_with_json(c: &mut Criterion) {
    let data = catalog(50);

    let mut group = c.benchmark_group("comparison");

    group.bench_function("toml_serialize", |b| {
        b.iter(|| serde_tomlet::to_string(black_box(&data)))
    });

    group.bench_function("json_serialize", |b| {
        b.iter(|| serde_json::to_string(black_box(&data)))
    });

    let toml_str = serde_tomlet::to_string(&data).unwrap();
    let json_str = serde_json::to_string(&data).unwrap();

    group.bench_function("toml_deserialize", |b| {
        b.iter(|| serde_tomlet::from_str::<Catalog>(black_box(&toml_str)))
    });

    group.bench_function("json_deserialize", |b| {
        b.iter(|| serde_json::from_str::<Catalog>(black_box(&json_str)))
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_serialize_simple,
    benchmark_deserialize_simple,
    benchmark_parse_manifest,
    benchmark_serialize_table_array,
    benchmark_deserialize_table_array,
    benchmark_nested,
    benchmark_strings,
    benchmark_comparison_with_json
);
criterion_main!(benches);
