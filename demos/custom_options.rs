//! Customizing TOML output with SerializerOptions.
//!
//! Run with: cargo run --example custom_options

use serde::{Deserialize, Serialize};
use serde_tomlet::{to_string_with_options, CollectionStyle, ListWrap, SerializerOptions};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize)]
struct Config {
    name: String,
    version: String,
    server: Server,
    rows: Vec<DataRow>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Server {
    host: String,
    ports: Vec<u16>,
    limits: Limits,
}

#[derive(Debug, Serialize, Deserialize)]
struct Limits {
    connections: u32,
    timeout_secs: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct DataRow {
    id: u32,
    value: String,
    active: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    let config = Config {
        name: "MyApp".to_string(),
        version: "1.0.0".to_string(),
        server: Server {
            host: "0.0.0.0".to_string(),
            ports: vec![8000, 8001, 8002],
            limits: Limits {
                connections: 512,
                timeout_secs: 2.5,
            },
        },
        rows: vec![
            DataRow {
                id: 1,
                value: "test".to_string(),
                active: true,
            },
            DataRow {
                id: 2,
                value: "prod".to_string(),
                active: false,
            },
        ],
    };

    // Default: [section] headers, dotted keys, [[array]] tables
    println!("Default:");
    println!("{}\n", serde_tomlet::to_string(&config)?);

    // Every array on its own lines
    println!("Pretty:");
    println!("{}\n", serde_tomlet::to_string_pretty(&config)?);

    // Inline tables and inline arrays of tables
    println!("Compact:");
    println!(
        "{}\n",
        to_string_with_options(&config, SerializerOptions::compact())?
    );

    // Headers for tables, inline arrays of tables, 4-space indent
    println!("Mixed:");
    let mixed = SerializerOptions::new()
        .with_list_style(CollectionStyle::Inline)
        .with_list_wrap(ListWrap::MultiLine)
        .with_indent(4);
    println!("{}", to_string_with_options(&config, mixed)?);

    Ok(())
}
