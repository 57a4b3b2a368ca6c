//! Rebuilding typed values from tagged tables.
//!
//! Run with: cargo run --example typed_tables

use serde::Deserialize;
use serde_lua_table::{
    FieldDescriptor, FieldType, LuaFormatter, LuaOptions, LuaType, LuaValue, TypeDescriptor,
    TypeRegistry,
};
use std::collections::HashMap;
use std::error::Error;

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Player {
    name: String,
    level: i64,
    score: f64,
}

impl LuaType for Player {
    fn type_tag() -> String {
        "game.Player".to_string()
    }

    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::record(vec![
            FieldDescriptor::new("name", FieldType::String),
            FieldDescriptor::new("level", FieldType::Integer),
            FieldDescriptor::new("score", FieldType::Float),
        ])
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let registry = TypeRegistry::new()
        .with_type::<Player>()
        .with_type::<HashMap<String, i64>>();
    let formatter = LuaFormatter::new(
        LuaOptions::pretty()
            .with_serialize_type(true)
            .with_deserialize_type(true),
        registry,
    );

    // Field values are converted to their declared types; unknown entries are dropped.
    let input = br#"{ __type = "game.Player", name = "ada", level = "7", score = 12, note = "ignored" }"#;
    let value = formatter.decode(input)?;
    println!("Reconstructed: {:?}", value);

    let player: Player = formatter.decode_into(input)?;
    println!("As a Rust struct: {:?}", player);

    // A table without a tag can be decoded as a registered type directly.
    let value = formatter.decode_as(b"{ name = 'bob' }", "game.Player")?;
    println!("Defaults filled in: level = {:?}", value.get("level"));

    // Serialized output carries tags that the same formatter reads back.
    let mut inventory = HashMap::new();
    inventory.insert("potion".to_string(), 3i64);
    let text = formatter.encode(&inventory)?;
    println!("\nEncoded:\n{}", text);
    let back = formatter.decode_str(&text)?;
    println!("Decoded potion count: {:?}", back.get("potion").and_then(LuaValue::as_i64));

    Ok(())
}
