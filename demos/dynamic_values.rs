//! Working with LuaValue and the lua! macro.
//!
//! Run with: cargo run --example dynamic_values

use serde_lua_table::{lua, parse_value, LuaOptions, LuaTable, LuaValue, TableKey};
use std::error::Error;

fn describe(value: &LuaValue, indent: usize) {
    let pad = "  ".repeat(indent);
    match value {
        LuaValue::Table(table) => {
            for (key, value) in table {
                match value {
                    LuaValue::Table(_) => {
                        println!("{}{}:", pad, key);
                        describe(value, indent + 1);
                    }
                    other => println!("{}{} = {} ({})", pad, key, other, other.kind_name()),
                }
            }
        }
        other => println!("{}{} ({})", pad, other, other.kind_name()),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let value = parse_value(
        r#"{
            "first", "second",
            name = "inventory",
            [10] = 0xff,
            ratio = 314.16e-2,
            flags = { true, false, nil },
        }"#,
    )?;

    println!("Parsed structure:");
    describe(&value, 1);

    let table = value.as_table().ok_or("expected a table")?;
    println!("\nsequence part: {} entries", table.sequence_len());
    println!("name: {:?}", value.get("name").and_then(LuaValue::as_str));
    println!("[10]: {:?}", value.get(10).and_then(LuaValue::as_i64));

    // Build values in code.
    let mut scores = LuaTable::new();
    scores.insert("alice", LuaValue::from(10));
    scores.insert(TableKey::from("bob"), LuaValue::from(7.5));
    scores.push(LuaValue::from("positional"));

    let built = lua!({
        "title" => "Scores",
        "tags" => ["a", "b"],
        "empty" => nil,
    });
    let mut combined = built.as_table().cloned().unwrap_or_default();
    combined.insert("scores", LuaValue::Table(scores));

    let combined = LuaValue::Table(combined);
    println!("\nBuilt:\n{}", combined.to_lua_string(&LuaOptions::pretty())?);

    println!("\ntags: {:?}", combined.get("tags"));

    Ok(())
}
