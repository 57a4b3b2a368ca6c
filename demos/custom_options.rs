//! Customizing output with LuaOptions.
//!
//! Run with: cargo run --example custom_options

use serde::Serialize;
use serde_lua_table::{to_string, to_string_with_options, LuaOptions};
use std::error::Error;

#[derive(Debug, Serialize)]
struct Config {
    name: String,
    version: String,
    debug: bool,
    #[serde(rename = "end")]
    end_marker: Option<u32>,
}

#[derive(Debug, Serialize)]
struct Deployment {
    config: Config,
    replicas: Vec<u16>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let deployment = Deployment {
        config: Config {
            name: "MyApp".to_string(),
            version: "1.0.0".to_string(),
            debug: true,
            end_marker: None,
        },
        replicas: vec![1, 2, 3],
    };

    println!("Default (single line):");
    println!("{}\n", to_string(&deployment)?);

    println!("Indented:");
    println!("{}\n", to_string_with_options(&deployment, LuaOptions::pretty())?);

    // Every table opens with a __type entry naming the Rust type it came from.
    println!("With type markers:");
    let typed = LuaOptions::pretty().with_serialize_type(true);
    println!("{}\n", to_string_with_options(&deployment, typed)?);

    // Each record field is preceded by a comment naming its declared type.
    println!("Markup:");
    println!("{}\n", to_string_with_options(&deployment, LuaOptions::markup())?);

    // Nesting beyond the limit fails instead of producing huge output.
    let shallow = LuaOptions::new().with_max_depth(Some(1));
    match to_string_with_options(&deployment, shallow) {
        Ok(text) => println!("unexpected success: {}", text),
        Err(e) => println!("Depth limit: {}", e),
    }

    Ok(())
}
