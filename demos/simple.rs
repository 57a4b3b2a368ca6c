//! Basic table literal serialization and deserialization.
//!
//! Run with: cargo run --example simple

use serde::{Deserialize, Serialize};
use serde_lua_table::{from_str, to_string, to_string_pretty};
use std::error::Error;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct User {
    id: u32,
    name: String,
    email: String,
    nickname: Option<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let users = vec![
        User {
            id: 42,
            name: "Alice Johnson".to_string(),
            email: "alice@example.com".to_string(),
            nickname: Some("ali".to_string()),
        },
        User {
            id: 43,
            name: "Bob Smith".to_string(),
            email: "bob@example.com".to_string(),
            nickname: None,
        },
    ];

    let compact = to_string(&users)?;
    println!("Compact:\n{}\n", compact);

    let pretty = to_string_pretty(&users)?;
    println!("Pretty:\n{}\n", pretty);

    let users_back: Vec<User> = from_str(&pretty)?;
    assert_eq!(users, users_back);
    println!("✓ Round-trip successful");

    // Literals written by hand parse the same way.
    let handwritten = r#"
        -- saved by the game client
        {
            { id = 42, name = 'Alice Johnson', email = "alice@example.com", nickname = 'ali' },
            { id = 0x2B, name = "Bob Smith", email = "bob@example.com", nickname = nil },
        }
    "#;
    let parsed: Vec<User> = from_str(handwritten)?;
    assert_eq!(users, parsed);
    println!("✓ Hand-written literal matches");

    Ok(())
}
