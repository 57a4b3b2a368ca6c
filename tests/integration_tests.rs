use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_lua_table::{
    from_str, from_value, parse_value, to_string, to_string_pretty, to_string_with_options,
    to_value, ErrorKind, LuaOptions, LuaValue,
};
use std::collections::{BTreeMap, HashMap};

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
    note: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
enum Shape {
    Empty,
    Circle(f64),
    Rect { w: u32, h: u32 },
    Pair(i32, i32),
}

fn alice() -> User {
    User {
        id: 123,
        name: "Alice".to_string(),
        active: true,
        tags: vec!["admin".to_string(), "developer".to_string()],
    }
}

fn assert_roundtrip<T>(value: &T)
where
    T: Serialize + for<'de> Deserialize<'de> + PartialEq + std::fmt::Debug,
{
    let text = to_string(value).unwrap();
    let back: T = from_str(&text).unwrap();
    assert_eq!(*value, back, "literal was: {}", text);

    let pretty = to_string_pretty(value).unwrap();
    let back: T = from_str(&pretty).unwrap();
    assert_eq!(*value, back, "literal was: {}", pretty);
}

#[test]
fn test_simple_struct() {
    let text = to_string(&alice()).unwrap();
    assert_eq!(
        text,
        r#"{id=123, name="Alice", active=true, tags={"admin", "developer", }, }"#
    );
    let user_back: User = from_str(&text).unwrap();
    assert_eq!(alice(), user_back);
}

#[test]
fn test_nested_struct() {
    let order = Order {
        order_id: 12345,
        customer: alice(),
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
        note: None,
    };
    assert_roundtrip(&order);

    let pretty = to_string_pretty(&order).unwrap();
    assert!(pretty.contains("\n\tnote=nil,\n"));
    assert!(pretty.contains("\n\t\t{\n\t\t\tsku=\"WIDGET-001\",\n"));
}

#[test]
fn test_primitives() {
    assert_roundtrip(&42i32);
    assert_roundtrip(&-7i64);
    assert_roundtrip(&3.5f64);
    assert_roundtrip(&true);
    assert_roundtrip(&false);
    assert_roundtrip(&'x');
    assert_roundtrip(&"hello world".to_string());
    assert_roundtrip(&vec![1, 2, 3, 4, 5]);
    assert_roundtrip(&(1u8, "two".to_string(), 3.0f32));
}

#[test]
fn test_options_and_unit() {
    assert_roundtrip(&Some(5));
    assert_roundtrip(&None::<i32>);
    assert_roundtrip(&vec![Some(1), None, Some(3)]);
    assert_roundtrip(&());
}

#[test]
fn test_enums() {
    assert_roundtrip(&Shape::Empty);
    assert_roundtrip(&Shape::Circle(1.5));
    assert_roundtrip(&Shape::Rect { w: 3, h: 4 });
    assert_roundtrip(&Shape::Pair(-1, 1));
    assert_roundtrip(&vec![Shape::Empty, Shape::Circle(2.0)]);

    assert_eq!(to_string(&Shape::Empty).unwrap(), r#""Empty""#);
    assert_eq!(to_string(&Shape::Circle(1.5)).unwrap(), r#"{["Circle"]=1.5, }"#);
}

#[test]
fn test_type_marked_enums_roundtrip() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Holder {
        shape: Shape,
        n: i32,
    }

    let options = LuaOptions::new().with_serialize_type(true);
    let shapes = vec![
        Shape::Empty,
        Shape::Circle(1.5),
        Shape::Rect { w: 3, h: 4 },
        Shape::Pair(-1, 1),
    ];
    for shape in shapes {
        let text = to_string_with_options(&shape, options.clone()).unwrap();
        let back: Shape = from_str(&text).unwrap();
        assert_eq!(back, shape, "literal was: {}", text);

        let holder = Holder { shape, n: 1 };
        for options in [options.clone(), LuaOptions::pretty().with_serialize_type(true)] {
            let text = to_string_with_options(&holder, options).unwrap();
            let back: Holder = from_str(&text).unwrap();
            assert_eq!(back, holder, "literal was: {}", text);
        }
    }

    let text = to_string_with_options(&Shape::Circle(2.0), options).unwrap();
    assert!(text.starts_with(&format!("{{__type=\"{}\", ", std::any::type_name::<Shape>())));

    let value = to_value(&Shape::Rect { w: 5, h: 6 }).unwrap();
    let back: Shape = from_value(value).unwrap();
    assert_eq!(back, Shape::Rect { w: 5, h: 6 });
}

#[test]
fn test_enum_table_with_extra_entries_is_rejected() {
    let err = from_str::<Shape>(r#"{ Circle = 1.5, Empty = nil }"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    let err = from_str::<Shape>("{ [1] = 1.5 }").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
}

#[test]
fn test_u64_above_i64_range_fails_to_serialize() {
    assert_roundtrip(&(i64::MAX as u64));
    let err = to_string(&u64::MAX).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
}

#[test]
fn test_maps() {
    let mut by_name = HashMap::new();
    by_name.insert("a".to_string(), 1);
    by_name.insert("end".to_string(), 2);
    assert_roundtrip(&by_name);

    let mut by_id = BTreeMap::new();
    by_id.insert(10i64, "ten".to_string());
    by_id.insert(-3i64, "minus three".to_string());
    assert_roundtrip(&by_id);
    assert_eq!(
        to_string(&by_id).unwrap(),
        r#"{[-3]="minus three", [10]="ten", }"#
    );
}

#[test]
fn test_reserved_field_names() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Loop {
        #[serde(rename = "end")]
        finish: Option<u32>,
        #[serde(rename = "not an identifier")]
        label: String,
        step: u32,
    }

    let value = Loop {
        finish: None,
        label: "x".to_string(),
        step: 2,
    };
    let text = to_string(&value).unwrap();
    assert_eq!(
        text,
        r#"{["end"]=nil, ["not an identifier"]="x", step=2, }"#
    );
    assert_roundtrip(&value);
}

#[test]
fn test_empty_collections() {
    let empty_vec: Vec<i32> = vec![];
    assert_roundtrip(&empty_vec);
    assert_eq!(to_string(&empty_vec).unwrap(), "{}");

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Empty {}
    assert_roundtrip(&Empty {});

    let empty_map: HashMap<String, i32> = HashMap::new();
    assert_roundtrip(&empty_map);
}

#[test]
fn test_special_strings() {
    let special_strings = vec![
        "".to_string(),
        "hello, world".to_string(),
        "line1\nline2".to_string(),
        "tab\there".to_string(),
        "curly } brace".to_string(),
        "-- not a comment".to_string(),
        "[[not a block]]".to_string(),
        "quote \" and 'apostrophe'".to_string(),
        "nul\u{0}9".to_string(),
        "accents \u{e9}\u{e8} and emoji \u{1F980}".to_string(),
        "nil".to_string(),
        "true".to_string(),
        "123".to_string(),
    ];
    for s in &special_strings {
        assert_roundtrip(s);
    }
    assert_roundtrip(&special_strings);
}

#[test]
fn test_serialize_type_markers() {
    let options = LuaOptions::new().with_serialize_type(true);
    let text = to_string_with_options(&alice(), options).unwrap();
    assert!(text.starts_with("{__type=\""));
    assert!(text.contains("::User\", id=123,"));
    assert!(text.contains("tags={__type=\"alloc::vec::Vec<alloc::string::String>\", \"admin\","));

    // Markers are skipped when deserializing into Rust types.
    let user_back: User = from_str(&text).unwrap();
    assert_eq!(user_back, alice());
}

#[test]
fn test_markup_output() {
    #[derive(Serialize)]
    struct Config {
        name: String,
        retries: u8,
    }

    let text = to_string_with_options(
        &Config {
            name: "svc".to_string(),
            retries: 3,
        },
        LuaOptions::markup(),
    )
    .unwrap();
    assert_eq!(
        text,
        "{\n\t-- alloc::string::String\n\tname=\"svc\",\n\t-- u8\n\tretries=3,\n}"
    );
}

#[test]
fn test_to_value_and_from_value() {
    let value = to_value(&alice()).unwrap();
    assert_eq!(value.get("id"), Some(&LuaValue::Integer(123)));
    assert_eq!(value.get("name").and_then(LuaValue::as_str), Some("Alice"));
    assert_eq!(
        value.get("tags").and_then(|tags| tags.get(2)),
        Some(&LuaValue::from("developer"))
    );

    let user: User = from_value(value).unwrap();
    assert_eq!(user, alice());
}

#[test]
fn test_dates_as_strings() {
    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Event {
        at: DateTime<Utc>,
    }

    let event = Event {
        at: Utc.with_ymd_and_hms(2024, 5, 17, 8, 30, 0).unwrap(),
    };
    assert_roundtrip(&event);

    let value = parse_value(r#""2024-05-17T08:30:00Z""#).unwrap();
    let at = DateTime::<Utc>::try_from(value).unwrap();
    assert_eq!(at, event.at);
}

#[test]
fn test_struct_from_handwritten_literal() {
    let text = r#"
        -- user record
        {
            name = 'Bob',
            id = 0x2A,
            tags = { "a", 'b', },
            active = false,
            extra = { ignored = true },
        }
    "#;
    let user: User = from_str(text).unwrap();
    assert_eq!(
        user,
        User {
            id: 42,
            name: "Bob".to_string(),
            active: false,
            tags: vec!["a".to_string(), "b".to_string()],
        }
    );
}

#[test]
fn test_deserialize_errors() {
    let err = from_str::<User>("{ id = 1, name = 'x', active = true, tags = 5 }").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);

    let err = from_str::<Vec<i32>>("{ 1, 2, x = 3 }").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);

    let err = from_str::<User>("{ id = 1, ").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnexpectedEndOfInput);

    let err = from_str::<u8>("300").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
}

#[test]
fn test_json_interop() {
    let json = serde_json::json!({
        "name": "Alice",
        "scores": [1, 2, 3],
        "nested": { "ok": true, "ratio": 0.5 },
        "missing": null,
    });

    let text = to_string(&json).unwrap();
    let value = parse_value(&text).unwrap();
    assert_eq!(value.get("name").and_then(LuaValue::as_str), Some("Alice"));
    assert_eq!(
        value.get("scores").and_then(|s| s.get(3)),
        Some(&LuaValue::Integer(3))
    );
    assert_eq!(value.get("missing"), Some(&LuaValue::Nil));

    let back: serde_json::Value = from_str(&text).unwrap();
    assert_eq!(back, json);

    let from_lua = serde_json::to_value(&value).unwrap();
    assert_eq!(from_lua["nested"]["ratio"], serde_json::json!(0.5));
}
