use serde_lua_table::{
    parse_value, to_string, to_string_pretty, ErrorKind, LuaOptions, LuaValue, TableKey,
};
use std::collections::BTreeMap;
use test_log::test;

fn kind(input: &str) -> ErrorKind {
    parse_value(input).unwrap_err().kind()
}

fn approx(value: &LuaValue, expected: f64) -> bool {
    matches!(value, LuaValue::Float(f) if (f - expected).abs() < 1e-12)
}

#[test]
fn test_scalar_literals() {
    assert_eq!(parse_value("nil").unwrap(), LuaValue::Nil);
    assert_eq!(parse_value("12345").unwrap(), LuaValue::Integer(12345));
    assert_eq!(parse_value("0xff").unwrap(), LuaValue::Integer(255));
    assert_eq!(parse_value("0XFF").unwrap(), LuaValue::Integer(255));
    assert_eq!(parse_value("1.2345").unwrap(), LuaValue::Float(1.2345));
    assert_eq!(parse_value("3.0").unwrap(), LuaValue::Float(3.0));
    assert!(approx(&parse_value("314.16e-2").unwrap(), 3.1416));
    assert!(approx(&parse_value("0.31416E1").unwrap(), 3.1416));
    assert_eq!(
        parse_value("\"This is a string\"").unwrap(),
        LuaValue::from("This is a string")
    );
    assert_eq!(parse_value("'single'").unwrap(), LuaValue::from("single"));
}

#[test]
fn test_booleans_and_negative_numbers() {
    assert_eq!(parse_value("true").unwrap(), LuaValue::Bool(true));
    assert_eq!(parse_value("false").unwrap(), LuaValue::Bool(false));
    assert_eq!(parse_value("-42").unwrap(), LuaValue::Integer(-42));
    assert_eq!(parse_value("-0x10").unwrap(), LuaValue::Integer(-16));
    assert_eq!(parse_value("-2.5").unwrap(), LuaValue::Float(-2.5));
    assert_eq!(
        parse_value("-9223372036854775808").unwrap(),
        LuaValue::Integer(i64::MIN)
    );
}

#[test]
fn test_empty_and_blank_input() {
    assert_eq!(parse_value("").unwrap(), LuaValue::Nil);
    assert_eq!(kind("   "), ErrorKind::UnexpectedEndOfInput);
    assert_eq!(kind("-- only a comment"), ErrorKind::UnexpectedEndOfInput);
}

#[test]
fn test_comments_before_values() {
    assert_eq!(
        parse_value("-- leading\n-- another\n  7 -- trailing").unwrap(),
        LuaValue::Integer(7)
    );
}

#[test]
fn test_mixed_table() {
    let value = parse_value(r#"{ a = 1, 1.1, ["aa'a"]="aa'a", {a="a"} }"#).unwrap();
    let table = value.as_table().unwrap();
    assert_eq!(table.len(), 4);
    assert_eq!(table.get("a"), Some(&LuaValue::Integer(1)));
    assert_eq!(table.get(1), Some(&LuaValue::Float(1.1)));
    assert_eq!(table.get("aa'a"), Some(&LuaValue::from("aa'a")));

    let nested = table.get(2).and_then(LuaValue::as_table).unwrap();
    assert_eq!(nested.len(), 1);
    assert_eq!(nested.get("a"), Some(&LuaValue::from("a")));
}

#[test]
fn test_explicit_integer_keys_bypass_positional_counter() {
    let value = parse_value("{ 'a', [5] = 'five', 'b', [0x10] = 16 }").unwrap();
    let table = value.as_table().unwrap();
    assert_eq!(table.get(1), Some(&LuaValue::from("a")));
    assert_eq!(table.get(2), Some(&LuaValue::from("b")));
    assert_eq!(table.get(5), Some(&LuaValue::from("five")));
    assert_eq!(table.get(16), Some(&LuaValue::Integer(16)));
    assert_eq!(
        table.keys().cloned().collect::<Vec<_>>(),
        vec![
            TableKey::Integer(1),
            TableKey::Integer(5),
            TableKey::Integer(2),
            TableKey::Integer(16),
        ]
    );
}

#[test]
fn test_duplicate_keys_overwrite() {
    let value = parse_value("{ x = 1, y = 2, x = 3 }").unwrap();
    let table = value.as_table().unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.get("x"), Some(&LuaValue::Integer(3)));
    assert_eq!(
        table.keys().next(),
        Some(&TableKey::String("x".to_string()))
    );
}

#[test]
fn test_positional_words() {
    let value = parse_value("{ nil, true, false, nil = 1 }").unwrap();
    let table = value.as_table().unwrap();
    assert_eq!(table.get(1), Some(&LuaValue::Nil));
    assert_eq!(table.get(2), Some(&LuaValue::Bool(true)));
    assert_eq!(table.get(3), Some(&LuaValue::Bool(false)));
    assert_eq!(table.get("nil"), Some(&LuaValue::Integer(1)));
}

#[test]
fn test_bare_keys_are_verbatim() {
    let value = parse_value("{ my key  = 'v', under_score=1 }").unwrap();
    let table = value.as_table().unwrap();
    assert_eq!(table.get("my key"), Some(&LuaValue::from("v")));
    assert_eq!(table.get("under_score"), Some(&LuaValue::Integer(1)));
}

#[test]
fn test_comments_inside_tables() {
    let input = "{\n  -- first\n  1, -- after one\n  x = 2,\n  -- last\n}";
    let value = parse_value(input).unwrap();
    let table = value.as_table().unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.get(1), Some(&LuaValue::Integer(1)));
    assert_eq!(table.get("x"), Some(&LuaValue::Integer(2)));
}

#[test]
fn test_trailing_comma_tables() {
    for input in [
        "{ 1, 2, }",
        "{ 1, 2,}",
        "{ 1, 2 , }",
        "{ 1, 2,\n}",
        "{ 1, 2,,, }",
        "{1,2}",
    ] {
        let value = parse_value(input).unwrap();
        let table = value.as_table().unwrap();
        assert_eq!(table.len(), 2, "input: {:?}", input);
        assert!(table.is_sequence());
    }

    let value = parse_value("{ a = 1, b = { c = 2, }, }").unwrap();
    assert_eq!(
        value.get("b").and_then(|b| b.get("c")),
        Some(&LuaValue::Integer(2))
    );

    assert_eq!(parse_value("{,}").unwrap().as_table().unwrap().len(), 0);
}

#[test]
fn test_key_without_value_before_close() {
    let err = parse_value("{ a = 1, b }").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedLiteral);
    assert_eq!(err.position(), Some(9));

    assert_eq!(kind("{ = 1 }"), ErrorKind::MalformedLiteral);
}

#[test]
fn test_malformed_literals() {
    assert_eq!(kind("nill"), ErrorKind::MalformedLiteral);
    assert_eq!(kind("truth"), ErrorKind::MalformedLiteral);
    assert_eq!(kind("12ab"), ErrorKind::MalformedLiteral);
    assert_eq!(kind("0xzz"), ErrorKind::MalformedLiteral);
    assert_eq!(kind("0x+5"), ErrorKind::MalformedLiteral);
    assert_eq!(kind("-0x-5"), ErrorKind::MalformedLiteral);
    assert_eq!(kind("{ 0x+5 }"), ErrorKind::MalformedLiteral);
    assert_eq!(kind("{ [0x+5] = 1 }"), ErrorKind::MalformedLiteral);
    assert_eq!(kind("@"), ErrorKind::MalformedLiteral);
    assert_eq!(kind("-x"), ErrorKind::MalformedLiteral);
    assert_eq!(kind(r#""bad \q escape""#), ErrorKind::MalformedLiteral);
    assert_eq!(kind("{ [1.5] = 1 }"), ErrorKind::MalformedLiteral);
    assert_eq!(kind("{ [abc] = 1 }"), ErrorKind::MalformedLiteral);
    assert_eq!(kind("{ ['a' = 1 }"), ErrorKind::MalformedLiteral);
    assert_eq!(kind("1 2"), ErrorKind::MalformedLiteral);
}

#[test]
fn test_malformed_reports_offset() {
    let err = parse_value("{ x = nill }").unwrap_err();
    assert_eq!(err.position(), Some(6));
    assert!(err.to_string().contains("nill"));
}

#[test]
fn test_unexpected_end_of_input() {
    assert_eq!(kind("\"unterminated"), ErrorKind::UnexpectedEndOfInput);
    assert_eq!(kind("'ends in escape\\"), ErrorKind::UnexpectedEndOfInput);
    assert_eq!(kind("{ 1, 2"), ErrorKind::UnexpectedEndOfInput);
    assert_eq!(kind("{ a = "), ErrorKind::UnexpectedEndOfInput);
    assert_eq!(kind("{ a"), ErrorKind::UnexpectedEndOfInput);
    assert_eq!(kind("{ [1"), ErrorKind::UnexpectedEndOfInput);
    assert_eq!(kind("-"), ErrorKind::UnexpectedEndOfInput);
}

#[test]
fn test_unsupported_features() {
    assert_eq!(kind("0x1p4"), ErrorKind::UnsupportedFeature);
    assert_eq!(kind("0x1.8P1"), ErrorKind::UnsupportedFeature);
    assert_eq!(kind("[[block string]]"), ErrorKind::UnsupportedFeature);
    assert_eq!(kind("[==[block]==]"), ErrorKind::UnsupportedFeature);
    assert_eq!(kind("--[[ block comment ]] 1"), ErrorKind::UnsupportedFeature);
    assert_eq!(kind("{ 1, --[[ block ]] 2 }"), ErrorKind::UnsupportedFeature);
    assert_eq!(kind("{ [0x1p4] = 1 }"), ErrorKind::UnsupportedFeature);
}

#[test]
fn test_string_escapes() {
    assert_eq!(
        parse_value(r#""a\tb\nc\\d\"e\'f\[g\]""#).unwrap(),
        LuaValue::from("a\tb\nc\\d\"e'f[g]")
    );
    assert_eq!(parse_value(r#""\065\066""#).unwrap(), LuaValue::from("AB"));
    assert_eq!(parse_value(r#""\x41""#).unwrap(), LuaValue::from("A"));
    assert_eq!(
        parse_value(r#""\u{1F600}""#).unwrap(),
        LuaValue::from("\u{1F600}")
    );
    assert_eq!(parse_value(r#"'it''"#).unwrap_err().kind(), ErrorKind::MalformedLiteral);
}

#[test]
fn test_sequence_of_strings_round_trip() {
    let strings = vec!["one".to_string(), "two".to_string(), "three".to_string()];
    let text = to_string(&strings).unwrap();
    let value = parse_value(&text).unwrap();
    let table = value.as_table().unwrap();
    assert_eq!(table.len(), 3);
    let back: Vec<&str> = table.values().filter_map(LuaValue::as_str).collect();
    assert_eq!(back, vec!["one", "two", "three"]);
}

#[test]
fn test_mapping_layout() {
    let mut map = BTreeMap::new();
    map.insert("a", 1);
    map.insert("b", 2);

    let compact = to_string(&map).unwrap();
    assert_eq!(compact, r#"{["a"]=1, ["b"]=2, }"#);
    assert!(!compact.contains('\n'));

    let pretty = to_string_pretty(&map).unwrap();
    assert_eq!(pretty, "{\n\t[\"a\"]=1,\n\t[\"b\"]=2,\n}");
}

#[test]
fn test_scalar_round_trips() {
    let values = [
        LuaValue::Nil,
        LuaValue::Bool(true),
        LuaValue::Bool(false),
        LuaValue::Integer(0),
        LuaValue::Integer(i64::MAX),
        LuaValue::Integer(i64::MIN),
        LuaValue::Float(0.1),
        LuaValue::Float(-1.5e-300),
        LuaValue::Float(1e300),
        LuaValue::from("quote \" and 'single' [brackets] \u{7f} \u{e9} \u{263a}"),
    ];
    for value in values {
        let text = value.to_lua_string(&LuaOptions::default()).unwrap();
        assert_eq!(parse_value(&text).unwrap(), value, "text: {}", text);
    }
}

#[test]
fn test_infinity_round_trips() {
    let text = LuaValue::Float(f64::INFINITY).to_string();
    assert_eq!(text, "1e999");
    assert_eq!(parse_value(&text).unwrap(), LuaValue::Float(f64::INFINITY));
    assert_eq!(
        parse_value("-1e999").unwrap(),
        LuaValue::Float(f64::NEG_INFINITY)
    );
}

#[test]
fn test_depth_limit() {
    let deep = format!("{}{}", "{".repeat(200), "}".repeat(200));
    let err = parse_value(&deep).unwrap_err();
    assert!(err.to_string().contains("Nesting deeper than 128"));

    let options = LuaOptions::new().with_max_depth(None);
    assert!(serde_lua_table::parse_value_with_options(&deep, options).is_ok());
}
