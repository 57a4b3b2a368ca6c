/// Builds a [`LuaValue`](crate::LuaValue) from literal-like syntax.
///
/// - `lua!(nil)`, `lua!(true)`, `lua!(false)`
/// - `lua!([a, b, c])` for a positional table
/// - `lua!({ "key" => value, 1 => value })` for a keyed table
/// - anything else goes through [`LuaValue::from`](crate::LuaValue)
///
/// # Examples
///
/// ```rust
/// use serde_lua_table::{lua, LuaValue};
///
/// let value = lua!({ "name" => "Alice", "tags" => ["a", "b"], 1 => nil });
/// assert_eq!(value.get("name").and_then(LuaValue::as_str), Some("Alice"));
/// assert_eq!(value.get(1), Some(&LuaValue::Nil));
/// ```
#[macro_export]
macro_rules! lua {
    (nil) => {
        $crate::LuaValue::Nil
    };

    (true) => {
        $crate::LuaValue::Bool(true)
    };

    (false) => {
        $crate::LuaValue::Bool(false)
    };

    ([]) => {
        $crate::LuaValue::Table($crate::LuaTable::new())
    };

    ([ $($elem:tt),* $(,)? ]) => {{
        let mut table = $crate::LuaTable::new();
        $(
            table.push($crate::lua!($elem));
        )*
        $crate::LuaValue::Table(table)
    }};

    ({}) => {
        $crate::LuaValue::Table($crate::LuaTable::new())
    };

    ({ $($key:literal => $value:tt),* $(,)? }) => {{
        let mut table = $crate::LuaTable::new();
        $(
            table.insert($key, $crate::lua!($value));
        )*
        $crate::LuaValue::Table(table)
    }};

    ($other:expr) => {
        $crate::LuaValue::from($other)
    };
}

#[cfg(test)]
mod tests {
    use crate::{LuaTable, LuaValue};

    #[test]
    fn test_lua_macro_primitives() {
        assert_eq!(lua!(nil), LuaValue::Nil);
        assert_eq!(lua!(true), LuaValue::Bool(true));
        assert_eq!(lua!(42), LuaValue::Integer(42));
        assert_eq!(lua!(3.5), LuaValue::Float(3.5));
        assert_eq!(lua!('c'), LuaValue::Char('c'));
        assert_eq!(lua!("hello"), LuaValue::String("hello".to_string()));
    }

    #[test]
    fn test_lua_macro_positional() {
        assert_eq!(lua!([]), LuaValue::Table(LuaTable::new()));

        let value = lua!([1, "two", [3], nil]);
        let table = value.as_table().unwrap();
        assert_eq!(table.len(), 4);
        assert_eq!(table.get(2), Some(&LuaValue::from("two")));
        assert_eq!(table.get(3).and_then(|t| t.get(1)), Some(&LuaValue::Integer(3)));
        assert!(table.is_sequence());
    }

    #[test]
    fn test_lua_macro_keyed() {
        let value = lua!({
            "name" => "Alice",
            "age" => 30,
            10 => { "nested" => true },
        });
        let table = value.as_table().unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get("age"), Some(&LuaValue::Integer(30)));
        assert_eq!(
            table.get(10).and_then(|t| t.get("nested")),
            Some(&LuaValue::Bool(true))
        );
    }
}
