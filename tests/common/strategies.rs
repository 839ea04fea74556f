use proptest::prelude::*;
use serde_json::{Map, Value};

/// Strategy for generating snake_case keys
pub fn snake_key_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,8}(_[a-z][a-z0-9]{0,8}){0,3}"
}

/// Strategy for generating camelCase keys
pub fn camel_key_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z]{0,8}([A-Z][a-z]{1,8}){0,3}"
}

/// Strategy for generating JSON leaves
pub fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::from),
        "[a-z_ ]{0,12}".prop_map(Value::String),
    ]
}

/// Strategy for generating objects with snake_case keys
pub fn snake_object_strategy() -> impl Strategy<Value = Value> {
    prop::collection::vec((snake_key_strategy(), scalar_strategy()), 0..8).prop_map(|entries| {
        let mut map = Map::new();
        for (key, value) in entries {
            map.insert(key, value);
        }
        Value::Object(map)
    })
}

/// Strategy for generating nested documents of objects and arrays
pub fn nested_document_strategy() -> impl Strategy<Value = Value> {
    scalar_strategy().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec((snake_key_strategy(), inner), 0..6).prop_map(|entries| {
                let mut map = Map::new();
                for (key, value) in entries {
                    map.insert(key, value);
                }
                Value::Object(map)
            }),
        ]
    })
}
