//! # Key-Case Transformation
//!
//! Rewrites the keys of JSON objects between naming conventions
//! (`snake_case` → `camelCase` / `PascalCase`), optionally recursing into nested
//! objects and arrays.
//!
//! ## Overview
//!
//! - [`KeyCaseTransformer`] owns a [`ConversionCache`] and performs the traversal
//! - [`KeyCaseOptions`] selects recursion, case mode, exclusions and stop paths
//! - [`camelcase_keys`] uses a process-wide transformer with the default cache
//!
//! ## Example
//!
//! ```rust
//! use keycase_db::keys::{camelcase_keys, KeyCaseOptions};
//! use serde_json::json;
//!
//! let rows = json!([{ "user_id": 1, "created_at": "2024-01-01" }]);
//! let converted = camelcase_keys(&rows, &KeyCaseOptions::default());
//! assert_eq!(converted, json!([{ "userId": 1, "createdAt": "2024-01-01" }]));
//! ```
//!
//! Objects and arrays are always rebuilt; the input is never modified.

pub mod cache;
pub mod options;

use serde_json::{Map, Value};
use std::sync::{Arc, OnceLock};

use crate::case::camel_case;

pub use cache::{CacheStats, ConversionCache};
pub use options::{KeyCaseOptions, KeyMatcher, StopPath};

static DEFAULT_TRANSFORMER: OnceLock<KeyCaseTransformer> = OnceLock::new();

/// Process-wide transformer backed by a cache of default capacity.
pub fn default_transformer() -> &'static KeyCaseTransformer {
    DEFAULT_TRANSFORMER.get_or_init(KeyCaseTransformer::new)
}

/// Convert keys with the process-wide transformer.
pub fn camelcase_keys(input: &Value, options: &KeyCaseOptions) -> Value {
    default_transformer().convert_keys(input, options)
}

/// Whether the traversal descends into `value`.
pub fn is_container(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

/// Output mode of a single key conversion; part of the cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ConversionMode {
    Camel,
    Pascal,
    CamelPreserving,
    PascalPreserving,
}

impl ConversionMode {
    fn of(options: &KeyCaseOptions) -> Self {
        match (options.pascal_case, options.preserve_consecutive_uppercase) {
            (false, false) => Self::Camel,
            (true, false) => Self::Pascal,
            (false, true) => Self::CamelPreserving,
            (true, true) => Self::PascalPreserving,
        }
    }

    fn tag(self) -> char {
        match self {
            Self::Camel => 'c',
            Self::Pascal => 'p',
            Self::CamelPreserving => 'C',
            Self::PascalPreserving => 'P',
        }
    }

    /// Fixed-width tag prefix, so no two (key, mode) pairs share a cache key.
    fn cache_key(self, key: &str) -> String {
        let mut cache_key = String::with_capacity(key.len() + 1);
        cache_key.push(self.tag());
        cache_key.push_str(key);
        cache_key
    }
}

/// Converts object keys, memoising each key conversion.
#[derive(Debug, Clone)]
pub struct KeyCaseTransformer {
    cache: Arc<ConversionCache>,
}

impl KeyCaseTransformer {
    pub fn new() -> Self {
        Self::with_cache(Arc::new(ConversionCache::default()))
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_cache(Arc::new(ConversionCache::new(capacity)))
    }

    /// Share a cache between transformers.
    pub fn with_cache(cache: Arc<ConversionCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &ConversionCache {
        &self.cache
    }

    /// Convert the keys of `input`.
    ///
    /// Arrays are converted element-wise, each element being its own root.
    /// Values other than objects and arrays are returned unchanged.
    pub fn convert_keys(&self, input: &Value, options: &KeyCaseOptions) -> Value {
        let mut path = Vec::new();
        self.map_container(input, options, &mut path)
    }

    /// Convert a single key, consulting the cache first.
    pub fn convert_key(&self, key: &str, options: &KeyCaseOptions) -> String {
        let cache_key = ConversionMode::of(options).cache_key(key);
        if let Some(converted) = self.cache.get(&cache_key) {
            return converted;
        }

        let converted = camel_case(key, options.case_options());
        if self.cache.accepts(key) {
            self.cache.insert(cache_key, converted.clone());
        }

        converted
    }

    /// Array elements share the path of the array itself.
    fn map_container(&self, value: &Value, options: &KeyCaseOptions, path: &mut Vec<String>) -> Value {
        match value {
            Value::Object(map) => Value::Object(self.map_object(map, options, path)),
            Value::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.map_container(item, options, path))
                    .collect(),
            ),
            other => other.clone(),
        }
    }

    fn map_object(
        &self,
        map: &Map<String, Value>,
        options: &KeyCaseOptions,
        path: &mut Vec<String>,
    ) -> Map<String, Value> {
        let mut output = Map::with_capacity(map.len());

        for (key, value) in map {
            let value = if !(options.deep && is_container(value)) {
                value.clone()
            } else if !options.has_stop_paths() {
                // No path tracking needed
                self.map_container(value, options, path)
            } else {
                path.push(key.clone());
                let mapped = if options.is_stop_path(path) {
                    value.clone()
                } else {
                    self.map_container(value, options, path)
                };
                path.pop();
                mapped
            };

            let output_key = if options.is_excluded(key) {
                key.clone()
            } else {
                self.convert_key(key, options)
            };

            // Colliding output keys: last write wins.
            output.insert(output_key, value);
        }

        output
    }
}

impl Default for KeyCaseTransformer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_shallow_by_default() {
        let transformer = KeyCaseTransformer::with_capacity(16);
        let input = json!({ "foo_bar": true, "nested_obj": { "inner_key": 1 } });

        let output = transformer.convert_keys(&input, &KeyCaseOptions::default());

        assert_eq!(output, json!({ "fooBar": true, "nestedObj": { "inner_key": 1 } }));
    }

    #[test]
    fn test_deep_conversion() {
        let transformer = KeyCaseTransformer::with_capacity(16);
        let input = json!({ "level_one": { "level_two": "ok", "items": [{ "item_id": 1 }] } });

        let output = transformer.convert_keys(&input, &KeyCaseOptions::new().deep(true));

        assert_eq!(
            output,
            json!({ "levelOne": { "levelTwo": "ok", "items": [{ "itemId": 1 }] } })
        );
    }

    #[test]
    fn test_stop_path_renames_key_but_not_children() {
        let transformer = KeyCaseTransformer::with_capacity(16);
        let input = json!({ "a_b": 1, "a_c": { "c_d": 1, "c_e": { "e_f": 1 } } });
        let options = KeyCaseOptions::new().deep(true).stop_path("a_c.c_e");

        let output = transformer.convert_keys(&input, &options);

        assert_eq!(output, json!({ "aB": 1, "aC": { "cD": 1, "cE": { "e_f": 1 } } }));
    }

    #[test]
    fn test_stop_path_applies_through_arrays() {
        let transformer = KeyCaseTransformer::with_capacity(16);
        let input = json!({ "rows": [{ "raw_data": { "keep_me": 1 }, "row_id": 2 }] });
        let options = KeyCaseOptions::new().deep(true).stop_path("rows.raw_data");

        let output = transformer.convert_keys(&input, &options);

        assert_eq!(output, json!({ "rows": [{ "rawData": { "keep_me": 1 }, "rowId": 2 }] }));
    }

    #[test]
    fn test_excluded_key_value_still_recursed() {
        let transformer = KeyCaseTransformer::with_capacity(16);
        let input = json!({ "raw_payload": { "inner_key": 1 }, "other_key": 2 });
        let options = KeyCaseOptions::new().deep(true).exclude("raw_payload");

        let output = transformer.convert_keys(&input, &options);

        assert_eq!(output, json!({ "raw_payload": { "innerKey": 1 }, "otherKey": 2 }));
    }

    #[test]
    fn test_collision_is_last_write_wins() {
        let transformer = KeyCaseTransformer::with_capacity(16);
        let input = json!({ "fooBar": 1, "foo_bar": 2 });

        let output = transformer.convert_keys(&input, &KeyCaseOptions::default());

        assert_eq!(output, json!({ "fooBar": 2 }));
    }

    #[test]
    fn test_insertion_order_preserved() {
        let transformer = KeyCaseTransformer::with_capacity(16);
        let input = json!({ "z_key": 1, "a_key": 2, "m_key": 3 });

        let output = transformer.convert_keys(&input, &KeyCaseOptions::default());
        let keys: Vec<&String> = output.as_object().unwrap().keys().collect();

        assert_eq!(keys, ["zKey", "aKey", "mKey"]);
    }

    #[test]
    fn test_modes_do_not_share_cache_entries() {
        let transformer = KeyCaseTransformer::with_capacity(16);
        let camel = KeyCaseOptions::default();
        let pascal = KeyCaseOptions::new().pascal_case(true);
        let preserving = KeyCaseOptions::new().preserve_consecutive_uppercase(true);

        assert_eq!(transformer.convert_key("foo_bar", &camel), "fooBar");
        assert_eq!(transformer.convert_key("foo_bar", &pascal), "FooBar");
        assert_eq!(transformer.convert_key("foo_bar", &camel), "fooBar");
        assert_eq!(transformer.convert_key("foo-BAR", &camel), "fooBar");
        assert_eq!(transformer.convert_key("foo-BAR", &preserving), "fooBAR");
        // "foo_" under camelCase and "foo" under PascalCase stay distinct.
        assert_eq!(transformer.convert_key("foo_", &camel), "foo");
        assert_eq!(transformer.convert_key("foo", &pascal), "Foo");
        assert_eq!(transformer.cache().len(), 6);
    }

    #[test]
    fn test_long_keys_are_not_cached() {
        let transformer = KeyCaseTransformer::with_capacity(16);
        let long_key = format!("{}_suffix", "a".repeat(100));
        let options = KeyCaseOptions::default();

        let first = transformer.convert_key(&long_key, &options);
        let second = transformer.convert_key(&long_key, &options);

        assert_eq!(first, second);
        assert_eq!(first, format!("{}Suffix", "a".repeat(100)));
        assert!(transformer.cache().is_empty());
    }

    #[test]
    fn test_digit_bearing_keys() {
        let transformer = KeyCaseTransformer::with_capacity(16);
        let input = json!({ "address_line2b_text": 1, "h2o_level": { "co2_ppm": 2 } });

        let output = transformer.convert_keys(&input, &KeyCaseOptions::new().deep(true));

        assert_eq!(output, json!({ "addressLine2bText": 1, "h2oLevel": { "co2Ppm": 2 } }));
    }

    #[test]
    fn test_deep_without_stop_paths_matches_unreachable_stop_path() {
        let transformer = KeyCaseTransformer::with_capacity(16);
        let input = json!({ "a_b": { "c_d": [{ "e_f": 1 }] } });
        let plain = KeyCaseOptions::new().deep(true);
        let unreachable = KeyCaseOptions::new().deep(true).stop_path("no_such.path");

        assert!(!plain.has_stop_paths());
        assert_eq!(
            transformer.convert_keys(&input, &plain),
            transformer.convert_keys(&input, &unreachable)
        );
    }

    #[test]
    fn test_scalars_pass_through() {
        let transformer = KeyCaseTransformer::with_capacity(16);
        let options = KeyCaseOptions::new().deep(true);

        for value in [json!(null), json!(42), json!("some_string"), json!(true)] {
            assert_eq!(transformer.convert_keys(&value, &options), value);
        }
    }
}
