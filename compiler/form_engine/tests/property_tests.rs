//! Property-based tests for projection and propagation.
//!
//! 1. Flattening the value tree reproduces the flat visible-value map,
//!    and the tree only fails when one visible key prefixes another.
//! 2. `set_value` is idempotent in its observable effect.
//! 3. Visible keys are exactly the keys of fields with `visible == true`.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use std::collections::BTreeSet;

use form_engine::{silent_sink, FormEngine, FormError};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

// -- Strategies --

fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i32>().prop_map(Value::from),
        "[a-z-]{0,8}".prop_map(Value::from),
    ]
}

/// Dotted keys over a tiny alphabet so prefixes collide often.
fn key_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(vec!["a", "b", "c"]), 1..=3)
        .prop_map(|segments| segments.join("."))
}

fn fields_strategy() -> impl Strategy<Value = Vec<(String, Value, bool)>> {
    prop::collection::btree_set(key_strategy(), 1..8).prop_flat_map(|keys| {
        let keys: Vec<String> = keys.into_iter().collect();
        let n = keys.len();
        (
            Just(keys),
            prop::collection::vec(scalar_strategy(), n),
            prop::collection::vec(any::<bool>(), n),
        )
            .prop_map(|(keys, values, visible)| {
                keys.into_iter()
                    .zip(values)
                    .zip(visible)
                    .map(|((key, value), visible)| (key, value, visible))
                    .collect()
            })
    })
}

// -- Helpers --

fn engine_for(fields: &[(String, Value, bool)]) -> FormEngine {
    let schema: Vec<Value> = fields
        .iter()
        .map(|(key, value, visible)| {
            json!({"key": key, "name": key, "type": "text", "value": value, "visible": visible})
        })
        .collect();
    FormEngine::builder()
        .logger(silent_sink())
        .load(&Value::Array(schema))
        .unwrap()
}

fn flatten(prefix: &str, value: &Value, out: &mut Map<String, Value>) {
    match value {
        Value::Object(map) => {
            for (name, child) in map {
                let key = if prefix.is_empty() {
                    name.clone()
                } else {
                    format!("{prefix}.{name}")
                };
                flatten(&key, child, out);
            }
        }
        leaf => {
            out.insert(prefix.to_string(), leaf.clone());
        }
    }
}

fn has_prefix_collision(keys: &[&String]) -> bool {
    keys.iter().any(|a| {
        keys.iter()
            .any(|b| a != b && b.starts_with(a.as_str()) && b[a.len()..].starts_with('.'))
    })
}

fn rules_schema() -> Value {
    json!([
        {"key": "region", "name": "Region", "type": "select", "value": "cn-hangzhou"},
        {"key": "app.name", "name": "Name", "type": "text", "dependencies": ["region"],
         "rules": [{
            "if": "region.value == 'cn-beijing'",
            "then": ["set app.name.required = true"],
            "else": ["set app.name.required = false"]
         }]},
        {"key": "app.code", "name": "Code", "type": "text",
         "rules": [{"then": ["set app.code.value = f\"{region.value}/{app.name.value}\""]}]},
        {"key": "extra", "name": "Extra", "type": "text",
         "rules": [{"if": "region.value in ['x', 'y', 1]", "then": ["set extra.visible = false"],
                    "else": ["clear extra.visible"]}]}
    ])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn tree_flattens_to_flat_values(fields in fields_strategy()) {
        let engine = engine_for(&fields);
        let flat = engine.get_visible_values();
        let visible: Vec<&String> = flat.keys().collect();

        match engine.get_visible_values_tree() {
            Ok(tree) => {
                prop_assert!(!has_prefix_collision(&visible));
                let mut flattened = Map::new();
                flatten("", &tree, &mut flattened);
                prop_assert_eq!(flattened, flat);
            }
            Err(FormError::SchemaConflict(_)) => {
                prop_assert!(has_prefix_collision(&visible));
            }
            Err(other) => prop_assert!(false, "unexpected error {other}"),
        }
    }

    #[test]
    fn visible_keys_match_visible_flags(fields in fields_strategy()) {
        let engine = engine_for(&fields);
        let expected: BTreeSet<&str> = fields
            .iter()
            .filter(|(_, _, visible)| *visible)
            .map(|(key, _, _)| key.as_str())
            .collect();
        let flat = engine.get_visible_values();
        let actual: BTreeSet<&str> = flat.keys().map(String::as_str).collect();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn set_value_is_idempotent(
        key in prop::sample::select(vec!["region", "app.name", "extra"]),
        value in scalar_strategy(),
    ) {
        let mut once = FormEngine::builder().logger(silent_sink()).load(&rules_schema()).unwrap();
        let mut twice = FormEngine::builder().logger(silent_sink()).load(&rules_schema()).unwrap();

        once.set_value(key, value.clone()).unwrap();
        twice.set_value(key, value.clone()).unwrap();
        twice.set_value(key, value).unwrap();

        prop_assert_eq!(once.get_visible_values(), twice.get_visible_values());
        for field in once.field_keys() {
            prop_assert_eq!(once.get_field(field).unwrap(), twice.get_field(field).unwrap());
        }
    }
}
