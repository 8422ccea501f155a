#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use crate::{buffer_sink, FormEngine, FormError};

fn field(key: &str, value: Value, rules: Value) -> Value {
    json!({"key": key, "name": key, "type": "text", "value": value, "rules": rules})
}

/// Engine with a `trace(name)` method that records call order.
fn traced(schema: Value) -> (FormEngine, Arc<Mutex<Vec<String>>>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&calls);
    let engine = FormEngine::builder()
        .logger(buffer_sink())
        .method("trace", move |call| {
            let name = call.arg(0, "name").cloned().unwrap_or(Value::Null);
            sink.lock().push(name.as_str().unwrap_or_default().to_string());
            Ok(Value::Null)
        })
        .load(&schema)
        .unwrap();
    (engine, calls)
}

#[test]
fn test_changed_field_first_then_dependents_in_order() {
    let (mut engine, calls) = traced(json!([
        {"key": "c", "name": "C", "type": "text", "dependencies": ["b"],
         "rules": [{"then": ["call_method trace('c')"]}]},
        {"key": "b", "name": "B", "type": "text", "dependencies": ["a"],
         "rules": [{"then": ["call_method trace('b')"]}]},
        {"key": "a", "name": "A", "type": "text",
         "rules": [{"then": ["call_method trace('a')"]}]},
        {"key": "z", "name": "Z", "type": "text",
         "rules": [{"then": ["call_method trace('z')"]}]}
    ]));

    let report = engine.set_value("a", json!(1)).unwrap();
    assert_eq!(*calls.lock(), vec!["a", "b", "c"]);
    assert_eq!(report.passes, 1);
    assert_eq!(report.updated, vec!["a"]);
    assert!(report.warnings.is_empty());
}

#[test]
fn test_write_to_later_field_runs_it_in_same_pass() {
    let (mut engine, calls) = traced(json!([
        field("a", json!(0), json!([{"then": ["set b.visible = a.value < 0", "call_method trace('a')"]}])),
        field("b", json!(0), json!([{"then": ["call_method trace('b')"]}])),
    ]));

    let report = engine.set_value("a", json!(5)).unwrap();
    assert_eq!(*calls.lock(), vec!["a", "b"]);
    assert_eq!(report.passes, 1);
    assert_eq!(report.updated, vec!["a", "b"]);
    assert!(!engine.get_field("b").unwrap().visible);
}

#[test]
fn test_two_field_cycle_gets_one_extra_pass() {
    let schema = json!([
        field("a", json!(0), json!([{"then": ["set b.value = b.value + 1"]}])),
        field("b", json!(0), json!([{"then": ["set a.value = a.value + 1"]}])),
    ]);
    let mut engine = FormEngine::builder()
        .logger(buffer_sink())
        .load(&schema)
        .unwrap();

    let report = engine.set_value("a", json!(0)).unwrap();
    assert_eq!(report.passes, 2);
    assert_eq!(engine.get_value("a").unwrap(), &json!(2));
    assert_eq!(engine.get_value("b").unwrap(), &json!(2));
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].starts_with("cycle detected at `a`"));
    assert!(engine
        .logger()
        .sink()
        .lines()
        .iter()
        .any(|line| line.starts_with("[warn] cycle detected at `a`")));
}

#[test]
fn test_acyclic_writes_settle_in_one_pass() {
    // No field's value feeds back into itself, but d reads fields that
    // other rules write after d would otherwise have run.
    let schema = json!([
        field("r", json!(null), json!([{"then": ["set x1.value = r.value"]}])),
        field("d", json!(null), json!([{"then": ["set d.value = r.value + x1.value + x4.value"]}])),
        field("y", json!(null), json!([{"then": ["set x4.value = r.value * 100 + x2.value"]}])),
        field("x1", json!(null), json!([{"then": ["set x2.value = x1.value * 10"]}])),
        field("x2", json!(null), json!([])),
        field("x4", json!(null), json!([])),
    ]);
    let mut engine = FormEngine::builder()
        .logger(buffer_sink())
        .load(&schema)
        .unwrap();

    let report = engine.set_value("r", json!(1)).unwrap();
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    assert_eq!(report.passes, 1);
    assert_eq!(engine.get_value("x1").unwrap(), &json!(1));
    assert_eq!(engine.get_value("x2").unwrap(), &json!(10));
    assert_eq!(engine.get_value("x4").unwrap(), &json!(110));
    assert_eq!(engine.get_value("d").unwrap(), &json!(112));
    assert_eq!(report.updated, vec!["r", "d", "x1", "x2", "x4"]);
}

#[test]
fn test_pass_ceiling_stops_propagation() {
    let schema = json!([
        field("a", json!(0), json!([{"then": ["set b.value = b.value + 1"]}])),
        field("b", json!(0), json!([{"then": ["set a.value = a.value + 1"]}])),
    ]);
    let mut engine = FormEngine::builder()
        .max_passes(1)
        .logger(buffer_sink())
        .load(&schema)
        .unwrap();

    let err = engine.set_value("a", json!(0)).unwrap_err();
    assert_eq!(
        err,
        FormError::CascadeOverflow {
            max_passes: 1,
            pending: vec!["a".to_string()],
        }
    );
    // State as of the last completed pass.
    assert_eq!(engine.get_value("a").unwrap(), &json!(1));
    assert_eq!(engine.get_value("b").unwrap(), &json!(1));
    assert!(engine
        .logger()
        .sink()
        .lines()
        .iter()
        .any(|line| line.starts_with("[error] cascade stopped after 1 passes")));
}

#[test]
fn test_method_set_value_joins_running_cascade() {
    let schema = json!([
        field("a", json!(null), json!([{"then": ["call_method pick(a.value)"]}])),
        field("c", json!(null), json!([])),
        field("d", json!(null), json!([{"then": ["set d.value = f\"picked {c.value}\""]}])),
    ]);
    let mut engine = FormEngine::builder()
        .logger(buffer_sink())
        .method("pick", |call| {
            let chosen = call.arg(0, "value").cloned().unwrap_or(Value::Null);
            call.set_value("c", chosen);
            Ok(Value::Null)
        })
        .load(&schema)
        .unwrap();

    let report = engine.set_value("a", json!("x")).unwrap();
    assert_eq!(engine.get_value("c").unwrap(), &json!("x"));
    assert_eq!(engine.get_value("d").unwrap(), &json!("picked x"));
    assert_eq!(report.updated, vec!["a", "c", "d"]);
    assert_eq!(report.passes, 1);
}

#[test]
fn test_method_set_value_on_unknown_key_is_recorded() {
    let schema = json!([field("a", json!(null), json!([{"then": ["call_method bad()"]}]))]);
    let mut engine = FormEngine::builder()
        .logger(buffer_sink())
        .method("bad", |call| {
            call.set_value("ghost", json!(1));
            Ok(Value::Null)
        })
        .load(&schema)
        .unwrap();

    engine.set_value("a", json!(1)).unwrap();
    assert_eq!(
        engine.get_field("a").unwrap().errors,
        vec!["set_value: unknown field `ghost`"]
    );
}

#[test]
fn test_failures_are_field_local() {
    let schema = json!([
        field("a", json!(null), json!([
            {"then": ["set a.visible = nope.value", "call_method nosuch()", "set b.value = 'ok'"]},
            {"if": "missing.value", "then": ["set b.required = true"]},
            {"then": ["set b.disabled = true"]}
        ])),
        field("b", json!(null), json!([])),
    ]);
    let mut engine = FormEngine::builder()
        .logger(buffer_sink())
        .load(&schema)
        .unwrap();

    engine.set_value("a", json!(1)).unwrap();
    let a = engine.get_field("a").unwrap();
    assert_eq!(
        a.errors,
        vec![
            "set a.visible = nope.value: unresolved reference `nope.value`",
            "call_method nosuch(): unknown method `nosuch`",
            "missing.value: unresolved reference `missing.value`",
        ]
    );
    let b = engine.get_field("b").unwrap();
    assert_eq!(b.value, json!("ok"));
    assert!(!b.required);
    assert!(b.disabled);
    assert!(b.errors.is_empty());
    assert!(engine
        .logger()
        .sink()
        .lines()
        .contains(&"[error] field `a`: call_method nosuch(): unknown method `nosuch`".to_string()));
}

#[test]
fn test_errors_cleared_when_rule_succeeds_again() {
    let schema = json!([
        field("a", json!(0), json!([{"then": ["set b.value = 10 / a.value"]}])),
        field("b", json!(null), json!([])),
    ]);
    let mut engine = FormEngine::builder()
        .logger(buffer_sink())
        .load(&schema)
        .unwrap();

    engine.set_value("a", json!(0)).unwrap();
    assert_eq!(engine.get_field("a").unwrap().errors.len(), 1);

    let report = engine.set_value("a", json!(2)).unwrap();
    assert!(engine.get_field("a").unwrap().errors.is_empty());
    assert_eq!(engine.get_value("b").unwrap(), &json!(5));
    assert_eq!(report.updated, vec!["a", "b"]);
}

#[test]
fn test_init_runs_init_lists_then_propagates() {
    let schema = json!([
        {"key": "b", "name": "B", "type": "text",
         "rules": [{"init": ["set b.value = 'seed'", "set b.options = ['x', 'y']"]}]},
        field("c", json!(null), json!([{"then": ["set c.value = b.value"]}])),
        field("d", json!(null), json!([{"then": ["set d.value = 'never'"]}])),
    ]);
    let mut engine = FormEngine::builder()
        .logger(buffer_sink())
        .load(&schema)
        .unwrap();

    let report = engine.init().unwrap();
    assert_eq!(engine.get_value("b").unwrap(), &json!("seed"));
    assert_eq!(engine.get_value("c").unwrap(), &json!("seed"));
    assert_eq!(engine.get_value("d").unwrap(), &Value::Null);
    assert_eq!(engine.get_field("b").unwrap().options.len(), 2);
    assert_eq!(report.updated, vec!["b", "c"]);
}

#[test]
fn test_multi_binding_writes_every_entry() {
    let schema = json!([
        field("region", json!("cn"), json!([{"then": [
            "call_method lookup(region).data -> { code.value: code, zone.options: zones, zone.colour: code }"
        ]}])),
        field("code", json!(null), json!([])),
        {"key": "zone", "name": "Zone", "type": "select"},
    ]);
    let mut engine = FormEngine::builder()
        .logger(buffer_sink())
        .method("lookup", |_| Ok(json!({"data": {"code": "CN", "zones": ["a", "b"]}})))
        .load(&schema)
        .unwrap();

    engine.set_value("region", json!("cn")).unwrap();
    assert_eq!(engine.get_value("code").unwrap(), &json!("CN"));
    let zone = engine.get_field("zone").unwrap();
    assert_eq!(
        serde_json::to_value(&zone.options).unwrap(),
        json!([{"label": "a", "value": "a"}, {"label": "b", "value": "b"}])
    );
    assert_eq!(engine.get_field("region").unwrap().errors.len(), 1);
}

#[test]
fn test_nested_conditional_actions() {
    let schema = json!([field("a", json!(0), json!([{"then": [
        "conditional_action if a.value > 10 then set b.value = 'big' elif a.value > 5 then if a.value == 7 then set b.value = 'seven' else set b.value = 'mid' else clear b.value"
    ]}])),
    field("b", json!("init"), json!([]))]);
    let mut engine = FormEngine::builder()
        .logger(buffer_sink())
        .load(&schema)
        .unwrap();

    for (input, expected) in [(11, "big"), (7, "seven"), (6, "mid"), (1, "init")] {
        engine.set_value("a", json!(input)).unwrap();
        assert_eq!(engine.get_value("b").unwrap(), &json!(expected), "a = {input}");
    }
}
