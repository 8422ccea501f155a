//! Evaluator tests.
//!
//! - `interpreter`: expression evaluation against a map-backed context
//! - `scan`: static reference collection
//! - `properties`: proptest checks of value semantics

mod scan;

use form_ir::FieldAttr;
use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::{CallArgs, EvalContext, EvalError, MethodRegistry};

/// Field state held in plain maps.
#[derive(Default)]
pub(crate) struct MapContext {
    pub fields: FxHashMap<String, FxHashMap<FieldAttr, Value>>,
    pub temps: FxHashMap<String, Value>,
    pub methods: MethodRegistry,
    pub calls: Vec<String>,
}

impl MapContext {
    pub fn field(mut self, key: &str, value: Value) -> Self {
        let mut attrs = FxHashMap::default();
        attrs.insert(FieldAttr::Value, value);
        attrs.insert(FieldAttr::Visible, Value::Bool(true));
        attrs.insert(FieldAttr::Required, Value::Bool(false));
        attrs.insert(FieldAttr::Disabled, Value::Bool(false));
        attrs.insert(FieldAttr::Options, Value::Array(Vec::new()));
        attrs.insert(FieldAttr::Errors, Value::Array(Vec::new()));
        self.fields.insert(key.to_string(), attrs);
        self
    }

    pub fn temp(mut self, name: &str, value: Value) -> Self {
        self.temps.insert(name.to_string(), value);
        self
    }
}

impl EvalContext for MapContext {
    fn key_separator(&self) -> &str {
        "."
    }

    fn temp(&self, name: &str) -> Option<&Value> {
        self.temps.get(name)
    }

    fn has_field(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    fn field_attr(&self, key: &str, attr: FieldAttr) -> Option<Value> {
        self.fields.get(key)?.get(&attr).cloned()
    }

    fn has_method(&self, name: &str) -> bool {
        self.methods.contains(name)
    }

    fn call_method(&mut self, name: &str, args: CallArgs) -> Result<Value, EvalError> {
        self.calls.push(name.to_string());
        self.methods.invoke(name, &args).map(|outcome| outcome.value)
    }
}
