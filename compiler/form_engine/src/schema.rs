//! Schema documents as written by form authors.
//!
//! Two shapes are accepted: a bare list of field definitions, or
//! `{ "fields": [...], "submit": {...} }`. The `submit` object becomes a
//! trailing hidden field that is never rendered.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::field::FieldType;
use crate::{FormError, FormResult};

/// Key given to a `submit` definition that names none.
pub const DEFAULT_SUBMIT_KEY: &str = "can_submit";

/// One field as declared in a schema.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct FieldDef {
    pub key: String,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub value: Value,
    #[serde(default)]
    pub options: Option<Value>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub rules: Vec<RuleDef>,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub disabled: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_true")]
    pub render: bool,
    #[serde(default)]
    pub data_source: Option<String>,
}

/// `{ if, then, elif: [{if, then}], else, init }`
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDef {
    #[serde(rename = "if", default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub then: Vec<String>,
    #[serde(default)]
    pub elif: Vec<BranchDef>,
    #[serde(rename = "else", default)]
    pub otherwise: Option<Vec<String>>,
    #[serde(default)]
    pub init: Vec<String>,
}

/// One `elif` entry.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BranchDef {
    #[serde(rename = "if", default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub then: Vec<String>,
}

fn default_true() -> bool {
    true
}

/// Split a schema document into field definitions, in declaration order.
pub fn parse_schema(schema: &Value) -> FormResult<Vec<FieldDef>> {
    match schema {
        Value::Array(items) => parse_fields(items),
        Value::Object(doc) => {
            let mut defs = match doc.get("fields") {
                Some(Value::Array(items)) => parse_fields(items)?,
                Some(_) => return Err(FormError::Schema("`fields` must be a list".into())),
                None => Vec::new(),
            };
            match doc.get("submit") {
                Some(Value::Object(submit)) => defs.push(parse_submit(submit)?),
                Some(Value::Null) | None => {}
                Some(_) => return Err(FormError::Schema("`submit` must be an object".into())),
            }
            Ok(defs)
        }
        _ => Err(FormError::Schema(
            "schema must be a list of fields or an object with `fields`".into(),
        )),
    }
}

fn parse_fields(items: &[Value]) -> FormResult<Vec<FieldDef>> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            FieldDef::deserialize(item).map_err(|err| {
                let key = item.get("key").and_then(Value::as_str).unwrap_or("?");
                FormError::Schema(format!("field #{i} (`{key}`): {err}"))
            })
        })
        .collect()
}

/// Fill the submit defaults, then parse as an ordinary field.
fn parse_submit(submit: &Map<String, Value>) -> FormResult<FieldDef> {
    let mut submit = submit.clone();
    let key = submit
        .entry("key")
        .or_insert_with(|| Value::String(DEFAULT_SUBMIT_KEY.into()))
        .clone();
    submit.entry("name").or_insert(key);
    submit
        .entry("type")
        .or_insert_with(|| Value::String(FieldType::Hidden.as_str().into()));
    submit.entry("visible").or_insert(Value::Bool(false));
    submit.entry("render").or_insert(Value::Bool(false));

    FieldDef::deserialize(Value::Object(submit))
        .map_err(|err| FormError::Schema(format!("submit: {err}")))
}
