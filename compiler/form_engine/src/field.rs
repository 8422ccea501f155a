//! Field records and their read-only views.

use std::fmt;

use form_eval::value::display_value;
use form_eval::is_truthy;
use form_ir::FieldAttr;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{FormError, FormResult};

/// Closed set of field types.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Textarea,
    Number,
    Select,
    MultiSelect,
    Radio,
    Checkbox,
    Switch,
    Date,
    Hidden,
}

impl FieldType {
    pub const fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Number => "number",
            FieldType::Select => "select",
            FieldType::MultiSelect => "multi_select",
            FieldType::Radio => "radio",
            FieldType::Checkbox => "checkbox",
            FieldType::Switch => "switch",
            FieldType::Date => "date",
            FieldType::Hidden => "hidden",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One choice of a select-like field.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldOption {
    pub label: String,
    pub value: Value,
}

impl FieldOption {
    /// Scalars become `{label: str(x), value: x}`. Objects keep their
    /// `value` (or the whole object) and `label` (or the value's text).
    pub fn from_value(item: &Value) -> FieldOption {
        match item {
            Value::Object(map) => {
                let value = map.get("value").cloned().unwrap_or_else(|| item.clone());
                let label = map
                    .get("label")
                    .map_or_else(|| display_value(&value), display_value);
                FieldOption { label, value }
            }
            _ => FieldOption {
                label: display_value(item),
                value: item.clone(),
            },
        }
    }

    pub fn to_value(&self) -> Value {
        let mut map = serde_json::Map::new();
        map.insert("label".into(), Value::String(self.label.clone()));
        map.insert("value".into(), self.value.clone());
        Value::Object(map)
    }
}

/// Normalise an options value. A non-list yields no options.
pub fn normalize_options(value: &Value) -> Vec<FieldOption> {
    match value {
        Value::Array(items) => items.iter().map(FieldOption::from_value).collect(),
        _ => Vec::new(),
    }
}

/// The mutable attributes of a field.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldState {
    pub value: Value,
    pub options: Vec<FieldOption>,
    pub visible: bool,
    pub disabled: bool,
    pub required: bool,
    pub errors: Vec<String>,
}

/// A field record. Only the field store mutates it.
#[derive(Clone, Debug)]
pub struct Field {
    pub key: String,
    pub name: String,
    pub field_type: FieldType,
    pub description: String,
    pub data_source: Option<String>,
    pub render: bool,
    /// Declared dependency keys, as written in the schema.
    pub dependencies: Vec<String>,
    pub state: FieldState,
    /// State as declared at load time; `clear` restores from here.
    pub defaults: FieldState,
}

impl Field {
    /// Read one attribute as a JSON value.
    pub fn attr(&self, attr: FieldAttr) -> Value {
        let state = &self.state;
        match attr {
            FieldAttr::Value => state.value.clone(),
            FieldAttr::Visible => Value::Bool(state.visible),
            FieldAttr::Disabled => Value::Bool(state.disabled),
            FieldAttr::Required => Value::Bool(state.required),
            FieldAttr::Options => {
                Value::Array(state.options.iter().map(FieldOption::to_value).collect())
            }
            FieldAttr::Errors => Value::Array(
                state
                    .errors
                    .iter()
                    .map(|e| Value::String(e.clone()))
                    .collect(),
            ),
        }
    }

    /// Write one attribute. Flags take the truthiness of `value`; options
    /// are normalised. Returns whether the stored state changed.
    pub fn write_attr(&mut self, attr: FieldAttr, value: Value) -> FormResult<bool> {
        let state = &mut self.state;
        let changed = match attr {
            FieldAttr::Value => replace(&mut state.value, value),
            FieldAttr::Visible => replace(&mut state.visible, is_truthy(&value)),
            FieldAttr::Disabled => replace(&mut state.disabled, is_truthy(&value)),
            FieldAttr::Required => replace(&mut state.required, is_truthy(&value)),
            FieldAttr::Options => replace(&mut state.options, normalize_options(&value)),
            FieldAttr::Errors => {
                return Err(FormError::InvalidAttribute {
                    key: self.key.clone(),
                    attr: attr.as_str().to_string(),
                })
            }
        };
        Ok(changed)
    }

    /// Restore one attribute to its declared default.
    pub fn reset_attr(&mut self, attr: FieldAttr) -> FormResult<bool> {
        let defaults = &self.defaults;
        let state = &mut self.state;
        let changed = match attr {
            FieldAttr::Value => replace(&mut state.value, defaults.value.clone()),
            FieldAttr::Visible => replace(&mut state.visible, defaults.visible),
            FieldAttr::Disabled => replace(&mut state.disabled, defaults.disabled),
            FieldAttr::Required => replace(&mut state.required, defaults.required),
            FieldAttr::Options => replace(&mut state.options, defaults.options.clone()),
            FieldAttr::Errors => {
                return Err(FormError::InvalidAttribute {
                    key: self.key.clone(),
                    attr: attr.as_str().to_string(),
                })
            }
        };
        Ok(changed)
    }

    /// Empty the errors list. Returns whether it had entries.
    pub fn clear_errors(&mut self) -> bool {
        let had = !self.state.errors.is_empty();
        self.state.errors.clear();
        had
    }

    pub fn push_error(&mut self, message: String) {
        self.state.errors.push(message);
    }

    pub fn view(&self) -> FieldView {
        FieldView {
            key: self.key.clone(),
            name: self.name.clone(),
            field_type: self.field_type,
            description: self.description.clone(),
            value: self.state.value.clone(),
            options: self.state.options.clone(),
            visible: self.state.visible,
            disabled: self.state.disabled,
            required: self.state.required,
            errors: self.state.errors.clone(),
            render: self.render,
            data_source: self.data_source.clone(),
        }
    }

    pub fn agent_view(&self) -> AgentFieldView {
        AgentFieldView {
            key: self.key.clone(),
            name: self.name.clone(),
            value: self.state.value.clone(),
            field_type: self.field_type,
            errors: self.state.errors.clone(),
            required: self.state.required,
            description: self.description.clone(),
            options: self.state.options.clone(),
        }
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

/// Read-only snapshot of one field.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FieldView {
    pub key: String,
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub description: String,
    pub value: Value,
    pub options: Vec<FieldOption>,
    pub visible: bool,
    pub disabled: bool,
    pub required: bool,
    pub errors: Vec<String>,
    pub render: bool,
    /// Where the host loads options from; opaque to the engine.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
}

/// Compact field summary for a conversational agent.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AgentFieldView {
    pub key: String,
    pub name: String,
    pub value: Value,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub errors: Vec<String>,
    pub required: bool,
    pub description: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
}
