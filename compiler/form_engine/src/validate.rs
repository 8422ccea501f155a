//! Required-field validation and submit readiness.

use std::collections::BTreeMap;

use form_eval::value::is_empty_value;
use serde::Serialize;

use crate::store::FieldStore;
use crate::CascadeReport;

/// Fallback message when the submit field is false but no rule said why.
pub const NOT_READY_MESSAGE: &str = "conditions not met; cannot submit yet";

/// Outcome of [`FormEngine::validate`](crate::FormEngine::validate).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub valid: bool,
    /// `key -> message` for every invalid field.
    pub errors: BTreeMap<String, String>,
    /// Invalid keys in declaration order.
    pub invalid_fields: Vec<String>,
}

/// Outcome of [`FormEngine::check_submit`](crate::FormEngine::check_submit).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SubmitOutcome {
    pub can_submit: bool,
    pub submit_key: String,
    /// Why submission is blocked; empty when `can_submit`.
    pub errors: Vec<String>,
    /// Cascade triggered by re-running the submit field's rules.
    pub report: CascadeReport,
}

/// A visible, required field holding `null`, `""` or `[]` is invalid.
pub(crate) fn validate(store: &FieldStore) -> Validation {
    let mut validation = Validation {
        valid: true,
        ..Validation::default()
    };
    for field in store.iter() {
        let state = &field.state;
        if state.visible && state.required && is_empty_value(&state.value) {
            validation
                .errors
                .insert(field.key.clone(), format!("{} is required", field.name));
            validation.invalid_fields.push(field.key.clone());
            validation.valid = false;
        }
    }
    validation
}
