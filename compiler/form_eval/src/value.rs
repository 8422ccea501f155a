//! Value semantics for rule expressions.
//!
//! Runtime values are plain `serde_json::Value`s. This module holds the
//! rules the evaluator applies on top of them: truthiness, loose numeric
//! equality, ordering, display, and path indexing.

use std::cmp::Ordering;

use serde_json::Value;

/// A number pulled out of a JSON value.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    pub(crate) fn of(value: &Value) -> Option<Num> {
        let Value::Number(n) = value else {
            return None;
        };
        if let Some(i) = n.as_i64() {
            Some(Num::Int(i))
        } else {
            n.as_f64().map(Num::Float)
        }
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "mixed int/float arithmetic promotes to f64"
    )]
    pub(crate) fn as_f64(self) -> f64 {
        match self {
            Num::Int(i) => i as f64,
            Num::Float(f) => f,
        }
    }

    pub(crate) fn is_zero(self) -> bool {
        match self {
            Num::Int(i) => i == 0,
            Num::Float(f) => f == 0.0,
        }
    }

    pub(crate) fn into_value(self) -> Value {
        match self {
            Num::Int(i) => Value::from(i),
            // NaN and infinities have no JSON form; they become null.
            Num::Float(f) => Value::from(f),
        }
    }
}

/// Falsy: `null`, `false`, numeric zero, `""`. Everything else is truthy,
/// including empty lists and objects.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(_) => Num::of(value).is_some_and(|n| !n.is_zero()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Whether a value counts as "no input" for required-field checks:
/// `null`, `""`, or `[]`.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

/// Equality with `1 == 1.0`. Lists and objects compare structurally.
pub fn loose_eq(left: &Value, right: &Value) -> bool {
    match (Num::of(left), Num::of(right)) {
        (Some(Num::Int(a)), Some(Num::Int(b))) => a == b,
        (Some(a), Some(b)) => a.as_f64() == b.as_f64(),
        _ => match (left, right) {
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| loose_eq(x, y))
            }
            _ => left == right,
        },
    }
}

/// Ordering for `<`, `<=`, `>`, `>=`: numbers with numbers, strings with
/// strings. `None` for any other pairing.
pub fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (Num::of(left), Num::of(right)) {
        (Some(Num::Int(a)), Some(Num::Int(b))) => Some(a.cmp(&b)),
        (Some(a), Some(b)) => a.as_f64().partial_cmp(&b.as_f64()),
        _ => match (left, right) {
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => None,
        },
    }
}

/// Text form used by interpolation and string concatenation.
///
/// Strings are inserted without quotes, `null` as the empty string, and
/// everything else as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Short type name for error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

/// Step into `value` by one path segment: an object key or a list index.
/// Anything missing yields `null`.
pub fn index_value(value: &Value, segment: &str) -> Value {
    match value {
        Value::Object(map) => map.get(segment).cloned().unwrap_or(Value::Null),
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(|i| items.get(i))
            .cloned()
            .unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

/// Step through every segment of `segments`.
pub fn project<S: AsRef<str>>(value: &Value, segments: &[S]) -> Value {
    let mut current = value.clone();
    for segment in segments {
        current = index_value(&current, segment.as_ref());
    }
    current
}
