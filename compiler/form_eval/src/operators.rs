//! Binary and unary operator implementations.
//!
//! Direct enum dispatch over the closed operator set. `and` / `or` are not
//! here: they short-circuit, so the evaluator handles them before the
//! right operand is evaluated.

use std::cmp::Ordering;

use form_ir::{BinaryOp, UnaryOp};
use serde_json::Value;

use crate::errors::{binary_type_mismatch, integer_overflow, unary_type_mismatch};
use crate::value::{compare, display_value, is_truthy, loose_eq, type_name, Num};
use crate::{EvalError, EvalResult};

/// Evaluate a non-short-circuit binary operation.
pub fn evaluate_binary(left: &Value, right: &Value, op: BinaryOp) -> EvalResult {
    match op {
        BinaryOp::Add => eval_add(left, right),
        BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            match (Num::of(left), Num::of(right)) {
                (Some(a), Some(b)) => eval_numeric(a, b, op),
                _ => Err(mismatch(op, left, right)),
            }
        }
        BinaryOp::Eq => Ok(Value::Bool(loose_eq(left, right))),
        BinaryOp::NotEq => Ok(Value::Bool(!loose_eq(left, right))),
        BinaryOp::Lt | BinaryOp::LtEq | BinaryOp::Gt | BinaryOp::GtEq => {
            let ordering = compare(left, right).ok_or_else(|| mismatch(op, left, right))?;
            let result = match op {
                BinaryOp::Lt => ordering == Ordering::Less,
                BinaryOp::LtEq => ordering != Ordering::Greater,
                BinaryOp::Gt => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            };
            Ok(Value::Bool(result))
        }
        BinaryOp::In => contains(right, left).map(Value::Bool),
        BinaryOp::NotIn => contains(right, left).map(|found| Value::Bool(!found)),
        // Reached only when a caller skips short-circuiting; both sides
        // are already evaluated, so pick the deciding operand.
        BinaryOp::And => Ok(if is_truthy(left) {
            right.clone()
        } else {
            left.clone()
        }),
        BinaryOp::Or => Ok(if is_truthy(left) {
            left.clone()
        } else {
            right.clone()
        }),
    }
}

/// Evaluate a unary operation.
pub fn evaluate_unary(operand: &Value, op: UnaryOp) -> EvalResult {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!is_truthy(operand))),
        UnaryOp::Neg => match Num::of(operand) {
            Some(Num::Int(i)) => i
                .checked_neg()
                .map(Value::from)
                .ok_or_else(|| integer_overflow("-")),
            Some(Num::Float(f)) => Ok(Num::Float(-f).into_value()),
            None => Err(unary_type_mismatch("-", type_name(operand))),
        },
    }
}

fn mismatch(op: BinaryOp, left: &Value, right: &Value) -> EvalError {
    binary_type_mismatch(op.as_symbol(), type_name(left), type_name(right))
}

/// `+`: numbers add, lists concatenate, and a string on either side
/// concatenates the display forms.
fn eval_add(left: &Value, right: &Value) -> EvalResult {
    if let (Some(a), Some(b)) = (Num::of(left), Num::of(right)) {
        return eval_numeric(a, b, BinaryOp::Add);
    }
    match (left, right) {
        (Value::String(_), _) | (_, Value::String(_)) => Ok(Value::String(format!(
            "{}{}",
            display_value(left),
            display_value(right)
        ))),
        (Value::Array(a), Value::Array(b)) => {
            Ok(Value::Array(a.iter().chain(b).cloned().collect()))
        }
        _ => Err(mismatch(BinaryOp::Add, left, right)),
    }
}

fn eval_numeric(a: Num, b: Num, op: BinaryOp) -> EvalResult {
    if let (Num::Int(a), Num::Int(b)) = (a, b) {
        return eval_int(a, b, op);
    }
    let (a, b) = (a.as_f64(), b.as_f64());
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div if b == 0.0 => return Err(EvalError::DivisionByZero),
        BinaryOp::Div => a / b,
        BinaryOp::Mod if b == 0.0 => return Err(EvalError::DivisionByZero),
        BinaryOp::Mod => a.rem_euclid(b),
        _ => return Err(binary_type_mismatch(op.as_symbol(), "float", "float")),
    };
    Ok(Num::Float(result).into_value())
}

fn eval_int(a: i64, b: i64, op: BinaryOp) -> EvalResult {
    let checked = |result: Option<i64>| {
        result
            .map(Value::from)
            .ok_or_else(|| integer_overflow(op.as_symbol()))
    };
    match op {
        BinaryOp::Add => checked(a.checked_add(b)),
        BinaryOp::Sub => checked(a.checked_sub(b)),
        BinaryOp::Mul => checked(a.checked_mul(b)),
        BinaryOp::Div | BinaryOp::Mod if b == 0 => Err(EvalError::DivisionByZero),
        // Exact quotients stay integers; anything else becomes a float.
        BinaryOp::Div if a.checked_rem(b) == Some(0) => checked(a.checked_div(b)),
        BinaryOp::Div => {
            let quotient = Num::Int(a).as_f64() / Num::Int(b).as_f64();
            Ok(Num::Float(quotient).into_value())
        }
        BinaryOp::Mod => checked(a.checked_rem_euclid(b)),
        _ => Err(binary_type_mismatch(op.as_symbol(), "int", "int")),
    }
}

/// Membership: element of a list, substring of a string, key of an object.
/// Nothing is a member of `null`.
fn contains(haystack: &Value, needle: &Value) -> Result<bool, EvalError> {
    match haystack {
        Value::Array(items) => Ok(items.iter().any(|item| loose_eq(item, needle))),
        Value::String(s) => match needle {
            Value::String(sub) => Ok(s.contains(sub.as_str())),
            _ => Err(binary_type_mismatch("in", type_name(needle), "str")),
        },
        Value::Object(map) => match needle {
            Value::String(key) => Ok(map.contains_key(key)),
            _ => Ok(false),
        },
        Value::Null => Ok(false),
        _ => Err(binary_type_mismatch(
            "in",
            type_name(needle),
            type_name(haystack),
        )),
    }
}
