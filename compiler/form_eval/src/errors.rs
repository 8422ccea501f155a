//! Evaluation errors.

/// A failure while evaluating one expression.
///
/// These are field-local: the engine records them on the field whose rule
/// was running and carries on with the rest of the cascade.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error("unresolved reference `{0}`")]
    UnresolvedReference(String),

    #[error("unknown method `{0}`")]
    UnknownMethod(String),

    #[error("method `{method}` failed: {message}")]
    MethodFailed { method: String, message: String },

    #[error("type mismatch: {0}")]
    TypeMismatch(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("`{0}` is not callable")]
    NotCallable(String),
}

/// Result of evaluating an expression or operator.
pub type EvalResult = Result<serde_json::Value, EvalError>;

// Constructors used by the operator tables.

pub(crate) fn binary_type_mismatch(op: &str, left: &str, right: &str) -> EvalError {
    EvalError::TypeMismatch(format!("cannot apply `{op}` to {left} and {right}"))
}

pub(crate) fn unary_type_mismatch(op: &str, operand: &str) -> EvalError {
    EvalError::TypeMismatch(format!("cannot apply `{op}` to {operand}"))
}

pub(crate) fn integer_overflow(op: &str) -> EvalError {
    EvalError::TypeMismatch(format!("integer overflow in `{op}`"))
}
