//! Sandboxed evaluator for form rule expressions.
//!
//! Expressions can read field attributes and temp variables, apply the
//! closed operator set, and call methods from a host-supplied
//! [`MethodRegistry`]. There is no other way out of the sandbox.
//!
//! Values are `serde_json::Value`s; the semantics layered on top of them
//! (truthiness, loose equality, ordering) live in [`value`].

mod context;
mod errors;
mod interpreter;
mod methods;
mod operators;
mod scan;
pub mod value;

pub use context::{match_field, resolve_path, EvalContext, FieldRef};
pub use errors::{EvalError, EvalResult};
pub use interpreter::{evaluate, Evaluator};
pub use methods::{CallArgs, MethodCall, MethodFn, MethodOutcome, MethodRegistry};
pub use operators::{evaluate_binary, evaluate_unary};
pub use scan::References;
pub use value::{is_truthy, loose_eq};

#[cfg(test)]
mod tests;
