//! Form IR - shared types for the form rule engine.
//!
//! Rule conditions and action strings are compiled once, at schema load
//! time, into the flat representation defined here:
//!
//! - `Span`: byte range inside the source string of a condition or action
//! - `ExprArena` / `ExprId`: flat expression AST (no `Box<Expr>`)
//! - `BinaryOp` / `UnaryOp`: the closed operator set
//! - `FieldAttr`: the attributes an expression may read or an action may write
//! - `Instruction`: one parsed action (`set`, `clear`, `call_method`, ...)
//!
//! Nothing in this crate knows about field storage or evaluation.

mod ast;
mod attr;
mod instr;
mod operators;
mod span;

pub use ast::{CallArg, Expr, ExprArena, ExprId, ExprKind, InterpPart, Path};
pub use attr::FieldAttr;
pub use instr::{
    CallSpec, ConditionalAction, ConditionalBranch, Instruction, ResultBinding, Target,
};
pub use operators::{BinaryOp, UnaryOp};
pub use span::Span;
