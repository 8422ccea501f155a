//! Tree-walking expression evaluator.

use form_ir::{BinaryOp, ExprArena, ExprId, ExprKind, InterpPart};
use form_parse::ensure_sufficient_stack;
use serde_json::Value;

use crate::context::resolve_path;
use crate::operators::{evaluate_binary, evaluate_unary};
use crate::value::{display_value, is_truthy};
use crate::{CallArgs, EvalContext, EvalError, EvalResult};

/// Evaluates expressions from one arena against one context.
pub struct Evaluator<'a, C: EvalContext + ?Sized> {
    arena: &'a ExprArena,
    ctx: &'a mut C,
}

impl<'a, C: EvalContext + ?Sized> Evaluator<'a, C> {
    pub fn new(arena: &'a ExprArena, ctx: &'a mut C) -> Self {
        Evaluator { arena, ctx }
    }

    /// Evaluate an expression.
    pub fn eval(&mut self, id: ExprId) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_inner(id))
    }

    fn eval_inner(&mut self, id: ExprId) -> EvalResult {
        let arena = self.arena;
        match &arena.get_expr(id).kind {
            ExprKind::Null => Ok(Value::Null),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            ExprKind::Int(n) => Ok(Value::from(*n)),
            ExprKind::Float(f) => Ok(Value::from(*f)),
            ExprKind::Str(s) => Ok(Value::String(s.clone())),
            ExprKind::Interpolated(parts) => {
                let mut out = String::new();
                for part in parts {
                    match part {
                        InterpPart::Text(text) => out.push_str(text),
                        InterpPart::Expr(expr) => out.push_str(&display_value(&self.eval(*expr)?)),
                    }
                }
                Ok(Value::String(out))
            }
            ExprKind::List(items) => items
                .iter()
                .map(|item| self.eval(*item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            ExprKind::Path(path) => resolve_path(&*self.ctx, path),
            ExprKind::Unary { op, operand } => {
                let value = self.eval(*operand)?;
                evaluate_unary(&value, *op)
            }
            ExprKind::Binary { op, left, right } => self.eval_binary(*op, *left, *right),
            ExprKind::Call { name, args } => {
                let mut evaluated = CallArgs::new();
                for arg in args {
                    let value = self.eval(arg.value)?;
                    match &arg.name {
                        Some(n) => evaluated.named.push((n.clone(), value)),
                        None => evaluated.positional.push(value),
                    }
                }
                self.call(name, evaluated)
            }
        }
    }

    fn eval_binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> EvalResult {
        let left = self.eval(left)?;
        // Short-circuit: return the deciding operand.
        match op {
            BinaryOp::And if !is_truthy(&left) => return Ok(left),
            BinaryOp::Or if is_truthy(&left) => return Ok(left),
            BinaryOp::And | BinaryOp::Or => return self.eval(right),
            _ => {}
        }
        let right = self.eval(right)?;
        evaluate_binary(&left, &right, op)
    }

    fn call(&mut self, name: &str, args: CallArgs) -> EvalResult {
        if self.ctx.has_method(name) {
            return self.ctx.call_method(name, args);
        }
        if self.ctx.temp(name).is_some() || self.ctx.has_field(name) {
            Err(EvalError::NotCallable(name.to_string()))
        } else {
            Err(EvalError::UnknownMethod(name.to_string()))
        }
    }
}

/// Evaluate `id` against `ctx`.
pub fn evaluate<C>(arena: &ExprArena, id: ExprId, ctx: &mut C) -> EvalResult
where
    C: EvalContext + ?Sized,
{
    Evaluator::new(arena, ctx).eval(id)
}
