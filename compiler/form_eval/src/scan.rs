//! Static reference scan.
//!
//! Walks compiled expressions and instructions and reports every path they
//! read and every method they call. The engine turns the paths into
//! dependency-graph edges at load time.

use form_ir::{ExprArena, ExprId, ExprKind, Instruction, InterpPart, Path};

/// Everything one rule (or one expression) refers to.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct References {
    /// Paths read by expressions, in source order.
    pub paths: Vec<Path>,
    /// Method names called, in source order.
    pub calls: Vec<String>,
}

impl References {
    pub fn new() -> Self {
        References::default()
    }

    /// Record every reference inside expression `id`.
    pub fn scan_expr(&mut self, arena: &ExprArena, id: ExprId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            match &arena.get_expr(id).kind {
                ExprKind::Null
                | ExprKind::Bool(_)
                | ExprKind::Int(_)
                | ExprKind::Float(_)
                | ExprKind::Str(_) => {}
                ExprKind::Interpolated(parts) => {
                    for part in parts.iter().rev() {
                        if let InterpPart::Expr(expr) = part {
                            stack.push(*expr);
                        }
                    }
                }
                ExprKind::List(items) => stack.extend(items.iter().rev().copied()),
                ExprKind::Path(path) => self.paths.push(path.clone()),
                ExprKind::Unary { operand, .. } => stack.push(*operand),
                ExprKind::Binary { left, right, .. } => {
                    stack.push(*right);
                    stack.push(*left);
                }
                ExprKind::Call { name, args } => {
                    self.calls.push(name.clone());
                    stack.extend(args.iter().rev().map(|arg| arg.value));
                }
            }
        }
    }

    /// Record every reference inside an instruction, including nested
    /// conditional branches. Write targets and bound temps are not reads.
    pub fn scan_instruction(&mut self, arena: &ExprArena, instruction: &Instruction) {
        match instruction {
            Instruction::Set { value, .. } => self.scan_expr(arena, *value),
            Instruction::Clear { .. } => {}
            Instruction::CallMethod { call, .. } | Instruction::CallMethodToTemp { call, .. } => {
                self.calls.push(call.method.clone());
                for arg in &call.args {
                    self.scan_expr(arena, arg.value);
                }
            }
            Instruction::Conditional(action) => {
                for branch in &action.branches {
                    self.scan_expr(arena, branch.condition);
                    self.scan_instruction(arena, &branch.action);
                }
                if let Some(otherwise) = &action.otherwise {
                    self.scan_instruction(arena, otherwise);
                }
            }
        }
    }
}
