//! Parsed rule instructions.
//!
//! One action string compiles to one `Instruction`. Field targets stay as
//! raw paths here; splitting `app.name.required` into key and attribute
//! needs the schema's key set and happens in the engine.

use crate::{CallArg, ExprId, Path, Span};

/// Write target of `set` / `clear` / a result binding: `<field>.<attr>`.
#[derive(Clone, Debug, PartialEq)]
pub struct Target {
    pub path: Path,
    pub span: Span,
}

/// A method invocation: `name(args...)`.
#[derive(Clone, Debug, PartialEq)]
pub struct CallSpec {
    pub method: String,
    pub args: Vec<CallArg>,
    pub span: Span,
}

/// Where a `call_method` result goes when it is not discarded.
#[derive(Clone, Debug, PartialEq)]
pub enum ResultBinding {
    /// `call_method f(x).data.items -> svc.options`
    Field { projection: Path, target: Target },
    /// `call_method f(x) -> { a.value: data.a, b.required: ok }`
    Multi(Vec<(Target, Path)>),
}

/// One `if <cond> then <action>` arm of a conditional action.
#[derive(Clone, Debug, PartialEq)]
pub struct ConditionalBranch {
    pub condition: ExprId,
    pub action: Box<Instruction>,
}

/// Inline `if .. then .. elif .. then .. else ..`.
#[derive(Clone, Debug, PartialEq)]
pub struct ConditionalAction {
    pub branches: Vec<ConditionalBranch>,
    pub otherwise: Option<Box<Instruction>>,
}

/// One parsed action.
#[derive(Clone, Debug, PartialEq)]
pub enum Instruction {
    Set {
        target: Target,
        value: ExprId,
    },
    Clear {
        target: Target,
    },
    CallMethod {
        call: CallSpec,
        bind: Option<ResultBinding>,
    },
    CallMethodToTemp {
        temp: String,
        call: CallSpec,
    },
    Conditional(ConditionalAction),
}

impl Instruction {
    /// Keyword that introduces this instruction in source form.
    pub fn keyword(&self) -> &'static str {
        match self {
            Instruction::Set { .. } => "set",
            Instruction::Clear { .. } => "clear",
            Instruction::CallMethod { .. } => "call_method",
            Instruction::CallMethodToTemp { .. } => "call_method_to_temp",
            Instruction::Conditional(_) => "conditional_action",
        }
    }
}
