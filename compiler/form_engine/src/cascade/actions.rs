//! Instruction execution.

use form_eval::value::project;
use form_eval::{evaluate, is_truthy, CallArgs, EvalContext, EvalError, MethodRegistry};
use form_ir::{CallSpec, ExprId, FieldAttr};
use form_parse::ensure_sufficient_stack;
use rustc_hash::FxHashMap;
use serde_json::Value;

use super::Cascade;
use crate::program::{Binding, Op, WriteTarget};
use crate::store::FieldStore;
use crate::{FormError, FormResult};

/// Read-only view of engine state for one expression evaluation.
///
/// Method calls made during the evaluation may request value writes; they
/// are collected here and applied once the evaluation finishes.
struct Scope<'s> {
    store: &'s FieldStore,
    temps: &'s FxHashMap<String, Value>,
    methods: &'s MethodRegistry,
    sep: &'s str,
    writes: Vec<(String, Value)>,
}

impl EvalContext for Scope<'_> {
    fn key_separator(&self) -> &str {
        self.sep
    }

    fn temp(&self, name: &str) -> Option<&Value> {
        self.temps.get(name)
    }

    fn has_field(&self, key: &str) -> bool {
        self.store.contains(key)
    }

    fn field_attr(&self, key: &str, attr: FieldAttr) -> Option<Value> {
        self.store.get(key).map(|field| field.attr(attr))
    }

    fn has_method(&self, name: &str) -> bool {
        self.methods.contains(name)
    }

    fn call_method(&mut self, name: &str, args: CallArgs) -> Result<Value, EvalError> {
        let outcome = self.methods.invoke(name, &args)?;
        self.writes.extend(outcome.writes);
        Ok(outcome.value)
    }
}

impl Cascade<'_> {
    /// Execute one action on behalf of field `owner`.
    pub(super) fn execute(&mut self, owner: usize, op: &Op) -> FormResult<()> {
        match op {
            Op::Set { target, value } => {
                let value = self.eval(owner, *value)?;
                self.write(target, value)
            }
            Op::Clear { target } => self.clear(target),
            Op::Call { call, bind } => {
                let result = self.call(owner, call)?;
                self.bind(bind, &result)
            }
            Op::Conditional {
                branches,
                otherwise,
            } => {
                for (condition, action) in branches {
                    if is_truthy(&self.eval(owner, *condition)?) {
                        return ensure_sufficient_stack(|| self.execute(owner, action));
                    }
                }
                match otherwise {
                    Some(action) => ensure_sufficient_stack(|| self.execute(owner, action)),
                    None => Ok(()),
                }
            }
        }
    }

    /// Evaluate an expression against the current state and temp scope.
    pub(super) fn eval(&mut self, owner: usize, id: ExprId) -> FormResult<Value> {
        let mut scope = Scope {
            store: &*self.store,
            temps: &self.temps,
            methods: self.methods,
            sep: self.sep,
            writes: Vec::new(),
        };
        let result = evaluate(&self.program.arena, id, &mut scope);
        let writes = scope.writes;
        self.apply_requested_writes(owner, writes);
        result.map_err(FormError::from)
    }

    fn call(&mut self, owner: usize, call: &CallSpec) -> FormResult<Value> {
        let mut args = CallArgs::new();
        for arg in &call.args {
            let value = self.eval(owner, arg.value)?;
            match &arg.name {
                Some(name) => args.named.push((name.clone(), value)),
                None => args.positional.push(value),
            }
        }

        self.logger.debug_with(|| {
            format!(
                "`{}` calls `{}` with {} argument(s)",
                self.store.key(owner),
                call.method,
                args.len()
            )
        });
        let outcome = self.methods.invoke(&call.method, &args)?;
        self.apply_requested_writes(owner, outcome.writes);
        Ok(outcome.value)
    }

    /// Apply `set_value` requests made by a method body. They join the
    /// running cascade instead of starting a nested one.
    fn apply_requested_writes(&mut self, owner: usize, writes: Vec<(String, Value)>) {
        for (key, value) in writes {
            let Some(idx) = self.store.index_of(&key) else {
                let err = FormError::UnknownField(key);
                self.record_failure(owner, "set_value", &err);
                continue;
            };
            if matches!(
                self.store.field_mut(idx).write_attr(FieldAttr::Value, value),
                Ok(true)
            ) {
                tracing::debug!(field = %key, "value set by method");
                self.mark_changed(idx, None);
            }
        }
    }

    fn write(&mut self, target: &WriteTarget, value: Value) -> FormResult<()> {
        match target {
            WriteTarget::Field { idx, attr } => {
                if self.store.field_mut(*idx).write_attr(*attr, value)? {
                    self.log_write(*idx, *attr);
                    self.mark_changed(*idx, self.current);
                }
                Ok(())
            }
            WriteTarget::Temp(name) => {
                self.temps.insert(name.clone(), value);
                Ok(())
            }
            WriteTarget::Invalid(err) => Err(err.clone()),
        }
    }

    fn clear(&mut self, target: &WriteTarget) -> FormResult<()> {
        match target {
            WriteTarget::Field { idx, attr } => {
                if self.store.field_mut(*idx).reset_attr(*attr)? {
                    self.log_write(*idx, *attr);
                    self.mark_changed(*idx, self.current);
                }
                Ok(())
            }
            WriteTarget::Temp(name) => {
                self.temps.remove(name);
                Ok(())
            }
            WriteTarget::Invalid(err) => Err(err.clone()),
        }
    }

    /// Route a method result. A multi-binding writes every entry it can and
    /// reports the first failure.
    fn bind(&mut self, bind: &Binding, result: &Value) -> FormResult<()> {
        match bind {
            Binding::Discard => Ok(()),
            Binding::Temp { name, projection } => {
                self.temps
                    .insert(name.clone(), project(result, projection.segments()));
                Ok(())
            }
            Binding::Field { target, projection } => {
                self.write(target, project(result, projection.segments()))
            }
            Binding::Multi(entries) => {
                let mut first_error = None;
                for (target, source) in entries {
                    if let Err(err) = self.write(target, project(result, source.segments())) {
                        first_error.get_or_insert(err);
                    }
                }
                first_error.map_or(Ok(()), Err)
            }
        }
    }

    fn log_write(&self, idx: usize, attr: FieldAttr) {
        self.logger.debug_with(|| {
            let field = self.store.field(idx);
            format!("set `{}`.{} = {}", field.key, attr.as_str(), field.attr(attr))
        });
    }
}
