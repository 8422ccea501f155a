//! Rule evaluation for one field.

use form_eval::is_truthy;

use super::Cascade;
use crate::program::{Action, Rule};
use crate::FormError;

impl Cascade<'_> {
    /// Evaluate every rule of field `idx`, in declaration order.
    pub(super) fn run_field(&mut self, idx: usize) {
        self.evaluations[idx] = self.evaluations[idx].saturating_add(1);
        self.ran[idx] = true;
        if self.store.field_mut(idx).clear_errors() {
            self.updated[idx] = true;
        }

        let program = self.program;
        let rules = &program.rules[idx];
        if rules.is_empty() {
            return;
        }
        self.logger.debug_with(|| {
            format!(
                "pass {}: evaluating {} rule(s) of `{}`",
                self.passes,
                rules.len(),
                self.store.key(idx)
            )
        });

        let previous = self.current.replace(idx);
        for rule in rules {
            self.run_rule(idx, rule);
        }
        self.current = previous;
    }

    /// Run every rule's `init` list in declaration order, outside any pass.
    pub(crate) fn run_init(&mut self) {
        let program = self.program;
        for (idx, rules) in program.rules.iter().enumerate() {
            for action in rules.iter().flat_map(|rule| &rule.init) {
                if let Err(err) = self.execute(idx, &action.op) {
                    self.record_failure(idx, &action.source, &err);
                }
            }
        }
    }

    /// Run the actions of the first branch that holds. A failing action is
    /// recorded and its siblings still run.
    fn run_rule(&mut self, owner: usize, rule: &Rule) {
        let actions = match self.select_branch(owner, rule) {
            Ok(Some(actions)) => actions,
            Ok(None) => return,
            Err((source, err)) => {
                self.record_failure(owner, source, &err);
                return;
            }
        };
        for action in actions {
            if let Err(err) = self.execute(owner, &action.op) {
                self.record_failure(owner, &action.source, &err);
            }
        }
    }

    /// First `if`/`elif` arm whose condition holds, else the `else` arm.
    /// Later conditions are not evaluated once one holds.
    fn select_branch<'r>(
        &mut self,
        owner: usize,
        rule: &'r Rule,
    ) -> Result<Option<&'r [Action]>, (&'r str, FormError)> {
        for branch in &rule.branches {
            let holds = match &branch.condition {
                None => true,
                Some(condition) => match self.eval(owner, condition.expr) {
                    Ok(value) => is_truthy(&value),
                    Err(err) => return Err((condition.source.as_str(), err)),
                },
            };
            if holds {
                return Ok(Some(branch.actions.as_slice()));
            }
        }
        Ok(rule.otherwise.as_deref())
    }

    /// Log a failure and record it on the owning field.
    pub(super) fn record_failure(&mut self, owner: usize, source: &str, err: &FormError) {
        let message = format!("{source}: {err}");
        self.logger
            .error(&format!("field `{}`: {message}", self.store.key(owner)));
        self.store.field_mut(owner).push_error(message);
        self.updated[owner] = true;
    }
}
