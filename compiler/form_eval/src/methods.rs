//! Host-supplied method registry.
//!
//! Rules can only call what the host registers here; the engine defines no
//! business methods of its own.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::EvalError;

/// Evaluated call arguments.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CallArgs {
    pub positional: Vec<Value>,
    pub named: Vec<(String, Value)>,
}

impl CallArgs {
    pub fn new() -> Self {
        CallArgs::default()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.positional.get(index)
    }

    /// Last binding of `name` wins.
    pub fn named(&self, name: &str) -> Option<&Value> {
        self.named
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.positional.len() + self.named.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One invocation, as seen by a method body.
///
/// `set_value` does not write immediately: the engine applies recorded
/// writes after the method returns, merged into the running cascade.
pub struct MethodCall<'a> {
    name: &'a str,
    args: &'a CallArgs,
    writes: Vec<(String, Value)>,
}

impl<'a> MethodCall<'a> {
    pub fn new(name: &'a str, args: &'a CallArgs) -> Self {
        MethodCall {
            name,
            args,
            writes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    pub fn args(&self) -> &CallArgs {
        self.args
    }

    /// Positional argument `index`, falling back to the named argument `name`.
    pub fn arg(&self, index: usize, name: &str) -> Option<&Value> {
        self.args.get(index).or_else(|| self.args.named(name))
    }

    /// Request a field value change from inside a method.
    pub fn set_value(&mut self, key: impl Into<String>, value: Value) {
        self.writes.push((key.into(), value));
    }

    pub fn into_writes(self) -> Vec<(String, Value)> {
        self.writes
    }
}

/// Signature of a registered method. An `Err` message becomes
/// [`EvalError::MethodFailed`].
pub type MethodFn = dyn Fn(&mut MethodCall<'_>) -> Result<Value, String> + Send + Sync;

/// What a method returned, plus the writes it requested.
#[derive(Debug)]
pub struct MethodOutcome {
    pub value: Value,
    pub writes: Vec<(String, Value)>,
}

/// Closed set of callable methods, keyed by name.
#[derive(Clone, Default)]
pub struct MethodRegistry {
    methods: FxHashMap<String, Arc<MethodFn>>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        MethodRegistry::default()
    }

    /// Register (or replace) a method.
    pub fn register<F>(&mut self, name: impl Into<String>, method: F)
    where
        F: Fn(&mut MethodCall<'_>) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Arc::new(method));
    }

    /// Builder-style `register`.
    #[must_use]
    pub fn with<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&mut MethodCall<'_>) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.register(name, method);
        self
    }

    /// Add every method of `other`, replacing same-named entries.
    pub fn extend(&mut self, other: &MethodRegistry) {
        for (name, method) in &other.methods {
            self.methods.insert(name.clone(), Arc::clone(method));
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<Arc<MethodFn>> {
        self.methods.get(name).cloned()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Look up and run `name`.
    pub fn invoke(&self, name: &str, args: &CallArgs) -> Result<MethodOutcome, EvalError> {
        let method = self
            .get(name)
            .ok_or_else(|| EvalError::UnknownMethod(name.to_string()))?;
        let mut call = MethodCall::new(name, args);
        let value = method(&mut call).map_err(|message| EvalError::MethodFailed {
            method: name.to_string(),
            message,
        })?;
        Ok(MethodOutcome {
            value,
            writes: call.into_writes(),
        })
    }
}

impl fmt::Debug for MethodRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodRegistry")
            .field("methods", &self.names())
            .finish()
    }
}
