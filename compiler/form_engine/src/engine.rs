//! The public engine: one form session.

use form_eval::{is_truthy, MethodCall, MethodRegistry};
use serde_json::{Map, Value};

use crate::builder::EngineBuilder;
use crate::cascade::{Cascade, CascadeReport};
use crate::config::EngineConfig;
use crate::field::{AgentFieldView, FieldView};
use crate::graph::DependencyGraph;
use crate::logger::EngineLogger;
use crate::program::Program;
use crate::schema::parse_schema;
use crate::store::FieldStore;
use crate::validate::{self, SubmitOutcome, Validation, NOT_READY_MESSAGE};
use crate::{FormError, FormResult};

/// Live state for one form.
///
/// Not meant for concurrent mutation: hosts serving several sessions keep
/// one engine per session and serialize access to each.
#[derive(Debug)]
pub struct FormEngine {
    config: EngineConfig,
    store: FieldStore,
    program: Program,
    graph: DependencyGraph,
    methods: MethodRegistry,
    logger: EngineLogger,
}

impl FormEngine {
    /// Load a schema with default configuration and no methods.
    pub fn load(schema: &Value) -> FormResult<Self> {
        EngineBuilder::new().load(schema)
    }

    /// Load a schema given as JSON text.
    pub fn load_json(text: &str) -> FormResult<Self> {
        let schema: Value = serde_json::from_str(text)
            .map_err(|err| FormError::Schema(format!("invalid JSON: {err}")))?;
        FormEngine::load(&schema)
    }

    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    /// Load is all-or-nothing: any error leaves no engine behind.
    pub(crate) fn from_parts(
        config: EngineConfig,
        methods: MethodRegistry,
        logger: EngineLogger,
        schema: &Value,
    ) -> FormResult<Self> {
        let defs = parse_schema(schema)?;
        let store = FieldStore::from_defs(&defs)?;
        let program = Program::compile(&defs, &store, &config.key_separator)?;
        let graph = DependencyGraph::build(&store, &program, &config.key_separator);
        logger.debug_with(|| format!("loaded {} field(s)", store.len()));
        Ok(FormEngine {
            config,
            store,
            program,
            graph,
            methods,
            logger,
        })
    }

    fn cascade(&mut self) -> Cascade<'_> {
        Cascade::new(
            &mut self.store,
            &self.program,
            &self.graph,
            &self.methods,
            &self.logger,
            &self.config,
        )
    }

    /// Set a field's value and propagate the change.
    ///
    /// The field's own rules run first, then its transitive dependents in
    /// dependency order. An unknown key changes nothing.
    #[tracing::instrument(level = "debug", skip(self, value))]
    pub fn set_value(&mut self, key: &str, value: Value) -> FormResult<CascadeReport> {
        let idx = match self.store.require(key) {
            Ok(idx) => idx,
            Err(err) => {
                self.logger.error(&format!("set_value: {err}"));
                return Err(err);
            }
        };
        self.logger.debug_with(|| format!("set_value `{key}` = {value}"));

        let mut cascade = self.cascade();
        cascade.assign(idx, value)?;
        cascade.seed(idx);
        cascade.run()?;
        Ok(cascade.finish())
    }

    /// Write a value without running any rules.
    pub fn set_raw_value(&mut self, key: &str, value: Value) -> FormResult<()> {
        let idx = self.store.require(key)?;
        self.store.field_mut(idx).state.value = value;
        Ok(())
    }

    pub fn get_value(&self, key: &str) -> FormResult<&Value> {
        self.store
            .get(key)
            .map(|field| &field.state.value)
            .ok_or_else(|| FormError::UnknownField(key.to_string()))
    }

    /// Read-only snapshot of one field.
    pub fn get_field(&self, key: &str) -> FormResult<FieldView> {
        self.store
            .get(key)
            .map(crate::field::Field::view)
            .ok_or_else(|| FormError::UnknownField(key.to_string()))
    }

    /// `key -> value` for visible fields, in declaration order.
    pub fn get_visible_values(&self) -> Map<String, Value> {
        crate::projection::visible_values(&self.store)
    }

    /// Visible values nested by key segment.
    pub fn get_visible_values_tree(&self) -> FormResult<Value> {
        crate::projection::visible_values_tree(&self.store, &self.config.key_separator)
    }

    /// Run every rule's `init` list, then propagate what changed.
    pub fn init(&mut self) -> FormResult<CascadeReport> {
        let mut cascade = self.cascade();
        cascade.run_init();
        cascade.run()?;
        Ok(cascade.finish())
    }

    pub fn validate(&self) -> Validation {
        validate::validate(&self.store)
    }

    /// Re-run the submit field's rules and report whether it allows
    /// submission.
    pub fn check_submit(&mut self, submit_key: &str) -> FormResult<SubmitOutcome> {
        let Some(idx) = self.store.index_of(submit_key) else {
            self.logger
                .warn(&format!("submit field `{submit_key}` is not declared"));
            return Ok(SubmitOutcome {
                can_submit: false,
                submit_key: submit_key.to_string(),
                errors: vec![format!("submit field `{submit_key}` is not declared")],
                report: CascadeReport::default(),
            });
        };

        let mut cascade = self.cascade();
        cascade.seed(idx);
        cascade.run()?;
        let report = cascade.finish();

        let field = self.store.field(idx);
        let can_submit = is_truthy(&field.state.value);
        let mut errors = Vec::new();
        if !can_submit {
            errors.clone_from(&field.state.errors);
            if errors.is_empty() {
                errors.push(NOT_READY_MESSAGE.to_string());
            }
        }
        Ok(SubmitOutcome {
            can_submit,
            submit_key: submit_key.to_string(),
            errors,
            report,
        })
    }

    /// Views of every visible field, in declaration order.
    pub fn visible_fields(&self) -> Vec<FieldView> {
        self.store
            .iter()
            .filter(|field| field.state.visible)
            .map(crate::field::Field::view)
            .collect()
    }

    /// Compact views of every field for a conversational agent.
    pub fn fields_for_agent(&self) -> Vec<AgentFieldView> {
        self.store
            .iter()
            .map(crate::field::Field::agent_view)
            .collect()
    }

    pub fn field_keys(&self) -> Vec<&str> {
        self.store.iter().map(|field| field.key.as_str()).collect()
    }

    /// Fields whose rules re-run directly when `key` changes.
    pub fn dependents_of(&self, key: &str) -> FormResult<Vec<&str>> {
        let idx = self.store.require(key)?;
        Ok(self
            .graph
            .dependents(idx)
            .iter()
            .map(|&dep| self.store.key(dep))
            .collect())
    }

    /// Register (or replace) a method callable from rules.
    pub fn register_method<F>(&mut self, name: impl Into<String>, method: F)
    where
        F: Fn(&mut MethodCall<'_>) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.methods.register(name, method);
    }

    pub fn methods(&self) -> &MethodRegistry {
        &self.methods
    }

    /// Levels above 3 are clamped.
    pub fn set_log_level(&mut self, level: u8) {
        self.logger.set_level(level);
        self.config.log_level = self.logger.level();
    }

    pub fn log_level(&self) -> u8 {
        self.logger.level()
    }

    pub fn logger(&self) -> &EngineLogger {
        &self.logger
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
