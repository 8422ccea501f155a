//! `EngineBuilder` for creating engines with non-default configuration.

use form_eval::{MethodCall, MethodRegistry};
use serde_json::Value;

use crate::config::EngineConfig;
use crate::logger::{tracing_sink, EngineLogger, SharedLogSink};
use crate::{FormEngine, FormResult};

/// Builder for [`FormEngine`].
///
/// Methods must be registered before `load` if rules call them during
/// `init`; later registration through [`FormEngine::register_method`] works
/// for everything else.
#[derive(Debug, Default)]
pub struct EngineBuilder {
    config: EngineConfig,
    methods: MethodRegistry,
    sink: Option<SharedLogSink>,
}

impl EngineBuilder {
    pub fn new() -> Self {
        EngineBuilder::default()
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Pass ceiling for one cascade.
    #[must_use]
    pub fn max_passes(mut self, max_passes: usize) -> Self {
        self.config.max_passes = max_passes;
        self
    }

    /// Log level `0..=3`; larger values are clamped.
    #[must_use]
    pub fn log_level(mut self, level: u8) -> Self {
        self.config.log_level = level;
        self
    }

    #[must_use]
    pub fn key_separator(mut self, separator: impl Into<String>) -> Self {
        self.config.key_separator = separator.into();
        self
    }

    /// Where diagnostics go. Defaults to the `tracing` sink.
    #[must_use]
    pub fn logger(mut self, sink: SharedLogSink) -> Self {
        self.sink = Some(sink);
        self
    }

    #[must_use]
    pub fn method<F>(mut self, name: impl Into<String>, method: F) -> Self
    where
        F: Fn(&mut MethodCall<'_>) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.methods.register(name, method);
        self
    }

    /// Add every method of `registry`.
    #[must_use]
    pub fn methods(mut self, registry: &MethodRegistry) -> Self {
        self.methods.extend(registry);
        self
    }

    /// Validate the configuration and load `schema`.
    pub fn load(self, schema: &Value) -> FormResult<FormEngine> {
        let config = self.config.validated()?;
        let logger = EngineLogger::new(
            config.log_level,
            config.max_log_bytes,
            self.sink.unwrap_or_else(tracing_sink),
        );
        FormEngine::from_parts(config, self.methods, logger, schema)
    }
}
