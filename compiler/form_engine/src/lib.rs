//! Reactive form-state engine.
//!
//! A schema declares fields, their rules and their dependencies. The engine
//! keeps live state for every field and, on each [`FormEngine::set_value`],
//! re-runs the rules of the changed field and of everything that depends on
//! it until the form settles.
//!
//! ```text
//! schema ──parse──▶ FieldStore ──compile──▶ Program ──scan──▶ DependencyGraph
//!                        ▲                                         │
//!                        └──────── Cascade (passes, temps) ◀───────┘
//! ```
//!
//! Rule strings are parsed by `form_parse` and evaluated by `form_eval`;
//! this crate owns state, scheduling, logging and configuration.

mod builder;
mod cascade;
pub mod config;
mod engine;
mod errors;
pub mod field;
mod graph;
pub mod logger;
mod program;
mod projection;
pub mod schema;
mod store;
mod validate;

pub use builder::EngineBuilder;
pub use cascade::CascadeReport;
pub use config::EngineConfig;
pub use engine::FormEngine;
pub use errors::{FormError, FormResult};
pub use field::{AgentFieldView, FieldOption, FieldType, FieldView};
pub use logger::{buffer_sink, init_tracing, silent_sink, tracing_sink, EngineLogger, LogSink};
pub use schema::DEFAULT_SUBMIT_KEY;
pub use validate::{SubmitOutcome, Validation, NOT_READY_MESSAGE};

pub use form_eval::{CallArgs, MethodCall, MethodRegistry};
