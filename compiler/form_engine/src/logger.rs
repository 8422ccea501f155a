//! Leveled diagnostics for one engine instance.
//!
//! Every engine owns an [`EngineLogger`]: a numeric level plus a sink.
//! There is no process-wide logger state; two engines can log at different
//! levels to different sinks.
//!
//! Level contract:
//!
//! | level | emits                 |
//! |-------|-----------------------|
//! | 0     | nothing               |
//! | 1     | errors                |
//! | 2     | warnings and errors   |
//! | 3     | debug, warn, error    |
//!
//! Sinks use enum dispatch: `Tracing` forwards to the `tracing` macros,
//! `Buffer` keeps lines in memory for tests and embedding hosts, `Silent`
//! drops everything.

use std::fmt;
use std::sync::{Arc, Once};

use parking_lot::Mutex;

use crate::config::DEFAULT_MAX_LOG_BYTES;

/// Highest accepted log level.
pub const MAX_LOG_LEVEL: u8 = 3;

/// Severity of one message.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error = 1,
    Warn = 2,
    Debug = 3,
}

impl Severity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warn => "warn",
            Severity::Debug => "debug",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sink that captures formatted lines.
#[derive(Default)]
pub struct BufferLogSink {
    lines: Mutex<Vec<String>>,
}

impl BufferLogSink {
    pub fn new() -> Self {
        BufferLogSink::default()
    }

    fn write(&self, severity: Severity, msg: &str) {
        self.lines.lock().push(format!("[{severity}] {msg}"));
    }

    /// Captured lines, oldest first.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

/// Where log lines go.
pub enum LogSink {
    /// Forward to `tracing` under the `form_engine` target.
    Tracing,
    Buffer(BufferLogSink),
    Silent,
}

impl LogSink {
    fn write(&self, severity: Severity, msg: &str) {
        match self {
            LogSink::Tracing => match severity {
                Severity::Error => tracing::error!(target: "form_engine", "{msg}"),
                Severity::Warn => tracing::warn!(target: "form_engine", "{msg}"),
                Severity::Debug => tracing::debug!(target: "form_engine", "{msg}"),
            },
            LogSink::Buffer(buffer) => buffer.write(severity, msg),
            LogSink::Silent => {}
        }
    }

    /// Captured lines for a buffer sink; empty for the others.
    pub fn lines(&self) -> Vec<String> {
        match self {
            LogSink::Buffer(buffer) => buffer.lines(),
            LogSink::Tracing | LogSink::Silent => Vec::new(),
        }
    }

    pub fn clear(&self) {
        if let LogSink::Buffer(buffer) = self {
            buffer.clear();
        }
    }
}

impl fmt::Debug for LogSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogSink::Tracing => "Tracing",
            LogSink::Buffer(_) => "Buffer",
            LogSink::Silent => "Silent",
        };
        f.write_str(name)
    }
}

/// A sink shared between an engine and the host that reads it.
pub type SharedLogSink = Arc<LogSink>;

pub fn tracing_sink() -> SharedLogSink {
    Arc::new(LogSink::Tracing)
}

pub fn buffer_sink() -> SharedLogSink {
    Arc::new(LogSink::Buffer(BufferLogSink::new()))
}

pub fn silent_sink() -> SharedLogSink {
    Arc::new(LogSink::Silent)
}

/// Per-engine logger handle.
#[derive(Clone, Debug)]
pub struct EngineLogger {
    level: u8,
    max_bytes: usize,
    sink: SharedLogSink,
}

impl Default for EngineLogger {
    fn default() -> Self {
        EngineLogger::new(2, DEFAULT_MAX_LOG_BYTES, tracing_sink())
    }
}

impl EngineLogger {
    /// Levels above 3 are clamped.
    pub fn new(level: u8, max_bytes: usize, sink: SharedLogSink) -> Self {
        EngineLogger {
            level: level.min(MAX_LOG_LEVEL),
            max_bytes,
            sink,
        }
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn set_level(&mut self, level: u8) {
        self.level = level.min(MAX_LOG_LEVEL);
    }

    pub fn sink(&self) -> &SharedLogSink {
        &self.sink
    }

    #[inline]
    pub fn enabled(&self, severity: Severity) -> bool {
        self.level >= severity as u8
    }

    pub fn error(&self, msg: &str) {
        self.emit(Severity::Error, msg);
    }

    pub fn warn(&self, msg: &str) {
        self.emit(Severity::Warn, msg);
    }

    pub fn debug(&self, msg: &str) {
        self.emit(Severity::Debug, msg);
    }

    /// Like `debug`, but the message is only built when it will be emitted.
    pub fn debug_with(&self, build: impl FnOnce() -> String) {
        if self.enabled(Severity::Debug) {
            self.emit(Severity::Debug, &build());
        }
    }

    fn emit(&self, severity: Severity, msg: &str) {
        if !self.enabled(severity) {
            return;
        }
        if msg.len() > self.max_bytes {
            let notice = format!("message too large ({} bytes), not printed", msg.len());
            self.sink.write(severity, &notice);
        } else {
            self.sink.write(severity, msg);
        }
    }
}

static TRACING_INIT: Once = Once::new();

/// Install a `tracing-subscriber` fmt layer filtered by `RUST_LOG`.
///
/// Does nothing unless `RUST_LOG` is set. Safe to call more than once;
/// only the first call can install a subscriber.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            // A host may already have installed a global subscriber.
            let _ = tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .try_init();
        }
    });
}
