//! Engine configuration.

use serde::Deserialize;

use crate::FormError;

/// Default pass ceiling for one cascade.
pub const DEFAULT_MAX_PASSES: usize = 16;

/// Default size above which a log message is replaced by a notice.
pub const DEFAULT_MAX_LOG_BYTES: usize = 30 * 1024;

/// Tunables for one engine instance.
///
/// Deserializes from JSON with every field optional:
///
/// ```text
/// { "key_separator": ".", "max_passes": 16, "log_level": 2, "max_log_bytes": 30720 }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Joins path segments into field keys and splits keys for the value tree.
    pub key_separator: String,
    /// Maximum number of passes a cascade may start.
    pub max_passes: usize,
    /// 0 none, 1 error, 2 warn+error, 3 debug+warn+error.
    pub log_level: u8,
    pub max_log_bytes: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            key_separator: ".".to_string(),
            max_passes: DEFAULT_MAX_PASSES,
            log_level: 2,
            max_log_bytes: DEFAULT_MAX_LOG_BYTES,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON config document.
    pub fn from_json(text: &str) -> Result<Self, FormError> {
        let config: EngineConfig = serde_json::from_str(text)
            .map_err(|err| FormError::Schema(format!("invalid engine config: {err}")))?;
        config.validated()
    }

    /// Reject settings the engine cannot run with.
    pub(crate) fn validated(self) -> Result<Self, FormError> {
        if self.key_separator.is_empty() {
            return Err(FormError::Schema("key separator must not be empty".into()));
        }
        if self.max_passes == 0 {
            return Err(FormError::Schema("max_passes must be at least 1".into()));
        }
        Ok(self)
    }
}
