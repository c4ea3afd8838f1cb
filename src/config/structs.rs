//! Configuration struct definitions.

use crate::fmt::DEFAULT_PATTERN;
use serde::Deserialize;

/// Global policy applied to a registry.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Global level for every logger without a `[levels]` match.
    pub level: String,
    /// Records at or above this level flush immediately.
    pub flush_on: String,
    /// Periodic flush interval in seconds; 0 disables it.
    pub flush_every_secs: u64,
    /// Pattern pushed to every sink.
    pub pattern: String,
    /// strftime format for `{timestamp}`; `None` keeps the formatter default.
    pub time_format: Option<String>,
    /// Backtrace capacity for newly initialized loggers; 0 disables capture.
    pub backtrace: usize,
    /// Whether `initialize_logger` also registers the logger.
    pub automatic_registration: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            flush_on: "off".to_string(),
            flush_every_secs: 0,
            pattern: DEFAULT_PATTERN.to_string(),
            time_format: None,
            backtrace: 0,
            automatic_registration: true,
        }
    }
}
