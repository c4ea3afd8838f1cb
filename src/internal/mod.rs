//! logcore's own diagnostic logger. Lifecycle events (flusher start/stop, pool shutdown,
//! config loading) go through the same sink pipeline as user records.
//!
//! Uses `OnceLock` so the logger is built exactly once, even if several threads hit it first.
//! It is never registered in a `Registry`, so registry operations can't recurse into it.

use crate::level::Level;
use crate::logger::Logger;
use crate::sink::{ColorMode, ColorSink};
use std::sync::OnceLock;

/// Environment variable holding the internal logger's threshold.
pub const LEVEL_ENV: &str = "LOGCORE_INTERNAL_LEVEL";

const PATTERN: &str = "[{timestamp}] [logcore] [{^}{level}{$}] {msg}";

static INTERNAL_LOGGER: OnceLock<Logger> = OnceLock::new();

fn logger() -> &'static Logger {
    INTERNAL_LOGGER.get_or_init(|| {
        let level = std::env::var(LEVEL_ENV)
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(Level::Warn);
        let sink = ColorSink::stderr(ColorMode::Automatic);
        let logger = Logger::builder("logcore").level(level).sink(sink).build();
        logger.set_pattern(PATTERN);
        logger
    })
}

fn log(level: Level, scope: &str, msg: &str) {
    let logger = logger();
    if logger.should_log(level) {
        logger.log(level, &format!("{scope}: {msg}"));
    }
}

/// Visible only when the internal level includes Trace.
pub fn trace(scope: &str, msg: &str) {
    log(Level::Trace, scope, msg);
}

/// Startup and teardown diagnostics.
pub fn debug(scope: &str, msg: &str) {
    log(Level::Debug, scope, msg);
}

pub fn info(scope: &str, msg: &str) {
    log(Level::Info, scope, msg);
}

/// Non-fatal anomalies such as a missing include or a cyclic config.
pub fn warn(scope: &str, msg: &str) {
    log(Level::Warn, scope, msg);
}

pub fn error(scope: &str, msg: &str) {
    log(Level::Error, scope, msg);
}
