//! Sinks are where formatted records leave the process. Each one owns its own lock and its own
//! formatter, so N loggers sharing a sink serialize on it while one logger's M sinks don't
//! serialize against each other.

mod ansicolor;
mod stream;
mod target;

pub use ansicolor::{ColorMode, ColorSink, ColorStderrSink, ColorStdoutSink};
pub use stream::{DeliveryHandler, FileSink, StderrSink, StdoutSink, StreamSink};
pub use target::{SharedBuffer, Target};

use crate::Error;
use crate::fmt::Formatter;
use crate::level::Level;
use crate::record::LogRecord;

/// `Send + Sync` so one sink can be attached to loggers used from many threads.
pub trait Sink: Send + Sync {
    /// Formats and writes one record under the sink's lock.
    ///
    /// # Errors
    /// Formatting or I/O failures; the logger routes them to its error handler.
    fn log(&self, record: &LogRecord<'_>) -> Result<(), Error>;

    /// # Errors
    /// I/O errors from the underlying target.
    fn flush(&self) -> Result<(), Error>;

    /// Replaces the formatter with a `PatternFormatter` built from `pattern`.
    fn set_pattern(&self, pattern: &str);

    /// Takes ownership of `formatter`; callers clone before handing one to several sinks.
    fn set_formatter(&self, formatter: Box<dyn Formatter>);

    /// Per-sink threshold, applied after the logger's own level.
    fn set_level(&self, level: Level);

    fn level(&self) -> Level;

    fn should_log(&self, level: Level) -> bool {
        level >= self.level()
    }
}
