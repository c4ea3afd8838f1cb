//! Turning a record into bytes is a capability sinks consume, not something they implement:
//! each sink owns its own boxed `Formatter` so it can be reconfigured independently.

mod buffer;
mod color;
mod json;
mod pattern;

pub use buffer::FormatBuffer;
pub use color::{Color, ansi};
pub use json::JsonFormatter;
pub use pattern::{DEFAULT_PATTERN, DEFAULT_TIME_FORMAT, Field, PatternFormatter, PatternSegment};

use crate::Error;
use crate::record::LogRecord;

/// `Send + Sync` so boxed formatters can live inside sinks shared across threads.
pub trait Formatter: Send + Sync {
    /// Appends the rendered record to `dest`, optionally marking a color range.
    ///
    /// # Errors
    /// [`Error::Format`] when the record can't be rendered (e.g. an invalid time format).
    fn format(&self, record: &LogRecord<'_>, dest: &mut FormatBuffer) -> Result<(), Error>;

    /// Sinks never alias another sink's formatter; the registry hands each one its own copy.
    fn clone_box(&self) -> Box<dyn Formatter>;
}

impl Clone for Box<dyn Formatter> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
