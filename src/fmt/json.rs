//! One JSON object per line, so `jq` and log shippers can consume sink output without a parser
//! for the human-readable pattern.

use super::{FormatBuffer, Formatter};
use crate::Error;
use crate::record::LogRecord;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct JsonEntry<'r> {
    /// RFC 3339 is the most widely supported machine-readable timestamp format.
    ts: String,
    level: &'static str,
    logger: &'r str,
    msg: &'r str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source: Option<String>,
    thread: u64,
}

/// Structured counterpart to `PatternFormatter`. Never marks a color range.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, record: &LogRecord<'_>, dest: &mut FormatBuffer) -> Result<(), Error> {
        let entry = JsonEntry {
            ts: record.time.to_rfc3339(),
            level: record.level.as_str(),
            logger: &record.logger_name,
            msg: &record.payload,
            source: record.source.map(|s| format!("{}:{}", s.file, s.line)),
            thread: record.thread_id,
        };
        let json = serde_json::to_string(&entry)
            .map_err(|e| Error::Format(format!("JSON serialization failed: {e}")))?;
        dest.push_str(&json);
        dest.push_str("\n");
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn Formatter> {
        Box::new(*self)
    }
}
