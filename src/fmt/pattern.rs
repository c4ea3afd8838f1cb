//! Brace-placeholder templates like `[{timestamp}] [{^}{level}{$}] {msg}`. Parsed once into
//! segments so rendering a record never re-scans the template string.

use super::{FormatBuffer, Formatter};
use crate::Error;
use crate::record::LogRecord;
use std::fmt::Write;

/// Used by every sink until a pattern or formatter is pushed to it.
pub const DEFAULT_PATTERN: &str = "[{timestamp}] [{name}] [{^}{level}{$}] {msg}";

/// strftime format for `{timestamp}`.
pub const DEFAULT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Known substitution tokens. Unknown `{names}` pass through as literal text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Timestamp,
    Level,
    ShortLevel,
    Name,
    Msg,
    Source,
    Thread,
    /// `{^}`: start of the range a color sink paints.
    ColorStart,
    /// `{$}`: end of the colored range.
    ColorEnd,
}

impl Field {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Timestamp => "timestamp",
            Self::Level => "level",
            Self::ShortLevel => "short_level",
            Self::Name => "name",
            Self::Msg => "msg",
            Self::Source => "source",
            Self::Thread => "thread",
            Self::ColorStart => "^",
            Self::ColorEnd => "$",
        }
    }

    pub const ALL: &'static [Self] = &[
        Self::Timestamp,
        Self::Level,
        Self::ShortLevel,
        Self::Name,
        Self::Msg,
        Self::Source,
        Self::Thread,
        Self::ColorStart,
        Self::ColorEnd,
    ];

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.as_str() == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternSegment {
    Literal(String),
    Field(Field),
}

/// Renders records through a pre-parsed template, terminating every line with `\n`.
#[derive(Debug, Clone)]
pub struct PatternFormatter {
    pattern: String,
    segments: Vec<PatternSegment>,
    time_format: String,
}

impl Default for PatternFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_PATTERN)
    }
}

impl PatternFormatter {
    #[must_use]
    pub fn new(pattern: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            segments: parse(pattern),
            time_format: DEFAULT_TIME_FORMAT.to_string(),
        }
    }

    /// strftime format used for `{timestamp}`.
    #[must_use]
    pub fn time_format(mut self, format: impl Into<String>) -> Self {
        self.time_format = format.into();
        self
    }

    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn segments(&self) -> &[PatternSegment] {
        &self.segments
    }
}

fn parse(pattern: &str) -> Vec<PatternSegment> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut rest = pattern;

    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}').map(|c| open + c) else {
            break;
        };
        current.push_str(&rest[..open]);
        let name = &rest[open + 1..close];

        if let Some(field) = Field::from_name(name) {
            if !current.is_empty() {
                segments.push(PatternSegment::Literal(std::mem::take(&mut current)));
            }
            segments.push(PatternSegment::Field(field));
        } else {
            current.push_str(&rest[open..=close]);
        }
        rest = &rest[close + 1..];
    }

    current.push_str(rest);
    if !current.is_empty() {
        segments.push(PatternSegment::Literal(current));
    }
    segments
}

impl Formatter for PatternFormatter {
    fn format(&self, record: &LogRecord<'_>, dest: &mut FormatBuffer) -> Result<(), Error> {
        for segment in &self.segments {
            match segment {
                PatternSegment::Literal(s) => dest.push_str(s),
                PatternSegment::Field(field) => match field {
                    Field::Timestamp => write!(dest, "{}", record.time.format(&self.time_format))
                        .map_err(|_| {
                            Error::Format(format!("invalid time format '{}'", self.time_format))
                        })?,
                    Field::Level => dest.push_str(record.level.as_str()),
                    Field::ShortLevel => dest.push_str(record.level.short_str()),
                    Field::Name => dest.push_str(&record.logger_name),
                    Field::Msg => dest.push_str(&record.payload),
                    Field::Source => {
                        if let Some(source) = record.source {
                            let _ = write!(dest, "{}:{}", source.file, source.line);
                        }
                    }
                    Field::Thread => {
                        let _ = write!(dest, "{}", record.thread_id);
                    }
                    Field::ColorStart => dest.mark_color_start(),
                    Field::ColorEnd => dest.mark_color_end(),
                },
            }
        }
        dest.push_str("\n");
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn Formatter> {
        Box::new(self.clone())
    }
}
