//! The unit of data that flows from a logger to its sinks and into the backtrace buffer.

use crate::level::Level;
use chrono::{DateTime, Local};
use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};

/// Call-site metadata, usually filled from `file!()`, `line!()` and `module_path!()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLoc {
    pub file: &'static str,
    pub line: u32,
    pub module: &'static str,
}

impl SourceLoc {
    #[must_use]
    pub const fn new(file: &'static str, line: u32, module: &'static str) -> Self {
        Self { file, line, module }
    }
}

/// Carries all data a sink needs to render one log line.
///
/// The borrowed form is only valid for the logging call that produced it; anything that keeps a
/// record around (backtrace capture, async dispatch) stores [`into_owned`](Self::into_owned).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord<'a> {
    pub logger_name: Cow<'a, str>,
    pub level: Level,
    pub time: DateTime<Local>,
    pub source: Option<SourceLoc>,
    pub thread_id: u64,
    pub payload: Cow<'a, str>,
}

impl<'a> LogRecord<'a> {
    /// Stamps the current time and thread; the payload stays borrowed.
    #[must_use]
    pub fn new(logger_name: &'a str, level: Level, payload: &'a str) -> Self {
        Self {
            logger_name: Cow::Borrowed(logger_name),
            level,
            time: Local::now(),
            source: None,
            thread_id: current_thread_id(),
            payload: Cow::Borrowed(payload),
        }
    }

    #[must_use]
    pub const fn with_source(mut self, source: SourceLoc) -> Self {
        self.source = Some(source);
        self
    }

    /// Materializes borrowed name and payload so the record can outlive the call.
    #[must_use]
    pub fn into_owned(self) -> LogRecord<'static> {
        LogRecord {
            logger_name: Cow::Owned(self.logger_name.into_owned()),
            level: self.level,
            time: self.time,
            source: self.source,
            thread_id: self.thread_id,
            payload: Cow::Owned(self.payload.into_owned()),
        }
    }

    /// Same as [`into_owned`](Self::into_owned) without consuming the borrowed record.
    #[must_use]
    pub fn to_owned_record(&self) -> LogRecord<'static> {
        self.clone().into_owned()
    }
}

static NEXT_THREAD_ID: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static THREAD_ID: u64 = NEXT_THREAD_ID.fetch_add(1, Ordering::Relaxed);
}

/// Small stable per-thread number. `std::thread::ThreadId` has no stable integer form.
#[must_use]
pub fn current_thread_id() -> u64 {
    THREAD_ID.with(|id| *id)
}
