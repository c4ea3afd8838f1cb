//! The part of a logger that worker threads need: sinks, flush policy and error reporting.

use super::ErrorHandler;
use crate::Error;
use crate::level::{AtomicLevel, Level};
use crate::record::LogRecord;
use crate::sink::Sink;
use chrono::Local;
use parking_lot::{Mutex, RwLock};
use std::io::{self, Write};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Without a handler, at most one error report per interval reaches stderr.
const REPORT_INTERVAL: Duration = Duration::from_secs(1);

pub(crate) struct Dispatch {
    pub(crate) name: String,
    pub(crate) sinks: Vec<Arc<dyn Sink>>,
    pub(crate) flush_level: AtomicLevel,
    error_handler: RwLock<Option<ErrorHandler>>,
    last_report: Mutex<Option<Instant>>,
}

impl Dispatch {
    pub(crate) fn new(
        name: String,
        sinks: Vec<Arc<dyn Sink>>,
        flush_level: Level,
        error_handler: Option<ErrorHandler>,
    ) -> Self {
        Self {
            name,
            sinks,
            flush_level: AtomicLevel::new(flush_level),
            error_handler: RwLock::new(error_handler),
            last_report: Mutex::new(None),
        }
    }

    /// A failing sink is reported and skipped; the others still get the record.
    pub(crate) fn sink_it(&self, record: &LogRecord<'_>) {
        for sink in &self.sinks {
            if sink.should_log(record.level)
                && let Err(e) = sink.log(record)
            {
                self.handle_error(&e);
            }
        }
        if self.should_flush(record.level) {
            self.flush_sinks();
        }
    }

    pub(crate) fn flush_sinks(&self) {
        for sink in &self.sinks {
            if let Err(e) = sink.flush() {
                self.handle_error(&e);
            }
        }
    }

    fn should_flush(&self, level: Level) -> bool {
        let flush_level = self.flush_level.load();
        level != Level::Off && flush_level != Level::Off && level >= flush_level
    }

    pub(crate) fn set_error_handler(&self, handler: Option<ErrorHandler>) {
        *self.error_handler.write() = handler;
    }

    pub(crate) fn error_handler(&self) -> Option<ErrorHandler> {
        self.error_handler.read().clone()
    }

    /// The handler runs without any logger lock held, so it may log through another logger.
    pub(crate) fn handle_error(&self, err: &Error) {
        if let Some(handler) = self.error_handler() {
            handler(&self.name, err);
            return;
        }

        let now = Instant::now();
        {
            let mut last = self.last_report.lock();
            if last.is_some_and(|t| now.duration_since(t) < REPORT_INTERVAL) {
                return;
            }
            *last = Some(now);
        }
        let _ = writeln!(
            io::stderr(),
            "[*** LOG ERROR ***] [{}] [{}] {err}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            self.name
        );
    }
}
