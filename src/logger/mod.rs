//! A logger filters records by level, fans them out to its sinks, and optionally keeps the
//! most recent ones in a backtrace buffer. Level, flush level, formatter and error handler can
//! all change at runtime; the sink list is fixed at build time.

mod builder;
mod dispatch;

pub use builder::LoggerBuilder;
pub(crate) use dispatch::Dispatch;

use crate::backtrace::Backtracer;
use crate::fmt::{Formatter, PatternFormatter};
use crate::level::{AtomicLevel, Level};
use crate::pool::{Task, ThreadPool};
use crate::record::{LogRecord, SourceLoc};
use crate::sink::Sink;
use crate::Error;
use std::sync::{Arc, Weak};

/// Receives the logger name and the failure when a sink can't deliver a record.
pub type ErrorHandler = Arc<dyn Fn(&str, &Error) + Send + Sync>;

const BACKTRACE_START: &str = "****************** Backtrace Start ******************";
const BACKTRACE_END: &str = "****************** Backtrace End ********************";

/// Where delivery happens: on the calling thread, or on a shared worker pool.
#[derive(Clone)]
enum Mode {
    Sync,
    /// Weak so an async logger never keeps the pool alive past registry shutdown.
    Async(Weak<ThreadPool>),
}

pub struct Logger {
    level: AtomicLevel,
    backtracer: Backtracer,
    dispatch: Arc<Dispatch>,
    mode: Mode,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name())
            .field("level", &self.level())
            .field("flush_level", &self.flush_level())
            .field("sinks", &self.dispatch.sinks.len())
            .field("async", &self.is_async())
            .finish_non_exhaustive()
    }
}

impl Logger {
    /// Synchronous logger over `sinks` with default settings (level Info, never auto-flush).
    #[must_use]
    pub fn new(name: impl Into<String>, sinks: Vec<Arc<dyn Sink>>) -> Self {
        Self::builder(name).sinks(sinks).build()
    }

    #[must_use]
    pub fn builder(name: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder::new(name)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.dispatch.name
    }

    /// Core dispatch for a message that lives only for this call.
    pub fn log(&self, level: Level, msg: &str) {
        if !self.should_log(level) && !self.backtracer.is_enabled() {
            return;
        }
        self.log_record(&LogRecord::new(self.name(), level, msg));
    }

    /// Same as [`log`](Self::log) with call-site metadata attached.
    pub fn log_at(&self, source: SourceLoc, level: Level, msg: &str) {
        if !self.should_log(level) && !self.backtracer.is_enabled() {
            return;
        }
        self.log_record(&LogRecord::new(self.name(), level, msg).with_source(source));
    }

    /// Routes a prebuilt record. Capture into the backtrace buffer ignores the level filter.
    pub fn log_record(&self, record: &LogRecord<'_>) {
        let log_enabled = self.should_log(record.level);
        let capture = self.backtracer.is_enabled();
        if !log_enabled && !capture {
            return;
        }
        if log_enabled {
            self.sink_it(record);
        }
        if capture {
            self.backtracer.capture(record);
        }
    }

    pub fn trace(&self, msg: &str) {
        self.log(Level::Trace, msg);
    }

    pub fn debug(&self, msg: &str) {
        self.log(Level::Debug, msg);
    }

    pub fn info(&self, msg: &str) {
        self.log(Level::Info, msg);
    }

    pub fn warn(&self, msg: &str) {
        self.log(Level::Warn, msg);
    }

    pub fn error(&self, msg: &str) {
        self.log(Level::Error, msg);
    }

    pub fn critical(&self, msg: &str) {
        self.log(Level::Critical, msg);
    }

    /// `Off` records are never delivered, whatever the threshold.
    #[must_use]
    pub fn should_log(&self, level: Level) -> bool {
        level != Level::Off && level >= self.level.load()
    }

    pub fn set_level(&self, level: Level) {
        self.level.store(level);
    }

    #[must_use]
    pub fn level(&self) -> Level {
        self.level.load()
    }

    /// Records at or above `level` flush every sink right after delivery.
    pub fn flush_on(&self, level: Level) {
        self.dispatch.flush_level.store(level);
    }

    #[must_use]
    pub fn flush_level(&self) -> Level {
        self.dispatch.flush_level.load()
    }

    pub fn flush(&self) {
        match &self.mode {
            Mode::Sync => self.dispatch.flush_sinks(),
            Mode::Async(pool) => self.post(pool, Task::Flush(Arc::clone(&self.dispatch))),
        }
    }

    /// Every sink gets its own copy of `formatter`.
    pub fn set_formatter(&self, formatter: Box<dyn Formatter>) {
        for sink in &self.dispatch.sinks {
            sink.set_formatter(formatter.clone_box());
        }
    }

    pub fn set_pattern(&self, pattern: &str) {
        self.set_formatter(Box::new(PatternFormatter::new(pattern)));
    }

    /// `None` restores the built-in stderr reporter.
    pub fn set_error_handler(&self, handler: Option<ErrorHandler>) {
        self.dispatch.set_error_handler(handler);
    }

    pub fn enable_backtrace(&self, capacity: usize) {
        self.backtracer.enable(capacity);
    }

    pub fn disable_backtrace(&self) {
        self.backtracer.disable();
    }

    #[must_use]
    pub const fn backtracer(&self) -> &Backtracer {
        &self.backtracer
    }

    /// Replays captured records to the sinks between start/end banners, emptying the buffer.
    /// Does nothing when the buffer is empty.
    pub fn dump_backtrace(&self) {
        if self.backtracer.is_empty() {
            return;
        }
        self.sink_it(&LogRecord::new(self.name(), Level::Info, BACKTRACE_START));
        let mut records = Vec::with_capacity(self.backtracer.len());
        self.backtracer.foreach_pop(|record| records.push(record.clone()));
        for record in &records {
            self.sink_it(record);
        }
        self.sink_it(&LogRecord::new(self.name(), Level::Info, BACKTRACE_END));
    }

    #[must_use]
    pub fn sinks(&self) -> &[Arc<dyn Sink>] {
        &self.dispatch.sinks
    }

    #[must_use]
    pub const fn is_async(&self) -> bool {
        matches!(self.mode, Mode::Async(_))
    }

    /// New logger sharing this one's sinks, levels, error handler and backtrace contents.
    #[must_use]
    pub fn clone_with_name(&self, name: impl Into<String>) -> Self {
        let dispatch = Dispatch::new(
            name.into(),
            self.dispatch.sinks.clone(),
            self.flush_level(),
            self.dispatch.error_handler(),
        );
        Self {
            level: AtomicLevel::new(self.level()),
            backtracer: self.backtracer.clone(),
            dispatch: Arc::new(dispatch),
            mode: self.mode.clone(),
        }
    }

    fn sink_it(&self, record: &LogRecord<'_>) {
        match &self.mode {
            Mode::Sync => self.dispatch.sink_it(record),
            Mode::Async(pool) => self.post(
                pool,
                Task::Log {
                    dispatch: Arc::clone(&self.dispatch),
                    record: record.to_owned_record(),
                },
            ),
        }
    }

    fn post(&self, pool: &Weak<ThreadPool>, task: Task) {
        let result = pool.upgrade().map_or_else(
            || Err(Error::PoolGone(self.name().to_string())),
            |pool| pool.post(task, self.name()),
        );
        if let Err(e) = result {
            self.dispatch.handle_error(&e);
        }
    }
}
