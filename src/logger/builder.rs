//! Stepwise construction so callers only spell out what differs from the defaults.

use super::{Dispatch, ErrorHandler, Logger, Mode};
use crate::backtrace::Backtracer;
use crate::level::{AtomicLevel, Level};
use crate::pool::ThreadPool;
use crate::sink::Sink;
use crate::Error;
use std::sync::Arc;

pub struct LoggerBuilder {
    name: String,
    level: Level,
    flush_level: Level,
    sinks: Vec<Arc<dyn Sink>>,
    backtrace: Option<usize>,
    error_handler: Option<ErrorHandler>,
    pool: Option<Arc<ThreadPool>>,
}

impl LoggerBuilder {
    /// Level defaults to Info; Debug/Trace are opt-in. Flushing is left to the
    /// sinks unless `flush_on` is set.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: Level::Info,
            flush_level: Level::Off,
            sinks: Vec::new(),
            backtrace: None,
            error_handler: None,
            pool: None,
        }
    }

    #[must_use]
    pub const fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub const fn flush_on(mut self, level: Level) -> Self {
        self.flush_level = level;
        self
    }

    /// Attaches a sink owned by this logger only.
    #[must_use]
    pub fn sink(mut self, sink: impl Sink + 'static) -> Self {
        self.sinks.push(Arc::new(sink));
        self
    }

    /// Attaches a sink that other loggers may share.
    #[must_use]
    pub fn shared_sink(mut self, sink: Arc<dyn Sink>) -> Self {
        self.sinks.push(sink);
        self
    }

    #[must_use]
    pub fn sinks(mut self, sinks: impl IntoIterator<Item = Arc<dyn Sink>>) -> Self {
        self.sinks.extend(sinks);
        self
    }

    /// Keeps the last `capacity` records for [`Logger::dump_backtrace`].
    #[must_use]
    pub const fn backtrace(mut self, capacity: usize) -> Self {
        self.backtrace = Some(capacity);
        self
    }

    #[must_use]
    pub fn error_handler(mut self, handler: impl Fn(&str, &Error) + Send + Sync + 'static) -> Self {
        self.error_handler = Some(Arc::new(handler));
        self
    }

    /// Delivery moves to `pool`'s worker threads. The logger only keeps a weak handle.
    #[must_use]
    pub fn async_pool(mut self, pool: &Arc<ThreadPool>) -> Self {
        self.pool = Some(Arc::clone(pool));
        self
    }

    #[must_use]
    pub fn build(self) -> Logger {
        let backtracer = Backtracer::new();
        if let Some(capacity) = self.backtrace {
            backtracer.enable(capacity);
        }
        let mode = self
            .pool
            .map_or(Mode::Sync, |pool| Mode::Async(Arc::downgrade(&pool)));

        Logger {
            level: AtomicLevel::new(self.level),
            backtracer,
            dispatch: Arc::new(Dispatch::new(
                self.name,
                self.sinks,
                self.flush_level,
                self.error_handler,
            )),
            mode,
        }
    }
}
