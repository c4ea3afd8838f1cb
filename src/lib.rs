//! `logcore` - Thread-safe logging core.
//!
//! Provides:
//! - A registry of named loggers with a global level, flush and formatting policy
//! - Per-logger backtrace buffers that keep the last N records for on-demand replay
//! - Locked sinks (console, file, any `Write` target) with an optional delivery handler
//! - A color-decorating sink that paints the level range of each line
//! - Async loggers backed by a shared worker pool
//! - TOML configuration with `source = "..."` includes
//!
//! # Example
//!
//! ```
//! use logcore::{Level, Logger, Registry, SharedBuffer, StreamSink};
//! use std::sync::Arc;
//!
//! let registry = Registry::empty();
//! let buffer = SharedBuffer::new();
//!
//! let logger = Arc::new(
//!     Logger::builder("svc")
//!         .sink(StreamSink::new(buffer.clone()))
//!         .backtrace(32)
//!         .build(),
//! );
//! registry.initialize_logger(Arc::clone(&logger)).unwrap();
//! registry.set_pattern("[{name}] [{level}] {msg}");
//!
//! logger.debug("cache warm");
//! logger.info("listening");
//! assert_eq!(buffer.lines(), vec!["[svc] [info] listening"]);
//!
//! registry.set_level(Level::Debug);
//! logger.debug("visible now");
//! assert_eq!(buffer.lines().len(), 2);
//! ```

pub mod backtrace;
pub mod config;
pub mod error;
pub mod factory;
pub mod fmt;
pub mod internal;
pub mod level;
pub mod logger;
pub mod pool;
pub mod record;
pub mod registry;
pub mod sink;

pub use backtrace::Backtracer;
pub use config::{Config, GeneralConfig};
pub use error::Error;
pub use factory::{
    create, create_async, file_logger, stderr_color_logger, stderr_logger, stdout_color_logger,
    stdout_logger,
};
pub use fmt::{Color, FormatBuffer, Formatter, JsonFormatter, PatternFormatter};
pub use level::{Level, LevelConfig};
pub use logger::{ErrorHandler, Logger, LoggerBuilder};
pub use pool::ThreadPool;
pub use record::{LogRecord, SourceLoc};
pub use registry::Registry;
pub use sink::{
    ColorMode, ColorSink, DeliveryHandler, FileSink, SharedBuffer, Sink, StreamSink, Target,
};
