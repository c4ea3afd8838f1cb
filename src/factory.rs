//! One-call constructors: build a logger, run it through the process-wide registry's
//! `initialize_logger`, and hand back the shared handle.

use crate::Error;
use crate::logger::Logger;
use crate::pool::ThreadPool;
use crate::registry::{self, Registry};
use crate::sink::{ColorMode, ColorSink, Sink, StreamSink};
use std::path::Path;
use std::sync::Arc;

/// Synchronous logger over `sinks`, initialized with the global policy.
///
/// # Errors
/// [`Error::NameCollision`] or [`Error::EmptyName`] when automatic registration is on.
pub fn create(name: &str, sinks: Vec<Arc<dyn Sink>>) -> Result<Arc<Logger>, Error> {
    create_in(registry::instance(), name, sinks)
}

/// Same as [`create`] against an explicit registry.
///
/// # Errors
/// See [`create`].
pub fn create_in(
    registry: &Registry,
    name: &str,
    sinks: Vec<Arc<dyn Sink>>,
) -> Result<Arc<Logger>, Error> {
    let logger = Arc::new(Logger::new(name, sinks));
    registry.initialize_logger(Arc::clone(&logger))?;
    Ok(logger)
}

/// Async logger posting to the registry's worker pool, which is created on first use.
///
/// # Errors
/// Registration errors, or I/O errors spawning the pool's worker thread.
pub fn create_async(name: &str, sinks: Vec<Arc<dyn Sink>>) -> Result<Arc<Logger>, Error> {
    create_async_in(registry::instance(), name, sinks)
}

/// Same as [`create_async`] against an explicit registry.
///
/// # Errors
/// See [`create_async`].
pub fn create_async_in(
    registry: &Registry,
    name: &str,
    sinks: Vec<Arc<dyn Sink>>,
) -> Result<Arc<Logger>, Error> {
    let pool = registry.thread_pool_or_init(ThreadPool::with_defaults)?;
    let logger = Arc::new(Logger::builder(name).sinks(sinks).async_pool(&pool).build());
    registry.initialize_logger(Arc::clone(&logger))?;
    Ok(logger)
}

/// # Errors
/// See [`create`].
pub fn stdout_logger(name: &str) -> Result<Arc<Logger>, Error> {
    create(name, vec![Arc::new(StreamSink::stdout())])
}

/// # Errors
/// See [`create`].
pub fn stderr_logger(name: &str) -> Result<Arc<Logger>, Error> {
    create(name, vec![Arc::new(StreamSink::stderr())])
}

/// # Errors
/// See [`create`].
pub fn stdout_color_logger(name: &str, mode: ColorMode) -> Result<Arc<Logger>, Error> {
    create(name, vec![Arc::new(ColorSink::stdout(mode))])
}

/// # Errors
/// See [`create`].
pub fn stderr_color_logger(name: &str, mode: ColorMode) -> Result<Arc<Logger>, Error> {
    create(name, vec![Arc::new(ColorSink::stderr(mode))])
}

/// Appends to `path`, creating parent directories as needed.
///
/// # Errors
/// I/O errors opening the file, plus those of [`create`].
pub fn file_logger(name: &str, path: impl AsRef<Path>) -> Result<Arc<Logger>, Error> {
    create(name, vec![Arc::new(StreamSink::file(path)?)])
}
