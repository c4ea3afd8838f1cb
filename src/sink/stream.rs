//! Console and file sinks share one write path: lock, format, then either hand the bytes to a
//! delivery handler or write them to the target and flush.

use super::{Sink, Target};
use crate::Error;
use crate::fmt::{FormatBuffer, Formatter, PatternFormatter};
use crate::internal;
use crate::level::{AtomicLevel, Level};
use crate::record::LogRecord;
use parking_lot::Mutex;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Receives formatted bytes in place of the physical target, e.g. to forward output into
/// another transport or a capture buffer. Runs under the sink's lock.
pub type DeliveryHandler = Box<dyn FnMut(&[u8]) + Send>;

/// Unlocked state shared by the plain and color-decorating sinks.
pub(crate) struct StreamCore<T> {
    target: T,
    formatter: Box<dyn Formatter>,
    handler: Option<DeliveryHandler>,
    buffer: FormatBuffer,
}

impl<T: Target> StreamCore<T> {
    pub(crate) fn new(target: T) -> Self {
        Self {
            target,
            formatter: Box::new(PatternFormatter::default()),
            handler: None,
            buffer: FormatBuffer::new(),
        }
    }

    /// Leaves the record in `buffer` with fresh color markers.
    pub(crate) fn render(&mut self, record: &LogRecord<'_>) -> Result<&FormatBuffer, Error> {
        self.buffer.clear();
        self.formatter.format(record, &mut self.buffer)?;
        Ok(&self.buffer)
    }

    pub(crate) fn deliver_rendered(&mut self) -> Result<(), Error> {
        let Self {
            target,
            handler,
            buffer,
            ..
        } = self;
        write_out(target, handler, buffer.as_bytes())
    }

    pub(crate) fn deliver(&mut self, bytes: &[u8]) -> Result<(), Error> {
        write_out(&mut self.target, &mut self.handler, bytes)
    }

    pub(crate) fn flush(&mut self) -> Result<(), Error> {
        self.target.flush()?;
        Ok(())
    }

    pub(crate) fn set_formatter(&mut self, formatter: Box<dyn Formatter>) {
        self.formatter = formatter;
    }

    pub(crate) fn set_handler(&mut self, handler: Option<DeliveryHandler>) {
        self.handler = handler;
    }

    pub(crate) const fn target(&self) -> &T {
        &self.target
    }
}

/// Every record is flushed right away unless a handler takes the bytes.
fn write_out<T: Target>(
    target: &mut T,
    handler: &mut Option<DeliveryHandler>,
    bytes: &[u8],
) -> Result<(), Error> {
    if let Some(handler) = handler.as_mut() {
        handler(bytes);
        return Ok(());
    }
    target.write_all(bytes)?;
    target.flush()?;
    Ok(())
}

/// Plain stream sink over any [`Target`].
pub struct StreamSink<T: Target> {
    core: Mutex<StreamCore<T>>,
    level: AtomicLevel,
}

pub type StdoutSink = StreamSink<io::Stdout>;
pub type StderrSink = StreamSink<io::Stderr>;
pub type FileSink = StreamSink<File>;

impl<T: Target> StreamSink<T> {
    #[must_use]
    pub fn new(target: T) -> Self {
        Self {
            core: Mutex::new(StreamCore::new(target)),
            level: AtomicLevel::new(Level::Trace),
        }
    }

    /// Builder-style formatter override, for sinks configured before they are shared.
    #[must_use]
    pub fn with_formatter(self, formatter: impl Formatter + 'static) -> Self {
        self.core.lock().set_formatter(Box::new(formatter));
        self
    }

    /// Routes formatted bytes to `handler` instead of the target.
    pub fn set_delivery_handler(&self, handler: impl FnMut(&[u8]) + Send + 'static) {
        self.core.lock().set_handler(Some(Box::new(handler)));
    }

    /// Restores writing to the physical target.
    pub fn clear_delivery_handler(&self) {
        self.core.lock().set_handler(None);
    }
}

impl StreamSink<io::Stdout> {
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl StreamSink<io::Stderr> {
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }
}

impl StreamSink<File> {
    /// Opens `path` for appending, expanding `~` and creating missing parent directories.
    ///
    /// # Errors
    /// I/O errors from directory creation or opening the file.
    pub fn file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = resolve_path(path.as_ref());
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).inspect_err(|e| {
                internal::error(
                    "SINK",
                    &format!("Failed to create directory {}: {e}", parent.display()),
                );
            })?;
            internal::debug("SINK", &format!("Created directory: {}", parent.display()));
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        internal::trace("SINK", &format!("Opened log file: {}", path.display()));
        Ok(Self::new(file))
    }
}

/// Paths from config may start with `~`.
fn resolve_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).as_ref())
}

impl<T: Target> Sink for StreamSink<T> {
    fn log(&self, record: &LogRecord<'_>) -> Result<(), Error> {
        let mut core = self.core.lock();
        core.render(record)?;
        core.deliver_rendered()
    }

    fn flush(&self) -> Result<(), Error> {
        self.core.lock().flush()
    }

    fn set_pattern(&self, pattern: &str) {
        self.core
            .lock()
            .set_formatter(Box::new(PatternFormatter::new(pattern)));
    }

    fn set_formatter(&self, formatter: Box<dyn Formatter>) {
        self.core.lock().set_formatter(formatter);
    }

    fn set_level(&self, level: Level) {
        self.level.store(level);
    }

    fn level(&self) -> Level {
        self.level.load()
    }
}
