//! Color-decorating wrapper over the stream write path: paints the formatter's color range
//! with a per-level escape sequence.

use super::stream::StreamCore;
use super::target::env_supports_color;
use super::{Sink, Target};
use crate::Error;
use crate::fmt::{Formatter, PatternFormatter, ansi};
use crate::level::{AtomicLevel, Level};
use crate::record::LogRecord;
use parking_lot::Mutex;
use std::fmt;
use std::io;
use std::str::FromStr;

/// When to emit escape sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    Always,
    /// Resolved once when the mode is set, by probing the target and the environment.
    #[default]
    Automatic,
    Never,
}

impl ColorMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Automatic => "automatic",
            Self::Never => "never",
        }
    }
}

impl fmt::Display for ColorMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "always" | "on" => Ok(Self::Always),
            "automatic" | "auto" => Ok(Self::Automatic),
            "never" | "off" => Ok(Self::Never),
            _ => Err(Error::Format(format!("unknown color mode: '{s}'"))),
        }
    }
}

struct ColorState<T> {
    core: StreamCore<T>,
    colors: [String; 7],
    should_color: bool,
    painted: Vec<u8>,
}

fn resolve<T: Target>(mode: ColorMode, target: &T) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Automatic => target.is_terminal() && env_supports_color(),
    }
}

fn default_colors() -> [String; 7] {
    Level::all().map(|level| {
        let code = match level {
            Level::Trace => ansi::WHITE,
            Level::Debug => ansi::CYAN,
            Level::Info => ansi::GREEN,
            Level::Warn => ansi::YELLOW_BOLD,
            Level::Error => ansi::RED_BOLD,
            Level::Critical => ansi::BOLD_ON_RED,
            Level::Off => "",
        };
        code.to_string()
    })
}

/// Stream sink that wraps the `[color_start, color_end)` range in a level color and a reset.
pub struct ColorSink<T: Target> {
    state: Mutex<ColorState<T>>,
    level: AtomicLevel,
}

pub type ColorStdoutSink = ColorSink<io::Stdout>;
pub type ColorStderrSink = ColorSink<io::Stderr>;

impl<T: Target> ColorSink<T> {
    #[must_use]
    pub fn new(target: T, mode: ColorMode) -> Self {
        let should_color = resolve(mode, &target);
        Self {
            state: Mutex::new(ColorState {
                core: StreamCore::new(target),
                colors: default_colors(),
                should_color,
                painted: Vec::new(),
            }),
            level: AtomicLevel::new(Level::Trace),
        }
    }

    #[must_use]
    pub fn with_formatter(self, formatter: impl Formatter + 'static) -> Self {
        self.state.lock().core.set_formatter(Box::new(formatter));
        self
    }

    /// Re-resolves color output; `Automatic` probes the target again only here.
    pub fn set_color_mode(&self, mode: ColorMode) {
        let mut state = self.state.lock();
        state.should_color = resolve(mode, state.core.target());
    }

    /// Escape prefix for one level. An empty code leaves that level uncolored.
    pub fn set_color(&self, level: Level, code: impl Into<String>) {
        self.state.lock().colors[level.index()] = code.into();
    }

    #[must_use]
    pub fn should_color(&self) -> bool {
        self.state.lock().should_color
    }

    /// Routes the (possibly painted) bytes to `handler` instead of the target.
    pub fn set_delivery_handler(&self, handler: impl FnMut(&[u8]) + Send + 'static) {
        self.state.lock().core.set_handler(Some(Box::new(handler)));
    }

    pub fn clear_delivery_handler(&self) {
        self.state.lock().core.set_handler(None);
    }
}

impl ColorSink<io::Stdout> {
    #[must_use]
    pub fn stdout(mode: ColorMode) -> Self {
        Self::new(io::stdout(), mode)
    }
}

impl ColorSink<io::Stderr> {
    #[must_use]
    pub fn stderr(mode: ColorMode) -> Self {
        Self::new(io::stderr(), mode)
    }
}

impl<T: Target> Sink for ColorSink<T> {
    fn log(&self, record: &LogRecord<'_>) -> Result<(), Error> {
        let mut guard = self.state.lock();
        let ColorState {
            core,
            colors,
            should_color,
            painted,
        } = &mut *guard;

        let formatted = core.render(record)?;
        let range = formatted.color_range();
        let color = &colors[record.level.index()];

        if !*should_color || range.is_empty() || color.is_empty() {
            return core.deliver_rendered();
        }

        let bytes = formatted.as_bytes();
        painted.clear();
        painted.extend_from_slice(&bytes[..range.start]);
        painted.extend_from_slice(color.as_bytes());
        painted.extend_from_slice(&bytes[range.clone()]);
        painted.extend_from_slice(ansi::RESET.as_bytes());
        painted.extend_from_slice(&bytes[range.end..]);
        core.deliver(painted.as_slice())
    }

    fn flush(&self) -> Result<(), Error> {
        self.state.lock().core.flush()
    }

    fn set_pattern(&self, pattern: &str) {
        self.state
            .lock()
            .core
            .set_formatter(Box::new(PatternFormatter::new(pattern)));
    }

    fn set_formatter(&self, formatter: Box<dyn Formatter>) {
        self.state.lock().core.set_formatter(formatter);
    }

    fn set_level(&self, level: Level) {
        self.level.store(level);
    }

    fn level(&self) -> Level {
        self.level.load()
    }
}
