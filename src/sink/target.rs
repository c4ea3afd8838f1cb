//! The output device behind a stream sink. Sinks only need `write`/`flush`, plus a terminal
//! probe for automatic color resolution.

use parking_lot::Mutex;
use std::fs::File;
use std::io::{self, IsTerminal, Write};
use std::sync::Arc;

/// Anything a stream sink can write formatted bytes to.
pub trait Target: Write + Send {
    /// Only consulted when a color sink resolves `ColorMode::Automatic`.
    fn is_terminal(&self) -> bool {
        false
    }
}

impl Target for io::Stdout {
    fn is_terminal(&self) -> bool {
        IsTerminal::is_terminal(self)
    }
}

impl Target for io::Stderr {
    fn is_terminal(&self) -> bool {
        IsTerminal::is_terminal(self)
    }
}

impl Target for File {}

impl Target for Vec<u8> {}

impl Target for io::Sink {}

impl Target for SharedBuffer {}

/// Terminal types known to understand ANSI color escapes.
const COLOR_TERMS: &[&str] = &[
    "ansi", "color", "console", "cygwin", "gnome", "konsole", "kterm", "linux", "msys", "putty",
    "rxvt", "screen", "vt100", "xterm", "alacritty", "vt102", "tmux", "foot", "kitty",
];

/// Environment side of the color probe: `NO_COLOR` wins, then `COLORTERM`, then `TERM`.
pub(crate) fn env_supports_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
        return false;
    }
    if std::env::var_os("COLORTERM").is_some() {
        return true;
    }
    std::env::var("TERM").is_ok_and(|term| COLOR_TERMS.iter().any(|t| term.contains(t)))
}

/// In-memory target that can be cloned and read back while a sink still owns a handle to it.
///
/// Useful for tests and for embedding log output into another transport.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }

    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(ToString::to_string).collect()
    }

    #[must_use]
    pub fn bytes(&self) -> Vec<u8> {
        self.0.lock().clone()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
