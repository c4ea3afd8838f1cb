//! Unified error type for all logcore operations.

use std::path::PathBuf;

/// Error type for logcore operations.
#[derive(Debug)]
pub enum Error {
    /// A logger with this name is already registered.
    NameCollision(String),
    /// Loggers registered by name need a non-empty key.
    EmptyName,
    /// I/O error from a sink target or a config file.
    Io(std::io::Error),
    /// TOML config parsing error.
    ConfigParse(toml::de::Error),
    /// Cyclic include detected in config sources.
    CyclicInclude(PathBuf),
    /// Invalid log level string.
    InvalidLevel(String),
    /// Formatter failed to render a record.
    Format(String),
    /// An async logger outlived the worker pool it posts to.
    PoolGone(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NameCollision(name) => write!(f, "logger with name '{name}' already exists"),
            Self::EmptyName => write!(f, "logger name must not be empty"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::ConfigParse(e) => write!(f, "parse error: {e}"),
            Self::CyclicInclude(p) => write!(f, "cyclic include: {}", p.display()),
            Self::InvalidLevel(level) => write!(f, "invalid log level: {level}"),
            Self::Format(s) => write!(f, "format error: {s}"),
            Self::PoolGone(name) => {
                write!(f, "async logger '{name}': worker pool doesn't exist anymore")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::ConfigParse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Self::ConfigParse(e)
    }
}

impl From<crate::level::ParseLevelError> for Error {
    fn from(e: crate::level::ParseLevelError) -> Self {
        Self::InvalidLevel(e.input().to_string())
    }
}
