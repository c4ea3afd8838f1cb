//! Name-pattern to level mapping used by `Registry::update_levels`.

use super::Level;
use crate::Error;
use std::collections::HashMap;
use std::str::FromStr;

/// Per-logger level overrides plus an optional catch-all.
///
/// Resolution priority: exact name > longest `prefix*` pattern > default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelConfig {
    default: Option<Level>,
    exact: HashMap<String, Level>,
    prefixes: Vec<(String, Level)>,
}

impl LevelConfig {
    /// Empty mapping. Resolves nothing, so loggers keep the registry's global level.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces one entry. `*` sets the default, a trailing `*` makes a prefix pattern.
    pub fn insert(&mut self, pattern: &str, level: Level) {
        let pattern = pattern.trim();
        if pattern == "*" || pattern.is_empty() {
            self.default = Some(level);
        } else if let Some(prefix) = pattern.strip_suffix('*') {
            self.prefixes.retain(|(p, _)| p != prefix);
            self.prefixes.push((prefix.to_string(), level));
            // Longest prefix first so the most specific pattern wins.
            self.prefixes.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        } else {
            self.exact.insert(pattern.to_string(), level);
        }
    }

    /// Builder-style variant of [`insert`](Self::insert).
    #[must_use]
    pub fn with(mut self, pattern: &str, level: Level) -> Self {
        self.insert(pattern, level);
        self
    }

    /// Catch-all level for names no other entry matches.
    #[must_use]
    pub const fn default_level(&self) -> Option<Level> {
        self.default
    }

    /// Level for a logger name, or `None` when nothing matches and there is no default.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Level> {
        if let Some(level) = self.exact.get(name) {
            return Some(*level);
        }
        self.prefixes
            .iter()
            .find(|(prefix, _)| name.starts_with(prefix.as_str()))
            .map(|(_, level)| *level)
            .or(self.default)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.default.is_none() && self.exact.is_empty() && self.prefixes.is_empty()
    }

    /// Reads the `"info,net=debug,db.*=trace"` syntax from an environment variable.
    /// An unset variable yields an empty config.
    ///
    /// # Errors
    /// Returns [`Error::InvalidLevel`] if any entry names an unknown level.
    pub fn from_env(var: &str) -> Result<Self, Error> {
        std::env::var(var).map_or_else(|_| Ok(Self::new()), |value| value.parse())
    }
}

impl FromStr for LevelConfig {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut config = Self::new();
        for entry in s.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            match entry.split_once('=') {
                Some((pattern, level)) => config.insert(pattern, level.parse()?),
                None => config.insert("*", entry.parse()?),
            }
        }
        Ok(config)
    }
}

impl<S: ::std::hash::BuildHasher> TryFrom<&HashMap<String, String, S>> for LevelConfig {
    type Error = Error;

    fn try_from(map: &HashMap<String, String, S>) -> Result<Self, Self::Error> {
        let mut config = Self::new();
        for (pattern, level) in map {
            config.insert(pattern, level.parse()?);
        }
        Ok(config)
    }
}
