//! TOML configuration loading with `source = "..."` include resolution.
//!
//! Separated from struct definitions so that the loading logic (file I/O, cycle detection,
//! merge strategy) stays independent of the serde schema.

mod structs;

pub use structs::GeneralConfig;

use crate::Error;
use crate::internal;
use crate::level::{Level, LevelConfig};
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// An empty file still produces a working setup: `#[serde(default)]` on every field.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    /// Logger name pattern (`net`, `db.*`, `*`) to level name.
    pub levels: HashMap<String, String>,
}

/// Scans raw TOML for `source = "..."` directives before deserialization, since serde can't
/// handle them. Only a bare `source` key ahead of the first table header counts; keys inside a
/// table (`[levels] sourcemap = ...`, `[general] source = ...`) stay TOML. Returns the
/// extracted paths and the remaining TOML.
#[doc(hidden)]
#[must_use]
pub fn extract_sources(content: &str) -> (Vec<String>, String) {
    let mut sources = Vec::new();
    let mut remaining = String::new();
    let mut in_table = false;

    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('[') {
            in_table = true;
        }
        let directive = if in_table {
            None
        } else {
            trimmed
                .split_once('=')
                .filter(|(key, _)| key.trim() == "source")
                .map(|(_, value)| value.trim().trim_matches('"').trim_matches('\''))
        };
        match directive {
            Some("") => {}
            Some(path) => sources.push(path.to_string()),
            None => {
                remaining.push_str(line);
                remaining.push('\n');
            }
        }
    }

    (sources, remaining)
}

impl Config {
    /// Loads `path` and every file it sources. A missing file yields the defaults.
    ///
    /// # Errors
    /// I/O and TOML errors, or [`Error::CyclicInclude`].
    pub fn load_from(path: &Path) -> Result<Self, Error> {
        let config = Self::load_with_sources(path, &mut HashSet::new())?;
        internal::debug("CONFIG", &format!("Config loaded from {}", path.display()));
        Ok(config)
    }

    /// # Errors
    /// TOML syntax or type errors.
    pub fn from_toml_str(content: &str) -> Result<Self, Error> {
        Ok(toml::from_str(content)?)
    }

    fn load_with_sources(path: &Path, seen: &mut HashSet<PathBuf>) -> Result<Self, Error> {
        if !path.exists() {
            internal::debug("CONFIG", "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if !seen.insert(canonical.clone()) {
            internal::warn(
                "CONFIG",
                &format!("Cyclic include detected: {}", canonical.display()),
            );
            return Err(Error::CyclicInclude(canonical));
        }

        let content = fs::read_to_string(path)?;
        let (sources, toml_content) = extract_sources(&content);
        let mut config: Self = toml::from_str(&toml_content)?;

        for source_path in sources {
            let expanded = shellexpand::tilde(&source_path);
            let source_file = Path::new(expanded.as_ref());
            if source_file.exists() {
                let source_config = Self::load_with_sources(source_file, seen)?;
                config.merge(source_config);
            } else {
                internal::warn("CONFIG", &format!("Source file not found: {source_path}"));
            }
        }

        Ok(config)
    }

    /// Folds a sourced config's level entries into `self`; the including file wins on conflicts.
    pub fn merge(&mut self, other: Self) {
        for (k, v) in other.levels {
            self.levels.entry(k).or_insert(v);
        }
    }

    /// # Errors
    /// [`Error::InvalidLevel`] for an unknown level name.
    pub fn parse_level(&self) -> Result<Level, Error> {
        Ok(self.general.level.parse()?)
    }

    /// # Errors
    /// [`Error::InvalidLevel`] for an unknown level name.
    pub fn parse_flush_level(&self) -> Result<Level, Error> {
        Ok(self.general.flush_on.parse()?)
    }

    /// The `[levels]` table, with `general.level` as catch-all unless the table has a `*` entry.
    ///
    /// # Errors
    /// [`Error::InvalidLevel`] for an unknown level name.
    pub fn level_config(&self) -> Result<LevelConfig, Error> {
        let mut levels = LevelConfig::try_from(&self.levels)?;
        if levels.default_level().is_none() {
            levels.insert("*", self.parse_level()?);
        }
        Ok(levels)
    }
}
