//! Applies a loaded [`Config`] or an environment level string to a registry.

use super::Registry;
use crate::Error;
use crate::config::Config;
use crate::fmt::PatternFormatter;
use crate::internal;
use crate::level::LevelConfig;
use std::time::Duration;

/// Environment variable read by [`Registry::load_env_levels`], e.g. `info,net=debug`.
pub const LEVEL_ENV: &str = "LOGCORE_LEVEL";

impl Registry {
    /// Validates everything first, so a bad level name leaves the registry untouched.
    ///
    /// # Errors
    /// [`Error::InvalidLevel`], or I/O errors starting the periodic flusher.
    pub fn configure(&self, config: &Config) -> Result<(), Error> {
        let general = &config.general;
        let level = config.parse_level()?;
        let flush_level = config.parse_flush_level()?;
        let levels = config.level_config()?;

        self.set_automatic_registration(general.automatic_registration);

        let mut formatter = PatternFormatter::new(&general.pattern);
        if let Some(time_format) = &general.time_format {
            formatter = formatter.time_format(time_format.clone());
        }
        self.set_formatter(Box::new(formatter));

        self.set_level(level);
        self.update_levels(levels);
        self.flush_on(flush_level);
        if general.backtrace > 0 {
            self.enable_backtrace(general.backtrace);
        }
        self.flush_every(Duration::from_secs(general.flush_every_secs))?;

        internal::debug(
            "CONFIG",
            &format!("Registry configured: level={level}, flush_on={flush_level}"),
        );
        Ok(())
    }

    /// Applies `LOGCORE_LEVEL` if set; an unset variable changes nothing.
    ///
    /// # Errors
    /// [`Error::InvalidLevel`] for an unknown level name in the variable.
    pub fn load_env_levels(&self) -> Result<(), Error> {
        let levels = LevelConfig::from_env(LEVEL_ENV)?;
        if !levels.is_empty() {
            self.update_levels(levels);
        }
        Ok(())
    }
}
